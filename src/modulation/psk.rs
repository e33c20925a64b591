//! M-PSK on the unit circle, symbol `s` at phase 2πs/M
//!
//! Used for OFDM subcarriers. Detection is phase based: the received angle
//! is scaled to symbol units and rounded.

use std::f64::consts::PI;

use num_complex::Complex64;

use super::{Constellation, check_order};
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct Psk {
    order: usize,
}

impl Psk {
    pub fn new(order: usize) -> Result<Self> {
        check_order(order, "PSK")?;
        Ok(Self { order })
    }

    pub fn qpsk() -> Self {
        Self { order: 4 }
    }
}

impl Constellation for Psk {
    fn order(&self) -> usize {
        self.order
    }

    fn point(&self, symbol: usize) -> Complex64 {
        let phase = 2.0 * PI * (symbol % self.order) as f64 / self.order as f64;
        Complex64::from_polar(1.0, phase)
    }

    fn decide(&self, point: Complex64) -> usize {
        // Ties between neighbours go to the counter-clockwise one
        let m = self.order as i64;
        let index = (point.arg() * self.order as f64 / (2.0 * PI) + 0.5).floor() as i64;
        index.rem_euclid(m) as usize
    }
}
