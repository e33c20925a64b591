//! Square M-QAM with unit average symbol energy
//!
//! Symbol `s` takes its in-phase level from `s % √M` and its quadrature
//! level from `s / √M`; both axes use PAM levels {-(√M-1), …, √M-1}.

use num_complex::Complex64;

use super::{Constellation, check_order, nearest_level};
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy)]
pub struct Qam {
    order: usize,
    side: usize,
    /// 1 / sqrt(mean squared magnitude of the unscaled grid)
    scale: f64,
}

impl Qam {
    pub fn new(order: usize) -> Result<Self> {
        check_order(order, "QAM")?;
        if order.trailing_zeros() % 2 != 0 {
            return Err(SimError::InvalidModulation(format!(
                "square QAM needs an even number of bits per symbol, got order {}",
                order
            )));
        }
        let side = 1usize << (order.trailing_zeros() / 2);
        // Mean of I² + Q² over the grid is 2(√M² - 1)/3
        let mean_energy = 2.0 * ((side * side - 1) as f64) / 3.0;
        Ok(Self {
            order,
            side,
            scale: 1.0 / mean_energy.sqrt(),
        })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn axis_level(&self, index: usize) -> f64 {
        2.0 * index as f64 - (self.side - 1) as f64
    }

    fn axis_index(&self, value: f64) -> usize {
        let index = (value / self.scale + (self.side - 1) as f64) / 2.0;
        nearest_level(index, self.side)
    }
}

impl Constellation for Qam {
    fn order(&self) -> usize {
        self.order
    }

    fn point(&self, symbol: usize) -> Complex64 {
        let symbol = symbol % self.order;
        let i = self.axis_level(symbol % self.side);
        let q = self.axis_level(symbol / self.side);
        Complex64::new(i, q) * self.scale
    }

    fn decide(&self, point: Complex64) -> usize {
        self.axis_index(point.re) + self.side * self.axis_index(point.im)
    }
}
