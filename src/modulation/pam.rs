//! M-ary PAM: real levels {±1, ±3, …, ±(M-1)} scaled by an amplitude

use num_complex::Complex64;

use super::{Constellation, check_order, nearest_level};
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy)]
pub struct Pam {
    order: usize,
    amplitude: f64,
}

impl Pam {
    pub fn new(order: usize, amplitude: f64) -> Result<Self> {
        check_order(order, "PAM")?;
        if !(amplitude.is_finite() && amplitude > 0.0) {
            return Err(SimError::InvalidModulation(format!(
                "PAM amplitude must be positive, got {}",
                amplitude
            )));
        }
        Ok(Self { order, amplitude })
    }

    /// Antipodal signalling, 0 → -1 and 1 → +1
    pub fn bpsk() -> Self {
        Self {
            order: 2,
            amplitude: 1.0,
        }
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Level for a symbol: A · (2s - (M - 1))
    pub fn level(&self, symbol: usize) -> f64 {
        self.amplitude * (2.0 * symbol as f64 - (self.order - 1) as f64)
    }
}

impl Constellation for Pam {
    fn order(&self) -> usize {
        self.order
    }

    fn point(&self, symbol: usize) -> Complex64 {
        Complex64::new(self.level(symbol % self.order), 0.0)
    }

    fn decide(&self, point: Complex64) -> usize {
        // Thresholds sit half-way between levels: A·{-(M-2), …, 0, …, M-2}
        let index = (point.re / self.amplitude + (self.order - 1) as f64) / 2.0;
        nearest_level(index, self.order)
    }

    fn is_real(&self) -> bool {
        true
    }
}
