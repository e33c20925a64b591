//! Constellation mapping - symbol index ↔ constellation point
//!
//! Every modulation maps an integer symbol in `[0, M)` to one complex
//! point (PAM points lie on the real axis) and inverts that mapping with a
//! memoryless hard decision. Bits are grouped MSB first into symbols.

pub mod pam;
pub mod psk;
pub mod qam;

pub use pam::Pam;
pub use psk::Psk;
pub use qam::Qam;

use num_complex::Complex64;

use crate::error::{Result, SimError};
use crate::utils::bits;

/// Symbol alphabet mapping trait
///
/// Implementations define the geometry of the constellation diagram.
/// Used by both the transmitter (symbol → point) and the detector
/// (point → symbol).
pub trait Constellation: Send + Sync {
    /// Number of points in the constellation (M)
    fn order(&self) -> usize;

    /// Bits per symbol (log2 of order)
    fn bits_per_symbol(&self) -> usize {
        self.order().trailing_zeros() as usize
    }

    /// Map a symbol index to its constellation point
    fn point(&self, symbol: usize) -> Complex64;

    /// Decide the symbol for a received point (hard decision).
    ///
    /// A point exactly on a decision boundary resolves to the higher index.
    fn decide(&self, point: Complex64) -> usize;

    /// Whether every point lies on the real axis
    fn is_real(&self) -> bool {
        false
    }

    fn map(&self, symbols: &[usize]) -> Vec<Complex64> {
        symbols.iter().map(|&s| self.point(s)).collect()
    }

    fn demap(&self, points: &[Complex64]) -> Vec<usize> {
        points.iter().map(|&p| self.decide(p)).collect()
    }

    /// Map a bitstream; its length must be a multiple of `bits_per_symbol`
    fn map_bits(&self, bits: &[u8]) -> Result<Vec<Complex64>> {
        let symbols = bits::bits_to_symbols(bits, self.bits_per_symbol())?;
        Ok(self.map(&symbols))
    }

    fn demap_bits(&self, points: &[Complex64]) -> Vec<u8> {
        bits::symbols_to_bits(&self.demap(points), self.bits_per_symbol())
    }

    /// Mean squared magnitude over all points
    fn average_energy(&self) -> f64 {
        let m = self.order();
        (0..m).map(|s| self.point(s).norm_sqr()).sum::<f64>() / m as f64
    }
}

/// Check that `order` is a power of two and at least 2
pub(crate) fn check_order(order: usize, name: &str) -> Result<()> {
    if order < 2 || !order.is_power_of_two() {
        return Err(SimError::InvalidModulation(format!(
            "{} order must be a power of two >= 2, got {}",
            name, order
        )));
    }
    Ok(())
}

/// Quantize `value` to the nearest integer level index in `[0, levels)`.
///
/// Ties go to the higher index; out-of-range values clip to the outer levels.
pub(crate) fn nearest_level(value: f64, levels: usize) -> usize {
    let index = (value + 0.5).floor();
    index.clamp(0.0, (levels - 1) as f64) as usize
}
