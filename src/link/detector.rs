use std::sync::Arc;

use num_complex::Complex64;

use crate::modulation::Constellation;
use crate::pulse::PulseShaper;
use crate::utils::bits;

/// Hard-decision receiver front end
///
/// Samples a shaped real waveform back to one value per symbol (when a
/// shaper is attached) and decides each received point against the
/// constellation.
#[derive(Clone)]
pub struct Detector {
    constellation: Arc<dyn Constellation>,
    shaper: Option<PulseShaper>,
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("order", &self.constellation.order())
            .field("shaper", &self.shaper)
            .finish()
    }
}

impl Detector {
    pub fn new(constellation: Arc<dyn Constellation>) -> Self {
        Self {
            constellation,
            shaper: None,
        }
    }

    pub fn with_shaper(constellation: Arc<dyn Constellation>, shaper: PulseShaper) -> Self {
        Self {
            constellation,
            shaper: Some(shaper),
        }
    }

    pub fn constellation(&self) -> &dyn Constellation {
        self.constellation.as_ref()
    }

    pub fn shaper(&self) -> Option<&PulseShaper> {
        self.shaper.as_ref()
    }

    /// Received points of a real waveform, one per symbol
    pub fn sample(&self, waveform: &[f64]) -> Vec<Complex64> {
        let levels = match &self.shaper {
            Some(shaper) => shaper.sample(waveform),
            None => waveform.to_vec(),
        };
        levels
            .into_iter()
            .map(|x| Complex64::new(x, 0.0))
            .collect()
    }

    pub fn decide(&self, points: &[Complex64]) -> Vec<usize> {
        self.constellation.demap(points)
    }

    pub fn decide_bits(&self, points: &[Complex64]) -> Vec<u8> {
        bits::symbols_to_bits(&self.decide(points), self.constellation.bits_per_symbol())
    }
}
