//! Pulse shaping of real symbol levels and symbol-rate resampling

use serde::Serialize;

use super::Pulse;
use crate::error::{Result, SimError};

/// How symbols are turned into a waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapingMode {
    /// Each symbol scales one single-period pulse; the copies are
    /// concatenated. Only valid for single-symbol pulses (span = 0.5).
    Concatenate,
    /// The symbol train, upsampled to the pulse rate, is convolved with the
    /// pulse and aligned on the pulse centre (`same` length).
    Convolve,
}

/// A sampled real waveform
#[derive(Debug, Clone, Serialize)]
pub struct Waveform {
    pub samples: Vec<f64>,
    pub sample_rate: f64,
}

impl Waveform {
    /// Time of each sample in seconds, starting at 0
    pub fn time_axis(&self) -> Vec<f64> {
        (0..self.samples.len())
            .map(|i| i as f64 / self.sample_rate)
            .collect()
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }
}

#[derive(Debug, Clone)]
pub struct PulseShaper {
    pulse: Pulse,
    mode: ShapingMode,
}

impl PulseShaper {
    /// Concatenation for single-symbol pulses, convolution otherwise
    pub fn new(pulse: Pulse) -> Self {
        let mode = if pulse.is_single_symbol() {
            ShapingMode::Concatenate
        } else {
            ShapingMode::Convolve
        };
        Self { pulse, mode }
    }

    pub fn with_mode(pulse: Pulse, mode: ShapingMode) -> Result<Self> {
        if mode == ShapingMode::Concatenate && !pulse.is_single_symbol() {
            return Err(SimError::InvalidPulse(format!(
                "concatenation needs a single-symbol pulse, got {} taps at {} samples/symbol",
                pulse.len(),
                pulse.samples_per_symbol()
            )));
        }
        Ok(Self { pulse, mode })
    }

    pub fn pulse(&self) -> &Pulse {
        &self.pulse
    }

    pub fn mode(&self) -> ShapingMode {
        self.mode
    }

    /// Shape real symbol levels into a waveform of
    /// `levels.len() · samples_per_symbol` samples
    pub fn apply(&self, levels: &[f64]) -> Waveform {
        let samples = match self.mode {
            ShapingMode::Concatenate => self.concatenate(levels),
            ShapingMode::Convolve => self.convolve_same(levels),
        };
        Waveform {
            samples,
            sample_rate: self.pulse.sample_rate(),
        }
    }

    /// Take one sample per symbol at the instant where the pulse of that
    /// symbol peaks
    pub fn sample(&self, waveform: &[f64]) -> Vec<f64> {
        let sps = self.pulse.samples_per_symbol();
        let offset = match self.mode {
            ShapingMode::Concatenate => self.pulse.center(),
            ShapingMode::Convolve => 0,
        };
        waveform
            .iter()
            .skip(offset)
            .step_by(sps)
            .take(waveform.len() / sps)
            .copied()
            .collect()
    }

    fn concatenate(&self, levels: &[f64]) -> Vec<f64> {
        let taps = self.pulse.taps();
        let mut signal = Vec::with_capacity(levels.len() * taps.len());
        for &level in levels {
            signal.extend(taps.iter().map(|&h| level * h));
        }
        signal
    }

    fn convolve_same(&self, levels: &[f64]) -> Vec<f64> {
        let taps = self.pulse.taps();
        let sps = self.pulse.samples_per_symbol();
        let center = self.pulse.center() as isize;
        let out_len = levels.len() * sps;
        let mut signal = vec![0.0; out_len];

        // y[m] = Σ_k a_k · h[m - k·sps + center]
        for (k, &level) in levels.iter().enumerate() {
            if level == 0.0 {
                continue;
            }
            let origin = (k * sps) as isize - center;
            for (j, &h) in taps.iter().enumerate() {
                let m = origin + j as isize;
                if m >= 0 && (m as usize) < out_len {
                    signal[m as usize] += level * h;
                }
            }
        }
        signal
    }
}
