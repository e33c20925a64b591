//! Raised-cosine pulse
//!
//! h(t) = sinc(t/T) · cos(πβt/T) / (1 - (2βt/T)²), sampled at `fs` over
//! `span` symbol periods on each side of the centre and scaled to unit peak.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SimError};
use crate::utils::consts::SINGULARITY_EPSILON;
use crate::utils::math::sinc;

/// Value used where the denominator 1 - (2βt/T)² vanishes (t = ±T/2β)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingularityPolicy {
    /// The removable-singularity limit, (π/4) · sinc(1/2β)
    #[default]
    AnalyticLimit,
    /// Zero, blanking the undefined samples (legacy output).
    /// Leaves a notch in the pulse wherever sinc(1/2β) ≠ 0.
    Zero,
}

/// A sampled, peak-normalized pulse
#[derive(Debug, Clone)]
pub struct Pulse {
    taps: Vec<f64>,
    samples_per_symbol: usize,
    center: usize,
    sample_rate: f64,
}

impl Pulse {
    /// Generate a raised-cosine pulse.
    ///
    /// # Arguments
    /// * `roll_off` - Excess bandwidth β, in (0, 1]
    /// * `span` - Symbol periods on each side of the centre; 0.5 gives a
    ///   single-symbol pulse
    /// * `symbol_period` - T in seconds
    /// * `sample_rate` - fs in Hz; fs·T must be a whole number of samples
    /// * `policy` - Value substituted at the denominator singularities
    pub fn raised_cosine(
        roll_off: f64,
        span: f64,
        symbol_period: f64,
        sample_rate: f64,
        policy: SingularityPolicy,
    ) -> Result<Self> {
        if !(roll_off.is_finite() && roll_off > 0.0 && roll_off <= 1.0) {
            return Err(SimError::InvalidPulse(format!(
                "roll-off must be in (0, 1], got {}",
                roll_off
            )));
        }
        if !(span.is_finite() && span > 0.0) {
            return Err(SimError::InvalidPulse(format!(
                "span must be positive, got {}",
                span
            )));
        }
        if !(symbol_period.is_finite() && symbol_period > 0.0) {
            return Err(SimError::InvalidPulse(format!(
                "symbol period must be positive, got {}",
                symbol_period
            )));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SimError::InvalidPulse(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }

        let samples_per_symbol = whole_samples(sample_rate * symbol_period).ok_or_else(|| {
            SimError::InvalidPulse(format!(
                "fs·T = {} is not a whole number of samples",
                sample_rate * symbol_period
            ))
        })?;
        let len = whole_samples(2.0 * span * samples_per_symbol as f64).ok_or_else(|| {
            SimError::InvalidPulse(format!(
                "span {} does not cover a whole number of samples at {} samples/symbol",
                span, samples_per_symbol
            ))
        })?;

        // The grid is anchored on t = 0 so the peak and the zero crossings
        // at multiples of T fall exactly on samples.
        let center = len / 2;
        let mut taps: Vec<f64> = (0..len)
            .map(|i| {
                let u = (i as f64 - center as f64) / samples_per_symbol as f64;
                raised_cosine_at(u, roll_off, policy)
            })
            .collect();

        let peak = taps.iter().fold(0.0f64, |a, &b| a.max(b.abs()));
        if peak > 0.0 {
            for tap in taps.iter_mut() {
                *tap /= peak;
            }
        }

        debug!(
            "Raised-cosine pulse: β={}, span={}, {} taps, {} samples/symbol, {:?}",
            roll_off, span, len, samples_per_symbol, policy
        );

        Ok(Self {
            taps,
            samples_per_symbol,
            center,
            sample_rate,
        })
    }

    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    pub fn samples_per_symbol(&self) -> usize {
        self.samples_per_symbol
    }

    /// Index of the t = 0 tap
    pub fn center(&self) -> usize {
        self.center
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Whether the pulse covers exactly one symbol period (span = 0.5)
    pub fn is_single_symbol(&self) -> bool {
        self.taps.len() == self.samples_per_symbol
    }

    /// Time of each tap in seconds, centre at 0
    pub fn time_axis(&self) -> Vec<f64> {
        (0..self.taps.len())
            .map(|i| (i as f64 - self.center as f64) / self.sample_rate)
            .collect()
    }
}

/// Unnormalized raised-cosine value at `u = t/T`
fn raised_cosine_at(u: f64, roll_off: f64, policy: SingularityPolicy) -> f64 {
    let x = 2.0 * roll_off * u;
    let denominator = 1.0 - x * x;
    if denominator.abs() < SINGULARITY_EPSILON {
        return match policy {
            // cos(πβu) / (1 - (2βu)²) → π/4 as u → ±1/2β
            SingularityPolicy::AnalyticLimit => sinc(u) * PI / 4.0,
            SingularityPolicy::Zero => 0.0,
        };
    }
    sinc(u) * (PI * roll_off * u).cos() / denominator
}

fn whole_samples(value: f64) -> Option<usize> {
    let rounded = value.round();
    if rounded >= 1.0 && (value - rounded).abs() < 1e-6 {
        Some(rounded as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rc(roll_off: f64, span: f64, policy: SingularityPolicy) -> Pulse {
        Pulse::raised_cosine(roll_off, span, 1e-3, 10e3, policy).unwrap()
    }

    #[test]
    fn test_pulse_length_and_center() {
        let pulse = rc(0.25, 4.0, SingularityPolicy::AnalyticLimit);
        assert_eq!(pulse.len(), 80);
        assert_eq!(pulse.center(), 40);
        assert_eq!(pulse.samples_per_symbol(), 10);
        assert!(!pulse.is_single_symbol());

        let single = rc(0.35, 0.5, SingularityPolicy::AnalyticLimit);
        assert_eq!(single.len(), 10);
        assert!(single.is_single_symbol());
    }

    #[test]
    fn test_pulse_unit_peak() {
        for &(beta, span) in &[(0.25, 4.0), (0.35, 0.5), (1.0, 3.0), (0.2, 6.0), (0.5, 2.5)] {
            let pulse = rc(beta, span, SingularityPolicy::AnalyticLimit);
            let peak = pulse.taps().iter().fold(0.0f64, |a, &b| a.max(b.abs()));
            assert!((peak - 1.0).abs() < 1e-12, "β={} span={} peak={}", beta, span, peak);
            assert!((pulse.taps()[pulse.center()] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pulse_zero_crossings_at_symbol_multiples() {
        let pulse = rc(0.35, 4.0, SingularityPolicy::AnalyticLimit);
        let sps = pulse.samples_per_symbol();
        for k in 1..4 {
            assert!(pulse.taps()[pulse.center() + k * sps].abs() < 1e-12);
            assert!(pulse.taps()[pulse.center() - k * sps].abs() < 1e-12);
        }
    }

    #[test]
    fn test_pulse_symmetry() {
        let pulse = rc(0.25, 4.0, SingularityPolicy::AnalyticLimit);
        let taps = pulse.taps();
        let c = pulse.center();
        for k in 1..c {
            assert!((taps[c - k] - taps[c + k]).abs() < 1e-12, "asymmetric at ±{}", k);
        }
    }

    #[test]
    fn test_singularity_uses_analytic_limit() {
        // β = 1: singular at t = ±T/2 where h = 0.5
        let pulse = rc(1.0, 2.0, SingularityPolicy::AnalyticLimit);
        let c = pulse.center();
        assert!((pulse.taps()[c + 5] - 0.5).abs() < 1e-12);
        assert!((pulse.taps()[c - 5] - 0.5).abs() < 1e-12);

        // β = 0.2: singular at t = ±2.5T, limit (π/4)·sinc(2.5)
        let pulse = rc(0.2, 4.0, SingularityPolicy::AnalyticLimit);
        let expected = PI / 4.0 * sinc(2.5);
        let at = pulse.taps()[pulse.center() + 25];
        assert!((at - expected).abs() < 1e-12);
        // no notch: the singular tap lies between its neighbours
        let before = pulse.taps()[pulse.center() + 24];
        let after = pulse.taps()[pulse.center() + 26];
        assert!(at < before.max(after) && at > before.min(after));
    }

    #[test]
    fn test_legacy_zero_policy_leaves_notch() {
        let pulse = rc(0.2, 4.0, SingularityPolicy::Zero);
        assert_eq!(pulse.taps()[pulse.center() + 25], 0.0);
        assert_eq!(pulse.taps()[pulse.center() - 25], 0.0);

        let exact = rc(0.2, 4.0, SingularityPolicy::AnalyticLimit);
        let differing = pulse
            .taps()
            .iter()
            .zip(exact.taps())
            .filter(|(a, b)| (*a - *b).abs() > 1e-12)
            .count();
        assert_eq!(differing, 2);
    }

    #[test]
    fn test_time_axis() {
        let pulse = rc(0.25, 0.5, SingularityPolicy::AnalyticLimit);
        let t = pulse.time_axis();
        assert_eq!(t.len(), 10);
        assert!((t[0] + 0.5e-3).abs() < 1e-12);
        assert!(t[5].abs() < 1e-15);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let p = SingularityPolicy::AnalyticLimit;
        assert!(Pulse::raised_cosine(0.0, 4.0, 1e-3, 10e3, p).is_err());
        assert!(Pulse::raised_cosine(1.5, 4.0, 1e-3, 10e3, p).is_err());
        assert!(Pulse::raised_cosine(0.25, 0.0, 1e-3, 10e3, p).is_err());
        assert!(Pulse::raised_cosine(0.25, -1.0, 1e-3, 10e3, p).is_err());
        assert!(Pulse::raised_cosine(0.25, 4.0, 0.0, 10e3, p).is_err());
        // 2.5 samples per symbol
        assert!(Pulse::raised_cosine(0.25, 4.0, 1e-3, 2.5e3, p).is_err());
        // 0.03 symbols of span at 10 samples/symbol is not a whole sample count
        assert!(Pulse::raised_cosine(0.25, 0.03, 1e-3, 10e3, p).is_err());
    }
}
