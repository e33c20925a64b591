//! Additive white Gaussian noise channel
//!
//! The noise level is derived from an SNR in dB and a named reference:
//!
//! * `MeasuredSignalPower` / `FixedSignalPower`: noise power
//!   N = P / SNR per sample, P the measured mean |s|² or a fixed value.
//!   Real signals get variance N, complex signals N/2 per component.
//! * `EnergyPerBit`: SNR is Eb/N0 with N0 = Eb / SNR. Every real dimension
//!   gets variance N0/2, so complex samples carry N0 in total.

use num_complex::Complex64;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::utils::math::db_to_linear;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseReference {
    /// Mean |s|² of each signal passed through the channel
    #[default]
    MeasuredSignalPower,
    /// A fixed signal power, independent of the samples
    FixedSignalPower { power: f64 },
    /// A fixed energy per bit; the SNR is read as Eb/N0
    EnergyPerBit { eb: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct AwgnChannel {
    reference: NoiseReference,
}

impl AwgnChannel {
    pub fn new(reference: NoiseReference) -> Result<Self> {
        let value = match reference {
            NoiseReference::MeasuredSignalPower => None,
            NoiseReference::FixedSignalPower { power } => Some(("signal power", power)),
            NoiseReference::EnergyPerBit { eb } => Some(("energy per bit", eb)),
        };
        if let Some((name, v)) = value {
            if !(v.is_finite() && v > 0.0) {
                return Err(SimError::InvalidChannel(format!(
                    "{} must be positive, got {}",
                    name, v
                )));
            }
        }
        Ok(Self { reference })
    }

    pub fn reference(&self) -> NoiseReference {
        self.reference
    }

    /// Noise variance of each real dimension
    ///
    /// `signal_power` is only read by `MeasuredSignalPower`.
    pub fn dimension_variance(&self, signal_power: f64, snr_db: f64, complex: bool) -> Result<f64> {
        if !snr_db.is_finite() {
            return Err(SimError::InvalidChannel(format!(
                "SNR must be finite, got {} dB",
                snr_db
            )));
        }
        let snr = db_to_linear(snr_db);
        let variance = match self.reference {
            NoiseReference::MeasuredSignalPower => split(signal_power / snr, complex),
            NoiseReference::FixedSignalPower { power } => split(power / snr, complex),
            NoiseReference::EnergyPerBit { eb } => eb / snr / 2.0,
        };
        Ok(variance)
    }

    /// Total noise power per sample added to a signal
    pub fn noise_power(&self, signal_power: f64, snr_db: f64, complex: bool) -> Result<f64> {
        let variance = self.dimension_variance(signal_power, snr_db, complex)?;
        Ok(if complex { 2.0 * variance } else { variance })
    }

    pub fn add_noise_real<R: Rng>(
        &self,
        rng: &mut R,
        signal: &[f64],
        snr_db: f64,
    ) -> Result<Vec<f64>> {
        let power = mean_power(signal.iter().map(|x| x * x));
        let sigma = self.dimension_variance(power, snr_db, false)?.sqrt();
        Ok(signal
            .iter()
            .map(|&x| x + sigma * rng.sample::<f64, _>(StandardNormal))
            .collect())
    }

    pub fn add_noise_complex<R: Rng>(
        &self,
        rng: &mut R,
        signal: &[Complex64],
        snr_db: f64,
    ) -> Result<Vec<Complex64>> {
        let power = mean_power(signal.iter().map(|s| s.norm_sqr()));
        let sigma = self.dimension_variance(power, snr_db, true)?.sqrt();
        Ok(signal
            .iter()
            .map(|&s| {
                let re: f64 = rng.sample(StandardNormal);
                let im: f64 = rng.sample(StandardNormal);
                s + Complex64::new(re, im) * sigma
            })
            .collect())
    }
}

fn split(noise_power: f64, complex: bool) -> f64 {
    if complex { noise_power / 2.0 } else { noise_power }
}

fn mean_power(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
