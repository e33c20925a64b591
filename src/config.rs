//! Simulation configuration
//!
//! Everything a sweep needs is described by [`SimulationConfig`], which
//! can be loaded from JSON. Missing fields take the defaults in
//! `utils::consts`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::channel::{AwgnChannel, NoiseReference};
use crate::coding::{LinearBlockCode, hamming74_matrices};
use crate::error::{Result, SimError};
use crate::link::TheoryCurve;
use crate::modulation::{Constellation, Pam, Psk, Qam};
use crate::pulse::{Pulse, SingularityPolicy};
use crate::utils::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModulationConfig {
    Pam {
        order: usize,
        #[serde(default = "default_amplitude")]
        amplitude: f64,
    },
    Qam {
        order: usize,
    },
    Ofdm {
        subcarriers: usize,
        cp_length: usize,
        subcarrier: SubcarrierConfig,
    },
}

fn default_amplitude() -> f64 {
    1.0
}

/// Modulation carried on each OFDM subcarrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubcarrierConfig {
    Psk { order: usize },
    Qam { order: usize },
}

impl Default for ModulationConfig {
    fn default() -> Self {
        ModulationConfig::Pam {
            order: 2,
            amplitude: 1.0,
        }
    }
}

impl ModulationConfig {
    pub fn ofdm_default() -> Self {
        ModulationConfig::Ofdm {
            subcarriers: DEFAULT_SUBCARRIERS,
            cp_length: DEFAULT_CP_LENGTH,
            subcarrier: SubcarrierConfig::Psk {
                order: DEFAULT_SUBCARRIER_ORDER,
            },
        }
    }

    pub fn constellation(&self) -> Result<Arc<dyn Constellation>> {
        let constellation: Arc<dyn Constellation> = match *self {
            ModulationConfig::Pam { order, amplitude } => Arc::new(Pam::new(order, amplitude)?),
            ModulationConfig::Qam { order } => Arc::new(Qam::new(order)?),
            ModulationConfig::Ofdm { subcarrier, .. } => match subcarrier {
                SubcarrierConfig::Psk { order } => Arc::new(Psk::new(order)?),
                SubcarrierConfig::Qam { order } => Arc::new(Qam::new(order)?),
            },
        };
        Ok(constellation)
    }

    /// Uncoded closed-form curve for this modulation
    pub fn theory(&self) -> TheoryCurve {
        match *self {
            ModulationConfig::Pam { order: 2, .. } => TheoryCurve::Bpsk,
            ModulationConfig::Pam { order, .. } => TheoryCurve::Pam { order },
            ModulationConfig::Qam { order } => TheoryCurve::Qam { order },
            ModulationConfig::Ofdm { subcarrier, .. } => match subcarrier {
                SubcarrierConfig::Psk { order } => TheoryCurve::Psk { order },
                SubcarrierConfig::Qam { order } => TheoryCurve::Qam { order },
            },
        }
    }
}

/// Raised-cosine shaping of PAM symbols
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapingConfig {
    pub roll_off: f64,
    pub span: f64,
    pub symbol_rate: f64,
    pub sample_rate: f64,
    pub singularity: SingularityPolicy,
}

impl Default for ShapingConfig {
    fn default() -> Self {
        Self {
            roll_off: DEFAULT_ROLL_OFF,
            span: DEFAULT_SPAN,
            symbol_rate: DEFAULT_SYMBOL_RATE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            singularity: SingularityPolicy::default(),
        }
    }
}

impl ShapingConfig {
    pub fn pulse(&self) -> Result<Pulse> {
        if !(self.symbol_rate.is_finite() && self.symbol_rate > 0.0) {
            return Err(SimError::InvalidPulse(format!(
                "symbol rate must be positive, got {}",
                self.symbol_rate
            )));
        }
        Pulse::raised_cosine(
            self.roll_off,
            self.span,
            1.0 / self.symbol_rate,
            self.sample_rate,
            self.singularity,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingConfig {
    pub generator: Vec<Vec<u8>>,
    pub parity_check: Vec<Vec<u8>>,
}

impl CodingConfig {
    pub fn hamming74() -> Self {
        let (generator, parity_check) = hamming74_matrices();
        Self {
            generator,
            parity_check,
        }
    }

    pub fn build(&self) -> Result<LinearBlockCode> {
        LinearBlockCode::new(self.generator.clone(), self.parity_check.clone())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub reference: NoiseReference,
}

impl ChannelConfig {
    pub fn build(&self) -> Result<AwgnChannel> {
        AwgnChannel::new(self.reference)
    }
}

/// SNR points in dB, either a stepped range (stop included) or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnrSweep {
    // Must precede Range: a three-element array also fits Range's fields
    List(Vec<f64>),
    Range {
        start_db: f64,
        stop_db: f64,
        step_db: f64,
    },
}

impl Default for SnrSweep {
    fn default() -> Self {
        SnrSweep::Range {
            start_db: DEFAULT_SNR_START_DB,
            stop_db: DEFAULT_SNR_STOP_DB,
            step_db: DEFAULT_SNR_STEP_DB,
        }
    }
}

impl SnrSweep {
    pub fn range(start_db: f64, stop_db: f64, step_db: f64) -> Self {
        SnrSweep::Range {
            start_db,
            stop_db,
            step_db,
        }
    }

    pub fn values(&self) -> Result<Vec<f64>> {
        match self {
            SnrSweep::Range {
                start_db,
                stop_db,
                step_db,
            } => {
                let (start, stop, step) = (*start_db, *stop_db, *step_db);
                if !(start.is_finite() && stop.is_finite()) {
                    return Err(SimError::InvalidSweep(format!(
                        "bounds must be finite, got {}..{}",
                        start, stop
                    )));
                }
                if !(step.is_finite() && step > 0.0) {
                    return Err(SimError::InvalidSweep(format!(
                        "step must be positive, got {}",
                        step
                    )));
                }
                if stop < start {
                    return Err(SimError::InvalidSweep(format!(
                        "stop {} dB is below start {} dB",
                        stop, start
                    )));
                }
                // Tolerate rounding so that e.g. 0..=1 step 0.1 keeps 1.0
                let count = ((stop - start) / step + 1e-9).floor() as usize + 1;
                Ok((0..count).map(|i| start + i as f64 * step).collect())
            }
            SnrSweep::List(values) => {
                if values.is_empty() {
                    return Err(SimError::InvalidSweep("no SNR points".to_string()));
                }
                if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
                    return Err(SimError::InvalidSweep(format!(
                        "SNR points must be finite, got {}",
                        bad
                    )));
                }
                Ok(values.clone())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub modulation: ModulationConfig,
    pub shaping: Option<ShapingConfig>,
    pub coding: Option<CodingConfig>,
    pub channel: ChannelConfig,
    pub sweep: SnrSweep,
    /// Information bits per Monte-Carlo trial
    pub bits_per_trial: usize,
    pub trials: usize,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            modulation: ModulationConfig::default(),
            shaping: None,
            coding: None,
            channel: ChannelConfig::default(),
            sweep: SnrSweep::default(),
            bits_per_trial: DEFAULT_BITS_PER_TRIAL,
            trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
