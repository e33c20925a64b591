//! End-to-end bit error rate measurement
//!
//! One trial: random bits → (encode) → map → (shape | OFDM frame) → AWGN →
//! (sample | deframe) → decide → (decode) → compare. Every SNR point draws
//! from its own ChaCha stream of the configured seed, so a sweep gives the
//! same numbers whether its points run in order or on worker threads.

use std::thread;

use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use super::{Detector, TheoryCurve};
use crate::channel::AwgnChannel;
use crate::coding::{DecodeStats, LinearBlockCode};
use crate::config::{ModulationConfig, SimulationConfig};
use crate::error::{Result, SimError};
use crate::ofdm::OfdmFramer;
use crate::pulse::PulseShaper;
use crate::utils::bits;

/// Errors over a total count, kept as integers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ErrorRate {
    pub errors: usize,
    pub total: usize,
}

impl ErrorRate {
    pub fn new(errors: usize, total: usize) -> Self {
        Self { errors, total }
    }

    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.errors as f64 / self.total as f64
        }
    }

    pub fn add(&mut self, other: ErrorRate) {
        self.errors += other.errors;
        self.total += other.total;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub snr_db: f64,
    pub ber: f64,
    pub ser: f64,
    pub bits: ErrorRate,
    pub symbols: ErrorRate,
    /// Uncoded closed-form BER at this SNR, when a curve is attached
    pub theoretical_ber: Option<f64>,
    /// Decoder counters, only on coded links
    pub decode: Option<DecodeStats>,
}

/// Transmitted and received points at one SNR, before decisions
#[derive(Debug, Clone, Serialize)]
pub struct ConstellationSnapshot {
    pub snr_db: f64,
    pub transmitted: Vec<Complex64>,
    pub received: Vec<Complex64>,
    pub symbol_errors: usize,
}

struct TrialResult {
    bits: ErrorRate,
    symbols: ErrorRate,
    decode: Option<DecodeStats>,
}

pub struct BerEvaluator {
    detector: Detector,
    framer: Option<OfdmFramer>,
    code: Option<LinearBlockCode>,
    channel: AwgnChannel,
    theory: Option<TheoryCurve>,
    bits_per_trial: usize,
    trials: usize,
    seed: u64,
}

impl BerEvaluator {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let constellation = config.modulation.constellation()?;
        let detector = match (&config.shaping, &config.modulation) {
            (None, _) => Detector::new(constellation),
            (Some(shaping), ModulationConfig::Pam { .. }) => {
                Detector::with_shaper(constellation, PulseShaper::new(shaping.pulse()?))
            }
            (Some(_), _) => {
                return Err(SimError::InvalidModulation(
                    "pulse shaping applies to PAM only".to_string(),
                ));
            }
        };
        let framer = match config.modulation {
            ModulationConfig::Ofdm {
                subcarriers,
                cp_length,
                ..
            } => Some(OfdmFramer::new(subcarriers, cp_length)?),
            _ => None,
        };
        let code = config
            .coding
            .as_ref()
            .map(|coding| coding.build())
            .transpose()?;
        let channel = config.channel.build()?;

        if config.trials == 0 {
            return Err(SimError::InvalidSweep(
                "at least one trial per point is required".to_string(),
            ));
        }
        if config.bits_per_trial == 0 {
            return Err(SimError::InvalidSweep(
                "bits per trial must be positive".to_string(),
            ));
        }

        // Whole codewords, whole symbols and whole OFDM blocks per trial
        let coded_bits = match &code {
            Some(code) => {
                if config.bits_per_trial % code.k() != 0 {
                    return Err(SimError::BlockLength {
                        len: config.bits_per_trial,
                        block: code.k(),
                    });
                }
                config.bits_per_trial / code.k() * code.n()
            }
            None => config.bits_per_trial,
        };
        let symbol_block = detector.constellation().bits_per_symbol()
            * framer.as_ref().map_or(1, |f| f.num_subcarriers());
        if coded_bits % symbol_block != 0 {
            return Err(SimError::BlockLength {
                len: coded_bits,
                block: symbol_block,
            });
        }

        debug!(
            "BER evaluator: {:?}, coded={}, {} bits x {} trials, {:?}",
            config.modulation,
            code.is_some(),
            config.bits_per_trial,
            config.trials,
            channel.reference()
        );

        Ok(Self {
            detector,
            framer,
            code,
            channel,
            theory: Some(config.modulation.theory()),
            bits_per_trial: config.bits_per_trial,
            trials: config.trials,
            seed: config.seed,
        })
    }

    /// Replace or drop the closed-form reference curve
    pub fn with_theory(mut self, theory: Option<TheoryCurve>) -> Self {
        self.theory = theory;
        self
    }

    pub fn theory(&self) -> Option<TheoryCurve> {
        self.theory
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Generator for the point at `index` of a sweep
    pub fn point_rng(&self, index: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(index as u64);
        rng
    }

    /// Run all trials at one SNR, drawing from `rng`
    pub fn run_point<R: Rng>(&self, rng: &mut R, snr_db: f64) -> Result<SweepPoint> {
        let mut bit_rate = ErrorRate::default();
        let mut symbol_rate = ErrorRate::default();
        let mut decode: Option<DecodeStats> = None;
        for _ in 0..self.trials {
            let trial = self.run_trial(rng, snr_db)?;
            bit_rate.add(trial.bits);
            symbol_rate.add(trial.symbols);
            if let Some(stats) = trial.decode {
                decode.get_or_insert_with(DecodeStats::default).merge(&stats);
            }
        }

        let point = SweepPoint {
            snr_db,
            ber: bit_rate.rate(),
            ser: symbol_rate.rate(),
            bits: bit_rate,
            symbols: symbol_rate,
            theoretical_ber: self.theory.map(|curve| curve.evaluate(snr_db)),
            decode,
        };
        info!(
            "SNR {:>5.1} dB: BER {:.3e} ({}/{}), SER {:.3e}",
            snr_db, point.ber, bit_rate.errors, bit_rate.total, point.ser
        );
        Ok(point)
    }

    /// Lazily evaluate a sweep, one point per item
    pub fn points<'a>(
        &'a self,
        snr_db: &'a [f64],
    ) -> impl Iterator<Item = Result<SweepPoint>> + 'a {
        snr_db
            .iter()
            .enumerate()
            .map(move |(index, &snr)| self.run_point(&mut self.point_rng(index), snr))
    }

    pub fn run(&self, snr_db: &[f64]) -> Result<Vec<SweepPoint>> {
        self.points(snr_db).collect()
    }

    pub fn run_parallel(&self, snr_db: &[f64], workers: usize) -> Result<Vec<SweepPoint>> {
        self.run_parallel_with(snr_db, workers, |_| {})
    }

    /// Evaluate a sweep on `workers` threads. `on_point` is called on the
    /// calling thread as points complete, in completion order; the
    /// returned points are in sweep order.
    pub fn run_parallel_with<F>(
        &self,
        snr_db: &[f64],
        workers: usize,
        mut on_point: F,
    ) -> Result<Vec<SweepPoint>>
    where
        F: FnMut(&SweepPoint),
    {
        let workers = workers.clamp(1, snr_db.len().max(1));
        thread::scope(|scope| -> Result<Vec<SweepPoint>> {
            let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, f64)>();
            let (result_tx, result_rx) = crossbeam_channel::unbounded();

            for job in snr_db.iter().copied().enumerate() {
                // Cannot fail: job_rx is still alive
                let _ = job_tx.send(job);
            }
            drop(job_tx);

            for worker in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (index, snr) in job_rx.iter() {
                        let result = self.run_point(&mut self.point_rng(index), snr);
                        if result_tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                    debug!("Sweep worker {} done", worker);
                });
            }
            drop(result_tx);

            let mut slots: Vec<Option<SweepPoint>> = vec![None; snr_db.len()];
            for (index, result) in result_rx.iter() {
                let point = result?;
                on_point(&point);
                slots[index] = Some(point);
            }
            Ok(slots.into_iter().flatten().collect())
        })
    }

    /// Send `num_symbols` random symbols through the link and keep the
    /// points seen by the detector
    pub fn snapshot<R: Rng>(
        &self,
        rng: &mut R,
        snr_db: f64,
        num_symbols: usize,
    ) -> Result<ConstellationSnapshot> {
        let constellation = self.detector.constellation();
        let symbols: Vec<usize> = (0..num_symbols)
            .map(|_| rng.random_range(0..constellation.order()))
            .collect();
        let transmitted = constellation.map(&symbols);
        let received = self.transmit(rng, &transmitted, snr_db)?;
        let symbol_errors = bits::count_errors(&self.detector.decide(&received), &symbols)?;
        Ok(ConstellationSnapshot {
            snr_db,
            transmitted,
            received,
            symbol_errors,
        })
    }

    fn run_trial<R: Rng>(&self, rng: &mut R, snr_db: f64) -> Result<TrialResult> {
        let bps = self.detector.constellation().bits_per_symbol();
        let message = bits::random_bits(rng, self.bits_per_trial);
        let coded = match &self.code {
            Some(code) => code.encode_stream(&message)?,
            None => message.clone(),
        };
        let symbols = bits::bits_to_symbols(&coded, bps)?;
        let points = self.detector.constellation().map(&symbols);

        let received = self.transmit(rng, &points, snr_db)?;
        let decided = self.detector.decide(&received);
        let rx_coded = bits::symbols_to_bits(&decided, bps);

        let (rx_message, decode) = match &self.code {
            Some(code) => {
                let stream = code.decode_stream(&rx_coded)?;
                (stream.bits, Some(stream.stats))
            }
            None => (rx_coded, None),
        };

        Ok(TrialResult {
            bits: ErrorRate::new(bits::count_errors(&rx_message, &message)?, message.len()),
            symbols: ErrorRate::new(bits::count_errors(&decided, &symbols)?, symbols.len()),
            decode,
        })
    }

    /// Channel and receiver front end: constellation points in, points
    /// ready for decision out
    fn transmit<R: Rng>(
        &self,
        rng: &mut R,
        points: &[Complex64],
        snr_db: f64,
    ) -> Result<Vec<Complex64>> {
        if let Some(framer) = &self.framer {
            let blocks = framer.blocks_from_symbols(points)?;
            let tx = framer.frame(&blocks)?;
            let rx = self.channel.add_noise_complex(rng, &tx, snr_db)?;
            return Ok(framer.deframe(&rx)?.concat());
        }
        if self.detector.constellation().is_real() {
            let levels: Vec<f64> = points.iter().map(|p| p.re).collect();
            let tx = match self.detector.shaper() {
                Some(shaper) => shaper.apply(&levels).samples,
                None => levels,
            };
            let rx = self.channel.add_noise_real(rng, &tx, snr_db)?;
            return Ok(self.detector.sample(&rx));
        }
        self.channel.add_noise_complex(rng, points, snr_db)
    }
}
