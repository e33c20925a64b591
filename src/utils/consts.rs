/// Log level (overridden by RUST_LOG)
pub const LOG_LEVEL: &str = "info";

// ============================================================================
// Simulation defaults
// ============================================================================

/// Bits generated per Monte-Carlo trial
pub const DEFAULT_BITS_PER_TRIAL: usize = 10_000;

/// Trials per SNR point
pub const DEFAULT_TRIALS: usize = 1;

/// Seed for the per-run random generator
pub const DEFAULT_SEED: u64 = 42;

/// SNR sweep (dB): 0..=20 in steps of 2
pub const DEFAULT_SNR_START_DB: f64 = 0.0;
pub const DEFAULT_SNR_STOP_DB: f64 = 20.0;
pub const DEFAULT_SNR_STEP_DB: f64 = 2.0;

// Pulse shaping
/// Symbol rate (symbols per second)
pub const DEFAULT_SYMBOL_RATE: f64 = 1e3;
/// Sampling rate, ten samples per symbol
pub const DEFAULT_SAMPLE_RATE: f64 = 10.0 * DEFAULT_SYMBOL_RATE;
pub const DEFAULT_ROLL_OFF: f64 = 0.25;
/// Symbol periods on each side of the pulse centre
pub const DEFAULT_SPAN: f64 = 4.0;

// OFDM
pub const DEFAULT_SUBCARRIERS: usize = 64;
pub const DEFAULT_CP_LENGTH: usize = 16;
pub const DEFAULT_SUBCARRIER_ORDER: usize = 4;

/// |1 - (2βt/T)²| below this is treated as the raised-cosine singularity
pub const SINGULARITY_EPSILON: f64 = 1e-9;
