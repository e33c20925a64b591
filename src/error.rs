use std::io;

/// Errors raised while building or running a link simulation.
///
/// Only configuration problems are errors. Transmission errors, including
/// codewords the decoder cannot correct, are counted in the results.
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    #[error("invalid block code: {0}")]
    InvalidCode(String),
    #[error("invalid pulse parameters: {0}")]
    InvalidPulse(String),
    #[error("invalid modulation: {0}")]
    InvalidModulation(String),
    #[error("invalid OFDM parameters: {0}")]
    InvalidOfdm(String),
    #[error("invalid channel parameters: {0}")]
    InvalidChannel(String),
    #[error("invalid SNR sweep: {0}")]
    InvalidSweep(String),
    #[error("length {len} is not a multiple of block size {block}")]
    BlockLength { len: usize, block: usize },
    #[error("compared sequences differ in length: {len} vs {expected}")]
    LengthMismatch { len: usize, expected: usize },
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
