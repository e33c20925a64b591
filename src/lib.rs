//! Baseband digital link simulation: constellation mapping, raised-cosine
//! pulse shaping, linear block coding, cyclic-prefix OFDM, AWGN and
//! bit error rate sweeps.

pub mod channel;
pub mod coding;
pub mod config;
pub mod error;
pub mod link;
pub mod modulation;
pub mod ofdm;
pub mod pulse;
pub mod utils;

pub use error::{Result, SimError};
