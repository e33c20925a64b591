//! Raised-cosine pulse shaping
//!
//! Builds the pulse and turns real symbol levels into a sampled waveform,
//! either one pulse period per symbol or by full convolution.

pub mod raised_cosine;
pub mod shaper;

pub use raised_cosine::{Pulse, SingularityPolicy};
pub use shaper::{PulseShaper, ShapingMode, Waveform};
