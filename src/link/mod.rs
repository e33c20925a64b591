//! Detection and bit error rate evaluation

pub mod detector;
pub mod evaluator;
pub mod theory;

pub use detector::Detector;
pub use evaluator::{BerEvaluator, ConstellationSnapshot, ErrorRate, SweepPoint};
pub use theory::TheoryCurve;
