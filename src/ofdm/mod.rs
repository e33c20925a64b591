//! OFDM framing with cyclic prefix

pub mod framer;

pub use framer::OfdmFramer;
