//! Linear block coding: systematic encoding and single-error syndrome decoding

pub mod linear_block;

pub use linear_block::{
    DecodeOutcome, DecodeStats, DecodedBlock, DecodedStream, LinearBlockCode,
    hamming74_matrices,
};
