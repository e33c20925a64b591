use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use tracing::debug;

use crate::error::{Result, SimError};

/// Cyclic-prefix OFDM framing
///
/// Each block of `num_subcarriers` frequency-domain symbols becomes
/// `num_subcarriers + cp_length` time-domain samples: the inverse DFT of the
/// block, preceded by a copy of its last `cp_length` samples. A prefix
/// longer than the block wraps around it, so the samples of a framed block
/// are always periodic in `num_subcarriers`. Blocks are serialized one
/// after another.
///
/// Both transforms are scaled by 1/√N, so a time sample carries the same
/// mean energy as a subcarrier symbol and noise keeps its variance through
/// the forward transform.
#[derive(Clone)]
pub struct OfdmFramer {
    num_subcarriers: usize,
    cp_length: usize,
    ifft: Arc<dyn Fft<f64>>,
    fft: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for OfdmFramer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfdmFramer")
            .field("num_subcarriers", &self.num_subcarriers)
            .field("cp_length", &self.cp_length)
            .finish()
    }
}

impl OfdmFramer {
    pub fn new(num_subcarriers: usize, cp_length: usize) -> Result<Self> {
        if num_subcarriers == 0 {
            return Err(SimError::InvalidOfdm(
                "number of subcarriers must be positive".to_string(),
            ));
        }
        let mut planner = FftPlanner::<f64>::new();
        let ifft = planner.plan_fft_inverse(num_subcarriers);
        let fft = planner.plan_fft_forward(num_subcarriers);
        debug!(
            "OFDM framer: {} subcarriers, cyclic prefix {}",
            num_subcarriers, cp_length
        );
        Ok(Self {
            num_subcarriers,
            cp_length,
            ifft,
            fft,
        })
    }

    pub fn num_subcarriers(&self) -> usize {
        self.num_subcarriers
    }

    pub fn cp_length(&self) -> usize {
        self.cp_length
    }

    /// Time-domain samples per block, prefix included
    pub fn block_len(&self) -> usize {
        self.num_subcarriers + self.cp_length
    }

    /// Frame frequency-domain blocks into one serialized waveform
    pub fn frame(&self, blocks: &[Vec<Complex64>]) -> Result<Vec<Complex64>> {
        let n = self.num_subcarriers;
        let scale = self.scale();
        let wrap = n - self.cp_length % n;
        let mut out = Vec::with_capacity(blocks.len() * self.block_len());
        for (i, block) in blocks.iter().enumerate() {
            if block.len() != n {
                return Err(SimError::InvalidOfdm(format!(
                    "block {} has {} subcarriers, expected {}",
                    i,
                    block.len(),
                    n
                )));
            }
            // rustfft leaves both directions unnormalized
            let mut time = block.clone();
            self.ifft.process(&mut time);
            for sample in time.iter_mut() {
                *sample *= scale;
            }
            out.extend((0..self.cp_length).map(|i| time[(i + wrap) % n]));
            out.extend_from_slice(&time);
        }
        Ok(out)
    }

    /// Split a serialized waveform into blocks, strip each prefix and
    /// transform back to the frequency domain
    pub fn deframe(&self, rx: &[Complex64]) -> Result<Vec<Vec<Complex64>>> {
        let block_len = self.block_len();
        let scale = self.scale();
        if rx.len() % block_len != 0 {
            return Err(SimError::BlockLength {
                len: rx.len(),
                block: block_len,
            });
        }
        Ok(rx
            .chunks(block_len)
            .map(|block| {
                let mut freq = block[self.cp_length..].to_vec();
                self.fft.process(&mut freq);
                for bin in freq.iter_mut() {
                    *bin *= scale;
                }
                freq
            })
            .collect())
    }

    fn scale(&self) -> f64 {
        1.0 / (self.num_subcarriers as f64).sqrt()
    }

    /// Arrange a symbol stream into consecutive blocks of `num_subcarriers`
    pub fn blocks_from_symbols(&self, symbols: &[Complex64]) -> Result<Vec<Vec<Complex64>>> {
        if symbols.len() % self.num_subcarriers != 0 {
            return Err(SimError::BlockLength {
                len: symbols.len(),
                block: self.num_subcarriers,
            });
        }
        Ok(symbols
            .chunks(self.num_subcarriers)
            .map(|chunk| chunk.to_vec())
            .collect())
    }
}
