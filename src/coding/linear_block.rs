//! Systematic linear block code over GF(2) with syndrome decoding
//!
//! Codewords are `message · G mod 2`. The decoder corrects exactly the
//! single-bit error patterns: a nonzero syndrome equal to column `j` of `H`
//! flips bit `j`. Any other nonzero syndrome is left uncorrected and the
//! message bits pass through as received.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SimError};

/// What the decoder did with one received word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Zero syndrome, nothing to correct
    Clean,
    /// Syndrome matched column `position` of H and that bit was flipped
    Corrected { position: usize },
    /// Nonzero syndrome with no matching column; bits passed through
    Uncorrectable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBlock {
    pub message: Vec<u8>,
    pub outcome: DecodeOutcome,
}

impl DecodedBlock {
    pub fn corrected(&self) -> bool {
        matches!(self.outcome, DecodeOutcome::Corrected { .. })
    }
}

/// Per-stream decoder counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    pub blocks: usize,
    pub clean: usize,
    pub corrected: usize,
    pub uncorrectable: usize,
}

impl DecodeStats {
    fn record(&mut self, outcome: DecodeOutcome) {
        self.blocks += 1;
        match outcome {
            DecodeOutcome::Clean => self.clean += 1,
            DecodeOutcome::Corrected { .. } => self.corrected += 1,
            DecodeOutcome::Uncorrectable => self.uncorrectable += 1,
        }
    }

    pub fn merge(&mut self, other: &DecodeStats) {
        self.blocks += other.blocks;
        self.clean += other.clean;
        self.corrected += other.corrected;
        self.uncorrectable += other.uncorrectable;
    }
}

#[derive(Debug, Clone)]
pub struct DecodedStream {
    pub bits: Vec<u8>,
    pub stats: DecodeStats,
}

#[derive(Debug, Clone)]
pub struct LinearBlockCode {
    n: usize,
    k: usize,
    generator: Vec<Vec<u8>>,
    parity_check: Vec<Vec<u8>>,
    /// Column of H → bit position
    syndrome_table: HashMap<Vec<u8>, usize>,
}

impl LinearBlockCode {
    /// Build a code from a systematic `k × n` generator matrix and an
    /// `(n-k) × n` parity-check matrix.
    ///
    /// Rejects matrices that are not binary, a generator whose first `k`
    /// columns are not the identity, pairs with `G · Hᵗ ≠ 0`, and parity-check
    /// matrices with a zero or repeated column (single-error correction
    /// would not be guaranteed).
    pub fn new(generator: Vec<Vec<u8>>, parity_check: Vec<Vec<u8>>) -> Result<Self> {
        let (k, n) = shape(&generator, "generator")?;
        let (r, h_cols) = shape(&parity_check, "parity-check")?;

        if k >= n {
            return Err(SimError::InvalidCode(format!(
                "generator must have fewer rows than columns, got {}x{}",
                k, n
            )));
        }
        if r != n - k || h_cols != n {
            return Err(SimError::InvalidCode(format!(
                "parity-check must be {}x{} for a {}x{} generator, got {}x{}",
                n - k,
                n,
                k,
                n,
                r,
                h_cols
            )));
        }

        for (i, row) in generator.iter().enumerate() {
            for (j, &bit) in row.iter().take(k).enumerate() {
                if bit != (i == j) as u8 {
                    return Err(SimError::InvalidCode(format!(
                        "generator is not systematic: G[{}][{}] = {}",
                        i, j, bit
                    )));
                }
            }
        }

        for (i, g_row) in generator.iter().enumerate() {
            for (p, h_row) in parity_check.iter().enumerate() {
                if dot_mod2(g_row, h_row) != 0 {
                    return Err(SimError::InvalidCode(format!(
                        "G·Hᵗ ≠ 0 mod 2 (generator row {}, parity-check row {})",
                        i, p
                    )));
                }
            }
        }

        let mut syndrome_table = HashMap::with_capacity(n);
        for j in 0..n {
            let column: Vec<u8> = parity_check.iter().map(|row| row[j]).collect();
            if column.iter().all(|&b| b == 0) {
                return Err(SimError::InvalidCode(format!(
                    "parity-check column {} is zero",
                    j
                )));
            }
            if let Some(prev) = syndrome_table.insert(column, j) {
                return Err(SimError::InvalidCode(format!(
                    "parity-check columns {} and {} are equal",
                    prev, j
                )));
            }
        }

        debug!("Linear block code ({}, {}) with {} correctable patterns", n, k, n);

        Ok(Self {
            n,
            k,
            generator,
            parity_check,
            syndrome_table,
        })
    }

    /// The (7,4) Hamming code, G = [I₄ | P] and H = [Pᵗ | I₃]
    pub fn hamming74() -> Result<Self> {
        let (generator, parity_check) = hamming74_matrices();
        Self::new(generator, parity_check)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn rate(&self) -> f64 {
        self.k as f64 / self.n as f64
    }

    pub fn generator(&self) -> &[Vec<u8>] {
        &self.generator
    }

    pub fn parity_check(&self) -> &[Vec<u8>] {
        &self.parity_check
    }

    /// Correctable syndromes and the bit each one flips, by position
    pub fn syndrome_table(&self) -> Vec<(Vec<u8>, usize)> {
        let mut table: Vec<(Vec<u8>, usize)> = self
            .syndrome_table
            .iter()
            .map(|(s, &j)| (s.clone(), j))
            .collect();
        table.sort_by_key(|&(_, j)| j);
        table
    }

    /// Encode one `k`-bit message into an `n`-bit codeword
    pub fn encode(&self, message: &[u8]) -> Result<Vec<u8>> {
        if message.len() != self.k {
            return Err(SimError::BlockLength {
                len: message.len(),
                block: self.k,
            });
        }
        let mut codeword = vec![0u8; self.n];
        for (row, &bit) in self.generator.iter().zip(message) {
            if bit & 1 == 1 {
                for (c, &g) in codeword.iter_mut().zip(row) {
                    *c ^= g;
                }
            }
        }
        Ok(codeword)
    }

    /// received · Hᵗ mod 2
    pub fn syndrome(&self, received: &[u8]) -> Vec<u8> {
        self.parity_check
            .iter()
            .map(|row| dot_mod2(row, received))
            .collect()
    }

    /// Decode one `n`-bit received word
    pub fn decode(&self, received: &[u8]) -> Result<DecodedBlock> {
        if received.len() != self.n {
            return Err(SimError::BlockLength {
                len: received.len(),
                block: self.n,
            });
        }
        let syndrome = self.syndrome(received);
        let mut word: Vec<u8> = received.iter().map(|&b| b & 1).collect();

        let outcome = if syndrome.iter().all(|&s| s == 0) {
            DecodeOutcome::Clean
        } else if let Some(&position) = self.syndrome_table.get(&syndrome) {
            word[position] ^= 1;
            DecodeOutcome::Corrected { position }
        } else {
            DecodeOutcome::Uncorrectable
        };

        word.truncate(self.k);
        Ok(DecodedBlock {
            message: word,
            outcome,
        })
    }

    /// Encode a bitstream whose length is a multiple of `k`
    pub fn encode_stream(&self, bits: &[u8]) -> Result<Vec<u8>> {
        if bits.len() % self.k != 0 {
            return Err(SimError::BlockLength {
                len: bits.len(),
                block: self.k,
            });
        }
        let mut out = Vec::with_capacity(bits.len() / self.k * self.n);
        for message in bits.chunks(self.k) {
            out.extend(self.encode(message)?);
        }
        Ok(out)
    }

    /// Decode a bitstream whose length is a multiple of `n`
    pub fn decode_stream(&self, bits: &[u8]) -> Result<DecodedStream> {
        if bits.len() % self.n != 0 {
            return Err(SimError::BlockLength {
                len: bits.len(),
                block: self.n,
            });
        }
        let mut out = Vec::with_capacity(bits.len() / self.n * self.k);
        let mut stats = DecodeStats::default();
        for word in bits.chunks(self.n) {
            let block = self.decode(word)?;
            stats.record(block.outcome);
            out.extend(block.message);
        }
        if stats.uncorrectable > 0 {
            debug!(
                "{} of {} codewords had uncorrectable syndromes",
                stats.uncorrectable, stats.blocks
            );
        }
        Ok(DecodedStream { bits: out, stats })
    }
}

/// Generator and parity-check matrices of the (7,4) Hamming code
pub fn hamming74_matrices() -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
    let generator = vec![
        vec![1, 0, 0, 0, 1, 0, 1],
        vec![0, 1, 0, 0, 1, 1, 1],
        vec![0, 0, 1, 0, 0, 1, 1],
        vec![0, 0, 0, 1, 1, 1, 0],
    ];
    let parity_check = vec![
        vec![1, 1, 0, 1, 1, 0, 0],
        vec![0, 1, 1, 1, 0, 1, 0],
        vec![1, 1, 1, 0, 0, 0, 1],
    ];
    (generator, parity_check)
}

fn shape(matrix: &[Vec<u8>], name: &str) -> Result<(usize, usize)> {
    let rows = matrix.len();
    let cols = matrix.first().map_or(0, |row| row.len());
    if rows == 0 || cols == 0 {
        return Err(SimError::InvalidCode(format!("{} matrix is empty", name)));
    }
    for (i, row) in matrix.iter().enumerate() {
        if row.len() != cols {
            return Err(SimError::InvalidCode(format!(
                "{} row {} has {} columns, expected {}",
                name,
                i,
                row.len(),
                cols
            )));
        }
        if row.iter().any(|&b| b > 1) {
            return Err(SimError::InvalidCode(format!(
                "{} row {} is not binary",
                name, i
            )));
        }
    }
    Ok((rows, cols))
}

fn dot_mod2(a: &[u8], b: &[u8]) -> u8 {
    a.iter()
        .zip(b)
        .fold(0u8, |acc, (&x, &y)| acc ^ (x & y & 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::bits::symbol_to_bits;

    fn all_messages(k: usize) -> Vec<Vec<u8>> {
        (0..1usize << k).map(|m| symbol_to_bits(m, k)).collect()
    }

    #[test]
    fn test_hamming74_is_systematic() {
        let code = LinearBlockCode::hamming74().unwrap();
        assert_eq!((code.n(), code.k()), (7, 4));
        assert!((code.rate() - 4.0 / 7.0).abs() < 1e-12);

        let codeword = code.encode(&[1, 0, 1, 1]).unwrap();
        assert_eq!(&codeword[..4], &[1, 0, 1, 1]);
        assert_eq!(codeword, vec![1, 0, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_codewords_have_zero_syndrome() {
        let code = LinearBlockCode::hamming74().unwrap();
        for message in all_messages(4) {
            let codeword = code.encode(&message).unwrap();
            assert!(code.syndrome(&codeword).iter().all(|&s| s == 0));
            let decoded = code.decode(&codeword).unwrap();
            assert_eq!(decoded.outcome, DecodeOutcome::Clean);
            assert_eq!(decoded.message, message);
        }
    }

    #[test]
    fn test_every_single_bit_error_is_corrected() {
        let code = LinearBlockCode::hamming74().unwrap();
        for message in all_messages(4) {
            let codeword = code.encode(&message).unwrap();
            for j in 0..7 {
                let mut received = codeword.clone();
                received[j] ^= 1;
                let decoded = code.decode(&received).unwrap();
                assert_eq!(decoded.message, message, "message {:?} flip {}", message, j);
                assert_eq!(decoded.outcome, DecodeOutcome::Corrected { position: j });
                assert!(decoded.corrected());
            }
        }
    }

    #[test]
    fn test_double_bit_error_is_not_recovered_by_hamming74() {
        // A perfect code maps every double error onto some single-error
        // syndrome, so decoding lands on a different codeword.
        let code = LinearBlockCode::hamming74().unwrap();
        let message = vec![0, 1, 1, 0];
        let mut received = code.encode(&message).unwrap();
        received[0] ^= 1;
        received[1] ^= 1;
        let decoded = code.decode(&received).unwrap();
        assert!(decoded.corrected());
        assert_ne!(decoded.message, message);
    }

    #[test]
    fn test_unmatched_syndrome_passes_bits_through() {
        // Shortened code: syndrome 111 matches no column of H
        let generator = vec![
            vec![1, 0, 0, 1, 1, 0],
            vec![0, 1, 0, 0, 1, 1],
            vec![0, 0, 1, 1, 0, 1],
        ];
        let parity_check = vec![
            vec![1, 0, 1, 1, 0, 0],
            vec![1, 1, 0, 0, 1, 0],
            vec![0, 1, 1, 0, 0, 1],
        ];
        let code = LinearBlockCode::new(generator, parity_check).unwrap();
        let mut received = code.encode(&[1, 0, 1]).unwrap();
        received[0] ^= 1;
        received[5] ^= 1;
        assert_eq!(code.syndrome(&received), vec![1, 1, 1]);

        let decoded = code.decode(&received).unwrap();
        assert_eq!(decoded.outcome, DecodeOutcome::Uncorrectable);
        assert_eq!(decoded.message, received[..3].to_vec());
        assert!(!decoded.corrected());
    }

    #[test]
    fn test_stream_round_trip_and_stats() {
        let code = LinearBlockCode::hamming74().unwrap();
        let bits = vec![1, 0, 1, 1, 0, 0, 0, 1, 1, 1, 1, 1];
        let mut encoded = code.encode_stream(&bits).unwrap();
        assert_eq!(encoded.len(), 21);

        encoded[2] ^= 1;
        encoded[7 + 6] ^= 1;
        let decoded = code.decode_stream(&encoded).unwrap();
        assert_eq!(decoded.bits, bits);
        assert_eq!(
            decoded.stats,
            DecodeStats {
                blocks: 3,
                clean: 1,
                corrected: 2,
                uncorrectable: 0
            }
        );
    }

    #[test]
    fn test_stream_length_must_be_block_multiple() {
        let code = LinearBlockCode::hamming74().unwrap();
        assert!(matches!(
            code.encode_stream(&[1, 0, 1]),
            Err(SimError::BlockLength { len: 3, block: 4 })
        ));
        assert!(matches!(
            code.decode_stream(&[0; 8]),
            Err(SimError::BlockLength { len: 8, block: 7 })
        ));
        assert!(code.encode(&[1, 0]).is_err());
    }

    #[test]
    fn test_rejects_non_orthogonal_parity_check() {
        let (generator, _) = hamming74_matrices();
        // A 4x7 parity-check matrix in circulation for this G; not orthogonal to it
        let legacy = vec![
            vec![1, 1, 0, 1, 0, 0, 0],
            vec![1, 0, 1, 0, 1, 0, 0],
            vec![0, 1, 1, 0, 0, 1, 0],
            vec![1, 1, 1, 0, 0, 0, 1],
        ];
        assert!(LinearBlockCode::new(generator.clone(), legacy).is_err());

        // Right shape, wrong content
        let wrong = vec![
            vec![1, 0, 1, 1, 1, 0, 0],
            vec![0, 1, 1, 1, 0, 1, 0],
            vec![1, 1, 1, 0, 0, 0, 1],
        ];
        let err = LinearBlockCode::new(generator, wrong).unwrap_err();
        assert!(err.to_string().contains("G·Hᵗ"), "{}", err);
    }

    #[test]
    fn test_rejects_repeated_or_zero_columns() {
        // Columns 0 and 1 of H are equal: G row 0 + row 1 parity must match
        let generator = vec![vec![1, 0, 1, 1], vec![0, 1, 1, 1]];
        let parity_check = vec![vec![1, 1, 1, 0], vec![1, 1, 0, 1]];
        let err = LinearBlockCode::new(generator, parity_check).unwrap_err();
        assert!(err.to_string().contains("equal"), "{}", err);

        let generator = vec![vec![1, 0, 0]];
        let parity_check = vec![vec![0, 1, 0], vec![0, 0, 1]];
        let err = LinearBlockCode::new(generator, parity_check).unwrap_err();
        assert!(err.to_string().contains("zero"), "{}", err);
    }

    #[test]
    fn test_rejects_malformed_matrices() {
        assert!(LinearBlockCode::new(vec![], vec![vec![1]]).is_err());
        assert!(LinearBlockCode::new(vec![vec![1, 0, 2]], vec![vec![0, 1, 0]]).is_err());
        // Not systematic
        let generator = vec![vec![0, 1, 1]];
        let parity_check = vec![vec![1, 1, 0], vec![1, 0, 1]];
        assert!(LinearBlockCode::new(generator, parity_check).is_err());
    }

    #[test]
    fn test_syndrome_table_lists_columns_of_h() {
        let code = LinearBlockCode::hamming74().unwrap();
        let table = code.syndrome_table();
        assert_eq!(table.len(), 7);
        assert_eq!(table[0], (vec![1, 0, 1], 0));
        assert_eq!(table[6], (vec![0, 0, 1], 6));
    }
}
