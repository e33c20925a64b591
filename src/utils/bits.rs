// Bit/symbol conversion helpers
// Bits are stored one per u8 (0 or 1), grouped MSB first into symbols.

use rand::Rng;

use crate::error::{Result, SimError};

/// Generate `n` independent, equiprobable bits
pub fn random_bits<R: Rng>(rng: &mut R, n: usize) -> Vec<u8> {
    (0..n)
        .map(|_| rng.random_bool(0.5) as u8)
        .collect()
}

/// Convert a group of bits to a symbol index (MSB first)
pub fn bits_to_symbol(bits: &[u8]) -> usize {
    bits.iter()
        .fold(0usize, |acc, &bit| (acc << 1) | (bit & 1) as usize)
}

/// Convert a symbol index to `width` bits (MSB first)
pub fn symbol_to_bits(symbol: usize, width: usize) -> Vec<u8> {
    (0..width)
        .map(|i| ((symbol >> (width - 1 - i)) & 1) as u8)
        .collect()
}

/// Group a bitstream into symbol indices of `bits_per_symbol` bits each
pub fn bits_to_symbols(bits: &[u8], bits_per_symbol: usize) -> Result<Vec<usize>> {
    if bits_per_symbol == 0 || bits.len() % bits_per_symbol != 0 {
        return Err(SimError::BlockLength {
            len: bits.len(),
            block: bits_per_symbol,
        });
    }
    Ok(bits
        .chunks(bits_per_symbol)
        .map(bits_to_symbol)
        .collect())
}

/// Expand symbol indices back into a bitstream
pub fn symbols_to_bits(symbols: &[usize], bits_per_symbol: usize) -> Vec<u8> {
    let mut bits = Vec::with_capacity(symbols.len() * bits_per_symbol);
    for &symbol in symbols {
        bits.extend(symbol_to_bits(symbol, bits_per_symbol));
    }
    bits
}

/// Number of positions where the two sequences differ
pub fn count_errors<T: PartialEq>(seq: &[T], reference: &[T]) -> Result<usize> {
    if seq.len() != reference.len() {
        return Err(SimError::LengthMismatch {
            len: seq.len(),
            expected: reference.len(),
        });
    }
    Ok(reference
        .iter()
        .zip(seq.iter())
        .filter(|&(x, y)| x != y)
        .count())
}
