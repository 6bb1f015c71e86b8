//! Stateless helpers for converting between bytes and bit strings and for
//! elementwise byte algebra.
//!
//! Bit strings are sequences of ASCII `'0'`/`'1'` characters, most
//! significant bit first. Binary helpers cycle the shorter operand so that
//! the result is as long as the longer one.

use crate::error::{BlobError, Result};

/// Convert bytes to a bit string, 8 characters per byte, MSB first.
pub fn to_bitstr(data: &[u8]) -> String {
    let mut bits = String::with_capacity(data.len() * 8);
    for &byte in data {
        for shift in (0..8).rev() {
            bits.push(if (byte >> shift) & 1 == 1 { '1' } else { '0' });
        }
    }
    bits
}

/// Convert a bit string back to bytes.
/// The string must hold a whole number of bytes.
pub fn from_bitstr(bits: &str) -> Result<Vec<u8>> {
    validate_bitstr(bits)?;
    if bits.len() % 8 != 0 {
        return Err(BlobError::PartialByte(bits.len()));
    }

    Ok(bits
        .as_bytes()
        .chunks_exact(8)
        .map(|chunk| {
            chunk
                .iter()
                .fold(0u8, |acc, &c| (acc << 1) | u8::from(c == b'1'))
        })
        .collect())
}

/// Reject anything other than `'0'` and `'1'`.
pub fn validate_bitstr(bits: &str) -> Result<()> {
    match bits.bytes().position(|c| c != b'0' && c != b'1') {
        Some(pos) => Err(BlobError::TypeMismatch(format!(
            "bit string contains {:?} at position {}",
            bits[pos..].chars().next().unwrap_or('?'),
            pos
        ))),
        None => Ok(()),
    }
}

/// Rotate a bit string right by `n` (negative rotates left).
pub fn ror_bitstr(bits: &str, n: i64) -> String {
    if bits.is_empty() {
        return String::new();
    }
    let n = n.rem_euclid(bits.len() as i64) as usize;
    let split = bits.len() - n;
    format!("{}{}", &bits[split..], &bits[..split])
}

/// Rotate a bit string left by `n` (negative rotates right).
pub fn rol_bitstr(bits: &str, n: i64) -> String {
    ror_bitstr(bits, n.wrapping_neg())
}

/// XOR two bit strings, cycling the shorter one.
pub fn xor_bitstr(a: &str, b: &str) -> String {
    combine_bitstr(a, b, |x, y| x ^ y)
}

pub fn and_bitstr(a: &str, b: &str) -> String {
    combine_bitstr(a, b, |x, y| x & y)
}

pub fn or_bitstr(a: &str, b: &str) -> String {
    combine_bitstr(a, b, |x, y| x | y)
}

pub fn not_bitstr(a: &str) -> String {
    a.bytes().map(|c| if c == b'1' { '0' } else { '1' }).collect()
}

/// XOR two byte strings, cycling the shorter one.
pub fn xor_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    combine_bytes(a, b, |x, y| x ^ y)
}

pub fn and_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    combine_bytes(a, b, |x, y| x & y)
}

pub fn or_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    combine_bytes(a, b, |x, y| x | y)
}

/// Bitwise NOT, defined as XOR against all-ones.
pub fn not_bytes(a: &[u8]) -> Vec<u8> {
    xor_bytes(a, &[0xff])
}

/// Join fixed-width words of `text` with `sep`, e.g. for printing bit strings
/// grouped by byte.
pub fn insert_separators(text: &str, sep: &str, wordsize: usize) -> String {
    if wordsize == 0 {
        return text.to_string();
    }
    text.as_bytes()
        .chunks(wordsize)
        .map(|chunk| String::from_utf8_lossy(chunk))
        .collect::<Vec<_>>()
        .join(sep)
}

/// Combine byte strings elementwise. An empty operand yields an empty result,
/// since there is nothing to cycle.
fn combine_bytes(a: &[u8], b: &[u8], op: impl Fn(u8, u8) -> u8) -> Vec<u8> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| op(a[i % a.len()], b[i % b.len()]))
        .collect()
}

fn combine_bitstr(a: &str, b: &str, op: impl Fn(u8, u8) -> u8) -> String {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.is_empty() || b.is_empty() {
        return String::new();
    }
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a[i % a.len()] - b'0';
            let y = b[i % b.len()] - b'0';
            if op(x, y) & 1 == 1 {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}
