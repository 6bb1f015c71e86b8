use anyhow::{bail, Result};
use bitblob::cli::load_blob;
use bitblob::{Address, Blob};
use std::path::Path;

pub struct KeyOptions {
    pub step_bits: usize,
    pub top: usize,
    /// Stop after this many rotations.
    pub max_rotations: usize,
}

impl Default for KeyOptions {
    fn default() -> Self {
        Self {
            step_bits: 8,
            top: 10,
            max_rotations: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationScore {
    pub rotation_bits: usize,
    pub entropy: f64,
    pub zero_bytes: usize,
}

/// XOR the data against rotated copies of itself and rank the rotations by
/// byte entropy, lowest first. A repeating-key XOR leaves low-entropy output
/// at rotations that are multiples of the key length.
pub fn rank_rotations(data: &Blob, options: &KeyOptions) -> Result<Vec<RotationScore>> {
    if options.step_bits == 0 {
        bail!("Rotation step must be positive");
    }

    let mut scores = Vec::new();
    let xors = data.rotating_xors(None, Address::Bit(options.step_bits as i64))?;
    // rotation 0 is the blob against itself
    for (i, xored) in xors.enumerate().skip(1).take(options.max_rotations) {
        let zero_bytes = xored.bytes()?.iter().filter(|&&b| b == 0).count();
        scores.push(RotationScore {
            rotation_bits: i * options.step_bits,
            entropy: xored.entropy(Address::Byte(1), 2.0)?,
            zero_bytes,
        });
    }

    scores.sort_by(|a, b| {
        a.entropy
            .total_cmp(&b.entropy)
            .then_with(|| a.rotation_bits.cmp(&b.rotation_bits))
    });
    Ok(scores)
}

pub fn rank_keys(path: &Path, options: &KeyOptions) -> Result<String> {
    let data = load_blob(path)?;
    if data.size() < 2 {
        bail!("Need at least 2 bytes to rotate");
    }
    let scores = rank_rotations(&data, options)?;

    let mut output = String::new();
    output.push_str("Codebreaker Rotating XOR Ranking\n");
    output.push_str("================================\n\n");
    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!(
        "Rotations tried: {} (step {} bits)\n\n",
        scores.len(),
        options.step_bits
    ));

    output.push_str("  Rotation   Entropy  Zero bytes\n");
    output.push_str("  --------  --------  ----------\n");
    for score in scores.iter().take(options.top) {
        output.push_str(&format!(
            "  {:>8}  {:>8.4}  {:>5.1}%\n",
            format_rotation(score.rotation_bits),
            score.entropy,
            score.zero_bytes as f64 * 100.0 / data.size() as f64
        ));
    }

    Ok(output)
}

fn format_rotation(bits: usize) -> String {
    if bits % 8 == 0 {
        format!("{}B", bits / 8)
    } else {
        format!("{}b", bits)
    }
}
