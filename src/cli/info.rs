use crate::address::Address;
use crate::blocksize::CandidateOptions;
use crate::cli::{format_size, load_blob};
use crate::error::{BlobError, Result};
use serde::Serialize;
use std::path::Path;

/// Options for the info command
#[derive(Debug, Clone, Default)]
pub struct InfoOptions {
    pub json: bool,
    pub candidates: CandidateOptions,
}

/// Summary of a file viewed as a blob.
#[derive(Debug, Clone, Serialize)]
pub struct BlobInfo {
    pub file: String,
    pub size: usize,
    pub size_bits: usize,
    pub byte_aligned: bool,
    pub blocksize_candidates: Vec<usize>,
    pub blocksize_bits_candidates: Vec<usize>,
    /// Byte entropy in bits, if a statistics provider is available.
    pub entropy: Option<f64>,
}

pub fn blob_info(path: &Path, candidates: &CandidateOptions) -> Result<BlobInfo> {
    let blob = load_blob(path)?;
    let entropy = match blob.entropy(Address::Byte(1), 2.0) {
        Ok(entropy) => Some(entropy),
        Err(BlobError::UnavailableDependency(_)) => None,
        Err(e) => return Err(e),
    };

    Ok(BlobInfo {
        file: path.display().to_string(),
        size: blob.size(),
        size_bits: blob.size_bits(),
        byte_aligned: blob.byte_aligned(),
        blocksize_candidates: blob.blocksize_candidates(candidates),
        blocksize_bits_candidates: blob.blocksize_bits_candidates(candidates),
        entropy,
    })
}

/// Display information about a file
pub fn show_info(path: &Path, options: &InfoOptions) -> Result<String> {
    let info = blob_info(path, &options.candidates)?;
    if options.json {
        let mut output = serde_json::to_string_pretty(&info)?;
        output.push('\n');
        return Ok(output);
    }

    let mut output = String::new();

    output.push_str("Blob Information\n");
    output.push_str("================\n\n");

    output.push_str(&format!("File: {}\n", info.file));
    output.push_str(&format!("Size: {} ({} bytes, {} bits)\n", format_size(info.size as u64), info.size, info.size_bits));
    output.push_str(&format!("Byte aligned: {}\n", if info.byte_aligned { "yes" } else { "no" }));
    match info.entropy {
        Some(entropy) => output.push_str(&format!("Byte entropy: {:.4} bits\n", entropy)),
        None => output.push_str("Byte entropy: unavailable\n"),
    }
    output.push('\n');

    output.push_str(&format!(
        "Block size candidates (min {} blocks, min block size {}):\n",
        options.candidates.min_blocks, options.candidates.min_blocksize
    ));
    output.push_str(&format!("  Bytes: {}\n", join(&info.blocksize_candidates)));
    output.push_str(&format!("  Bits: {}\n", join(&info.blocksize_bits_candidates)));

    Ok(output)
}

fn join(values: &[usize]) -> String {
    if values.is_empty() {
        return "none".to_string();
    }
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}
