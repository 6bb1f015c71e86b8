use anyhow::{bail, Result};
use bitblob::cli::load_blob;
use bitblob::{default_provider, CandidateOptions, Split};
use std::path::Path;

pub struct AnalyzeOptions {
    pub min_blocks: usize,
    /// Report at most this many block sizes, smallest first.
    pub limit: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            min_blocks: 2,
            limit: 16,
        }
    }
}

/// Per-block-size measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSizeReport {
    pub blocksize: usize,
    pub blocks: usize,
    pub distinct: usize,
    pub repeated: usize,
    pub entropy: f64,
}

/// Measure every candidate block size of `data`.
pub fn sweep(data: &bitblob::Blob, options: &AnalyzeOptions) -> Result<Vec<BlockSizeReport>> {
    let candidates = data.blocksize_candidates(&CandidateOptions {
        min_blocks: options.min_blocks,
        min_blocksize: 1,
    });

    let mut reports = Vec::new();
    for blocksize in candidates.into_iter().take(options.limit) {
        let counts = data.frequencies(&Split::size(blocksize))?;
        let blocks: usize = counts.iter().sum();
        reports.push(BlockSizeReport {
            blocksize,
            blocks,
            distinct: counts.len(),
            repeated: blocks - counts.len(),
            entropy: default_provider().entropy(&counts, 2.0)?,
        });
    }
    Ok(reports)
}

/// Sweep block-size candidates and flag repeated blocks.
pub fn analyze_file(path: &Path, options: &AnalyzeOptions) -> Result<String> {
    let data = load_blob(path)?;
    if data.is_empty() {
        bail!("File is empty");
    }
    let reports = sweep(&data, options)?;

    let mut output = String::new();
    output.push_str("Codebreaker Block Size Analyzer\n");
    output.push_str("===============================\n\n");
    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Size: {}\n\n", format_size(data.size() as u64)));

    if reports.is_empty() {
        output.push_str(&format!(
            "No block size yields at least {} blocks.\n",
            options.min_blocks
        ));
        return Ok(output);
    }

    output.push_str("Block size    Blocks  Distinct  Repeated   Entropy\n");
    output.push_str("----------  --------  --------  --------  --------\n");
    for report in &reports {
        output.push_str(&format!(
            "{:>10}  {:>8}  {:>8}  {:>8}  {:>8.4}{}\n",
            report.blocksize,
            report.blocks,
            report.distinct,
            report.repeated,
            report.entropy,
            if is_ecb_suspect(report) { "  <- repeated blocks" } else { "" }
        ));
    }

    if let Some(report) = reports.iter().find(|r| is_ecb_suspect(r)) {
        output.push_str(&format!(
            "\nRepeated {}-byte blocks: data may be a block cipher in ECB mode.\n",
            report.blocksize
        ));
    }

    Ok(output)
}

fn is_ecb_suspect(report: &BlockSizeReport) -> bool {
    report.blocksize >= 8 && report.repeated > 0
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
