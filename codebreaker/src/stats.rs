use anyhow::{bail, Result};
use bitblob::cli::load_blob;
use bitblob::{Address, Blob, Split};
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;

pub struct StatsOptions {
    pub blocksize: Address,
    pub base: f64,
    /// Analyze a random window of this many blocks instead of the whole file.
    pub sample: Option<usize>,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            blocksize: Address::Byte(1),
            base: 2.0,
            sample: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Severity {
    Pass,
    Warn,
    Fail,
}

impl Severity {
    fn indicator(&self) -> &'static str {
        match self {
            Severity::Pass => "[PASS]",
            Severity::Warn => "[WARN]",
            Severity::Fail => "[FAIL]",
        }
    }
}

/// Entropy and chi-square report over the blocks of a file.
pub fn run(path: &Path, options: &StatsOptions) -> Result<String> {
    let blob = load_blob(path)?;
    if blob.is_empty() {
        bail!("File is empty");
    }

    let width = options.blocksize.to_bits();
    if width <= 0 {
        bail!("Block size must be positive, got {}", options.blocksize);
    }
    let width = width as usize;
    let total_blocks = blob.size_bits().div_ceil(width);

    let mut output = String::new();
    output.push_str("Codebreaker Block Statistics\n");
    output.push_str("============================\n\n");
    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Size: {} bytes ({} bits)\n", blob.size(), blob.size_bits()));
    output.push_str(&format!("Block size: {} ({} blocks)\n", options.blocksize, total_blocks));

    let data = match options.sample {
        Some(0) => bail!("Sample size must be positive"),
        Some(n) if n < total_blocks => {
            let start = rand::thread_rng().gen_range(0..=total_blocks - n);
            output.push_str(&format!("Sample: blocks {}..{} of {}\n", start, start + n, total_blocks));
            blob.slice(Address::Bit((start * width) as i64)..Address::Bit(((start + n) * width) as i64))?
        }
        _ => blob,
    };
    output.push('\n');

    append_block_stats(&mut output, &data, options)?;
    Ok(output)
}

fn append_block_stats(output: &mut String, data: &Blob, options: &StatsOptions) -> Result<()> {
    let split = Split::from(options.blocksize);
    let counts = data.frequencies(&split)?;
    let blocks: usize = counts.iter().sum();
    let width = options.blocksize.to_bits() as usize;

    output.push_str("Frequency Analysis\n");
    output.push_str("------------------\n\n");
    output.push_str(&format!("Blocks analyzed: {}\n", blocks));
    output.push_str(&format!("Distinct blocks: {}\n", counts.len()));
    output.push_str(&format!("Most common: {}\n\n", format_top_blocks(data, &split, 3)?));

    output.push_str("Cryptanalysis Results\n");
    output.push_str("---------------------\n\n");

    let entropy = data.entropy(options.blocksize, options.base)?;
    let max_entropy = max_entropy(width, blocks, options.base);
    let ratio = if max_entropy > 0.0 { entropy / max_entropy } else { 0.0 };
    output.push_str(&format!(
        "{} Shannon Entropy: {:.4} (base {}, {:.1}% of max {:.4})\n",
        severity_entropy(ratio).indicator(),
        entropy,
        options.base,
        ratio * 100.0,
        max_entropy
    ));
    output.push_str(&format!("  Interpretation: {}\n\n", interpret_entropy(ratio)));

    let chi = data.chisquare(options.blocksize, None)?;
    output.push_str(&format!(
        "{} Chi-Square: {:.2} (df={}, p={})\n",
        severity_p_value(chi.p_value).indicator(),
        chi.statistic,
        chi.degrees_of_freedom,
        format_p_value(chi.p_value)
    ));
    output.push_str(&format!("  Interpretation: {}\n\n", interpret_chi_square(chi.p_value)));

    let overall = severity_entropy(ratio).max(severity_p_value(chi.p_value));
    output.push_str(&format!("Overall: {}\n", overall.indicator()));
    Ok(())
}

/// Largest entropy reachable with `blocks` blocks of `width` bits.
fn max_entropy(width: usize, blocks: usize, base: f64) -> f64 {
    if blocks == 0 {
        return 0.0;
    }
    let bits = (width as f64).min((blocks as f64).log2());
    bits / base.log2()
}

fn format_top_blocks(data: &Blob, split: &Split, limit: usize) -> Result<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for block in data.split(split)? {
        *counts.entry(block.to_string()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(ranked
        .iter()
        .take(limit)
        .map(|(block, count)| format!("{} ({}×)", block, count))
        .collect::<Vec<_>>()
        .join(", "))
}

fn severity_entropy(ratio: f64) -> Severity {
    if ratio >= 0.8125 {
        Severity::Pass
    } else if ratio >= 0.5 {
        Severity::Warn
    } else {
        Severity::Fail
    }
}

fn interpret_entropy(ratio: f64) -> &'static str {
    match ratio {
        r if r >= 0.9375 => "Very high entropy (encryption or white noise)",
        r if r >= 0.8125 => "High entropy (well-randomized data)",
        r if r >= 0.6875 => "Moderate entropy (structured but transformed)",
        r if r >= 0.5 => "Low entropy (plain text or similar)",
        _ => "Very low entropy (highly structured)",
    }
}

fn severity_p_value(p: f64) -> Severity {
    if p < 0.01 || p > 0.99 {
        Severity::Fail
    } else if p < 0.05 || p > 0.95 {
        Severity::Warn
    } else {
        Severity::Pass
    }
}

fn interpret_chi_square(p: f64) -> &'static str {
    if p < 0.01 || p > 0.99 {
        "SUSPECT - significant deviation from uniform"
    } else if p < 0.05 || p > 0.95 {
        "Marginal - slight deviation from uniform"
    } else {
        "PASS - consistent with random data"
    }
}

fn format_p_value(p: f64) -> String {
    if p < 0.001 {
        "< 0.001".to_string()
    } else if p > 0.999 {
        "> 0.999".to_string()
    } else {
        format!("{:.3}", p)
    }
}
