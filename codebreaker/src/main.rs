mod analyze;
mod keys;
mod stats;

use analyze::{analyze_file, AnalyzeOptions};
use bitblob::Address;
use clap::{ArgGroup, Parser, Subcommand};
use keys::{rank_keys, KeyOptions};
use stats::{run as run_stats, StatsOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codebreaker")]
#[command(about = "Block-level cryptanalysis built on bitblob")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Entropy and chi-square statistics over fixed-size blocks
    #[command(group(ArgGroup::new("width").args(["blocksize", "blocksize_bits"])))]
    Stats {
        /// File to analyze
        file: PathBuf,

        /// Block size in bytes (default: 1)
        #[arg(long)]
        blocksize: Option<usize>,

        /// Block size in bits
        #[arg(long)]
        blocksize_bits: Option<usize>,

        /// Logarithm base for entropy
        #[arg(long, default_value_t = 2.0)]
        base: f64,

        /// Analyze a random window of this many blocks
        #[arg(long)]
        sample: Option<usize>,
    },

    /// Sweep candidate block sizes looking for repeated blocks
    Analyze {
        /// File to analyze
        file: PathBuf,

        /// Minimum number of blocks per candidate
        #[arg(long, default_value_t = 2)]
        min_blocks: usize,

        /// Maximum number of block sizes to report
        #[arg(long, default_value_t = 16)]
        limit: usize,
    },

    /// Rank rotating self-XORs by entropy to find repeating-key periods
    Keys {
        /// File to analyze
        file: PathBuf,

        /// Rotation step in bits
        #[arg(long, default_value_t = 8)]
        step_bits: usize,

        /// Number of rotations to show
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Maximum number of rotations to try
        #[arg(long, default_value_t = 1024)]
        max_rotations: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Stats {
            file,
            blocksize,
            blocksize_bits,
            base,
            sample,
        } => {
            let blocksize = match (blocksize, blocksize_bits) {
                (_, Some(bits)) => Address::Bit(bits as i64),
                (Some(bytes), None) => Address::Byte(bytes as i64),
                (None, None) => Address::Byte(1),
            };
            let options = StatsOptions {
                blocksize,
                base,
                sample,
            };
            let report = run_stats(&file, &options)?;
            print!("{}", report);
        }
        Commands::Analyze {
            file,
            min_blocks,
            limit,
        } => {
            let options = AnalyzeOptions { min_blocks, limit };
            let report = analyze_file(&file, &options)?;
            print!("{}", report);
        }
        Commands::Keys {
            file,
            step_bits,
            top,
            max_rotations,
        } => {
            let options = KeyOptions {
                step_bits,
                top,
                max_rotations,
            };
            let report = rank_keys(&file, &options)?;
            print!("{}", report);
        }
    }

    Ok(())
}
