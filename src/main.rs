use bitblob::cli::{
    parse_hex, rol_file, show_info, split_file, xor_file, InfoOptions, SplitOptions, XorOptions,
};
use bitblob::{Address, BlobError, CandidateOptions, Extension, SplitBy};
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Version info from build.rs
const VERSION: &str = env!("BITBLOB_VERSION");
const PROFILE: &str = env!("BITBLOB_PROFILE");
const GIT_HASH: &str = env!("BITBLOB_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} ({})", PROFILE, VERSION, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "bitblob")]
#[command(author, about = "Byte- and bit-level inspection of binary blobs", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show sizes, alignment and block-size candidates
    #[command(alias = "i")]
    Info {
        /// File to inspect
        file: PathBuf,

        /// Print a JSON report
        #[arg(long)]
        json: bool,

        /// Minimum number of blocks a candidate must yield
        #[arg(long, default_value_t = 2)]
        min_blocks: usize,

        /// Smallest block size to report
        #[arg(long, default_value_t = 1)]
        min_blocksize: usize,
    },

    /// Split a file into fragments
    #[command(alias = "s")]
    #[command(group(
        ArgGroup::new("by")
            .required(true)
            .args(["sep", "sep_bits", "size", "size_bits", "count"])
    ))]
    Split {
        /// File to split
        file: PathBuf,

        /// Byte separator, as hex
        #[arg(long)]
        sep: Option<String>,

        /// Bit separator, as a string of 0s and 1s
        #[arg(long)]
        sep_bits: Option<String>,

        /// Fragment size in bytes
        #[arg(long)]
        size: Option<usize>,

        /// Fragment size in bits
        #[arg(long)]
        size_bits: Option<usize>,

        /// Number of fragments
        #[arg(long)]
        count: Option<usize>,

        /// Stop after this many cuts
        #[arg(long)]
        max_splits: Option<usize>,

        /// Keep empty fragments
        #[arg(long)]
        allow_empty: bool,

        /// Write fragments into this directory
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// XOR a file with a repeating key
    #[command(alias = "x")]
    #[command(group(ArgGroup::new("keysource").required(true).args(["key", "key_file"])))]
    Xor {
        /// Input file
        file: PathBuf,

        /// Key as hex
        #[arg(long)]
        key: Option<String>,

        /// Read the key from a file
        #[arg(long)]
        key_file: Option<PathBuf>,

        /// Fail unless the key is as long as the input
        #[arg(long)]
        strict: bool,

        /// Output file
        output: PathBuf,
    },

    /// Rotate a file left (e.g. `3`, `3bytes`, `12bits`, `-4b`)
    #[command(alias = "r")]
    Rol {
        /// Input file
        file: PathBuf,

        /// Rotation amount
        #[arg(value_parser = parse_address, allow_hyphen_values = true)]
        amount: Address,

        /// Output file
        output: PathBuf,
    },
}

fn parse_address(s: &str) -> Result<Address, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn split_by(
    sep: Option<String>,
    sep_bits: Option<String>,
    size: Option<usize>,
    size_bits: Option<usize>,
    count: Option<usize>,
) -> Result<SplitBy, BlobError> {
    match (sep, sep_bits, size, size_bits, count) {
        (Some(sep), ..) => Ok(SplitBy::Sep(parse_hex(&sep)?)),
        (_, Some(bits), ..) => Ok(SplitBy::SepBits(bits)),
        (_, _, Some(size), ..) => Ok(SplitBy::Size(Address::Byte(size as i64))),
        (_, _, _, Some(bits), _) => Ok(SplitBy::Size(Address::Bit(bits as i64))),
        (.., Some(count)) => Ok(SplitBy::Count(count)),
        _ => Err(BlobError::InvalidArgument("no split criterion given".into())),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("bitblob {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if Cli::command().print_help().is_err() {
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let result = match command {
        Commands::Info {
            file,
            json,
            min_blocks,
            min_blocksize,
        } => {
            let options = InfoOptions {
                json,
                candidates: CandidateOptions {
                    min_blocks,
                    min_blocksize,
                },
            };
            show_info(&file, &options).map(|info| print!("{}", info))
        }

        Commands::Split {
            file,
            sep,
            sep_bits,
            size,
            size_bits,
            count,
            max_splits,
            allow_empty,
            out,
        } => split_by(sep, sep_bits, size, size_bits, count).and_then(|by| {
            let options = SplitOptions {
                by,
                max_splits,
                allow_empty,
                out_dir: out,
            };
            split_file(&file, &options).map(|report| print!("{}", report))
        }),

        Commands::Xor {
            file,
            key,
            key_file,
            strict,
            output,
        } => {
            let key = match (key, key_file) {
                (Some(hex), _) => parse_hex(&hex),
                (None, Some(path)) => std::fs::read(path).map_err(BlobError::from),
                (None, None) => Err(BlobError::InvalidArgument("no key given".into())),
            };
            key.and_then(|key| {
                let options = XorOptions {
                    key,
                    extension: if strict { Extension::Strict } else { Extension::Cyclic },
                };
                xor_file(&file, &output, &options)
            })
            .map(|written| println!("Wrote {} bytes to {}", written, output.display()))
        }

        Commands::Rol {
            file,
            amount,
            output,
        } => rol_file(&file, &output, amount)
            .map(|written| println!("Wrote {} bytes to {}", written, output.display())),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
