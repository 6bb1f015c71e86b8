use crate::address::Address;
use crate::blob::Blob;
use crate::cli::load_blob;
use crate::error::Result;
use crate::split::{Split, SplitBy};
use std::path::{Path, PathBuf};

/// Options for the split command
#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub by: SplitBy,
    pub max_splits: Option<usize>,
    pub allow_empty: bool,
    /// Write fragments into this directory instead of listing them.
    pub out_dir: Option<PathBuf>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            by: SplitBy::Size(Address::Byte(16)),
            max_splits: None,
            allow_empty: false,
            out_dir: None,
        }
    }
}

impl SplitOptions {
    fn to_split(&self) -> Split {
        Split {
            by: self.by.clone(),
            max_splits: self.max_splits,
            allow_empty: self.allow_empty,
        }
    }
}

/// Split a file and either list the fragments or write them to `out_dir`.
///
/// Byte-aligned fragments are written as `<name>.NNNN.bin`; others as a bit
/// string in `<name>.NNNN.bits`.
pub fn split_file(path: &Path, options: &SplitOptions) -> Result<String> {
    let blob = load_blob(path)?;
    let fragments = blob.split(&options.to_split())?;

    let mut output = String::new();
    output.push_str(&format!(
        "{}: {} fragments\n",
        path.display(),
        fragments.len()
    ));

    match &options.out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let stem = blob.filename().unwrap_or("blob");
            for (i, fragment) in fragments.iter().enumerate() {
                let target = write_fragment(dir, stem, i, fragment)?;
                output.push_str(&format!(
                    "  {:4}  {:>8} bits  {}\n",
                    i,
                    fragment.size_bits(),
                    target.display()
                ));
            }
        }
        None => {
            for (i, fragment) in fragments.iter().enumerate() {
                output.push_str(&format!(
                    "  {:4}  {:>8} bits  {}\n",
                    i,
                    fragment.size_bits(),
                    fragment
                ));
            }
        }
    }

    Ok(output)
}

fn write_fragment(dir: &Path, stem: &str, index: usize, fragment: &Blob) -> Result<PathBuf> {
    let target = if fragment.byte_aligned() {
        let target = dir.join(format!("{}.{:04}.bin", stem, index));
        std::fs::write(&target, fragment.bytes()?)?;
        target
    } else {
        let target = dir.join(format!("{}.{:04}.bits", stem, index));
        std::fs::write(&target, fragment.bits())?;
        target
    };
    Ok(target)
}
