use crate::algebra::{BitOp, Extension};
use crate::blob::Blob;
use crate::cli::load_blob;
use crate::error::{BlobError, Result};
use std::path::Path;

/// Options for the xor command
#[derive(Debug, Clone, Default)]
pub struct XorOptions {
    pub key: Vec<u8>,
    pub extension: Extension,
}

/// XOR a file with a key and write the result.
/// Returns the number of bytes written
pub fn xor_file(input_path: &Path, output_path: &Path, options: &XorOptions) -> Result<usize> {
    if options.key.is_empty() {
        return Err(BlobError::InvalidArgument("empty key".into()));
    }

    let data = load_blob(input_path)?;
    let key = Blob::from_bytes(options.key.as_slice());
    let result = data.combine(&key, BitOp::Xor, options.extension)?;

    let bytes = result.bytes()?;
    std::fs::write(output_path, bytes)?;
    Ok(bytes.len())
}
