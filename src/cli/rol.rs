use crate::address::Address;
use crate::cli::load_blob;
use crate::error::Result;
use std::path::Path;

/// Rotate a file left by `amount` and write the result.
/// Returns the number of bytes written
pub fn rol_file(input_path: &Path, output_path: &Path, amount: Address) -> Result<usize> {
    let rotated = load_blob(input_path)?.rol(amount);
    let bytes = rotated.bytes()?;
    std::fs::write(output_path, bytes)?;
    Ok(bytes.len())
}
