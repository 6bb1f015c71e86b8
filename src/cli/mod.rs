pub mod info;
pub mod rol;
pub mod split;
pub mod xor;

pub use info::*;
pub use rol::*;
pub use split::*;
pub use xor::*;

use crate::blob::Blob;
use crate::error::{BlobError, Result};
use std::path::Path;

/// Load a file as a blob, remembering its name.
pub fn load_blob(path: &Path) -> Result<Blob> {
    let name = path
        .file_name()
        .ok_or_else(|| BlobError::InvalidArgument(format!("not a file: {}", path.display())))?;
    Blob::from_file(path.parent(), &name.to_string_lossy())
}

/// Decode a hex argument such as `--sep 0d0a`.
pub fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| BlobError::InvalidArgument(format!("invalid hex {:?}: {}", s, e)))?;
    if bytes.is_empty() {
        return Err(BlobError::InvalidArgument("empty hex value".into()));
    }
    Ok(bytes)
}

pub(crate) fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0d0a").unwrap(), vec![0x0d, 0x0a]);
        assert_eq!(parse_hex("0xFF").unwrap(), vec![0xff]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("").is_err());
    }

    #[test]
    fn test_load_blob() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"ABCD").unwrap();

        let blob = load_blob(&path).unwrap();
        assert_eq!(blob, "ABCD");
        assert_eq!(blob.filename(), Some("data.bin"));
        assert!(load_blob(&dir.path().join("missing.bin")).is_err());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1048576), "1.0 MB");
    }
}
