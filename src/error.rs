use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Separator not found in blob data")]
    SeparatorNotFound,

    #[error("Size {size} does not evenly divide blob size {total}")]
    SizeNotDivisible { size: usize, total: usize },

    #[error("Invalid address unit: {0}")]
    InvalidAddressUnit(String),

    #[error("Must set a block size before calling {0}")]
    MissingBlockSize(&'static str),

    #[error("Unavailable dependency: {0}")]
    UnavailableDependency(String),

    #[error("Blob of {0} bits is not a whole number of bytes")]
    PartialByte(usize),

    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Operand lengths differ: {left} vs {right} bits")]
    LengthMismatch { left: usize, right: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, BlobError>;
