//! Bitblob - byte- and bit-addressable binary blobs
//!
//! A [`Blob`] holds an arbitrary binary buffer that can be addressed, sliced,
//! split and combined at byte or bit granularity. It is meant for reverse
//! engineering and cryptanalysis work, where raw data gets reshaped and
//! recombined over and over while looking for structure: block boundaries,
//! periodicity, key material.
//!
//! ## Building blocks
//!
//! - **Addressing**: [`Address`] tags every position as a byte or bit count;
//!   [`Locator`] adds separator patterns for `offset`/`truncate`.
//! - **Slicing**: [`Blob::get`] and [`Blob::slice`] with sequence-slicing
//!   semantics (negative indices, open ends, steps).
//! - **Splitting**: [`Split`] by separator, fixed size or block count.
//! - **Block sizes**: [`Blob::blocksize_candidates`] lists plausible block
//!   sizes from the factorization of the blob's length.
//! - **Algebra**: XOR/AND/OR with cyclic key extension, NOT, rotation and
//!   [`Blob::rotating_xors`].
//! - **Statistics**: entropy and chi-square over block frequencies through a
//!   pluggable [`StatisticsProvider`].
//! - **Unpacking**: struct-style formats via [`Blob::unpack`].
//!
//! ## Example
//!
//! ```
//! use bitblob::{Address, Blob, Split};
//!
//! let blob = Blob::from("AAAABBBBCCCC");
//!
//! let parts = blob.split(&Split::sep("B")).unwrap();
//! assert_eq!(parts, vec![Blob::from("AAAA"), Blob::from("CCCC")]);
//!
//! assert_eq!(blob.xor(&Blob::from(" ")), "aaaabbbbcccc");
//! assert_eq!(blob.rol(Address::Byte(4)), "BBBBCCCCAAAA");
//! assert_eq!(blob.get(Address::Bit(1)).unwrap().bits(), "1");
//! ```

pub mod address;
pub mod algebra;
pub mod bits;
pub mod blob;
pub mod blocksize;
pub mod cli;
pub mod error;
pub mod mux;
pub mod slice;
pub mod split;
pub mod stats;
pub mod unpack;

pub use address::{Address, Locator};
pub use algebra::{BitOp, Extension, RotatingXors};
pub use blob::Blob;
pub use blocksize::CandidateOptions;
pub use error::{BlobError, Result};
pub use mux::Multiplex;
pub use slice::Slice;
pub use split::{Split, SplitBy};
pub use stats::{default_provider, ChiSquare, StatisticsProvider, Unavailable};
#[cfg(feature = "stats")]
pub use stats::FrequencyStatistics;
pub use unpack::{Format, Value};
