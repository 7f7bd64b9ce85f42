#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
pub mod error;

/// PNG image decoding into raw frames and gray image encoding.
pub mod png;

pub use crate::error::IoError;
