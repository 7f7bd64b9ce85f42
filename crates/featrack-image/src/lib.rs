#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image representation for computer vision purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// raw host frames and their normalization to gray8.
pub mod frame;

pub use crate::error::ImageError;
pub use crate::frame::{normalize_frame, FrameData, RawFrame};
pub use crate::image::{Image, ImageSize};
