#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// feature detection module.
pub mod features;

/// image filtering module.
pub mod filter;

/// utilities for interpolation.
pub mod interpolation;

/// sparse optical flow module.
pub mod optical_flow;

/// Pyramid operations
pub mod pyramid;
