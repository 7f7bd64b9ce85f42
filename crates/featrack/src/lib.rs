#![deny(missing_docs)]
#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

/// Tracker configuration and host parameter descriptors.
pub mod config;

/// Error types for the tracker.
pub mod error;

/// Feature sets and their channel layout.
pub mod feature_set;

/// Host node cook cycle.
pub mod host;

/// Detection, tracking and mode dispatch.
pub mod tracker;

pub use crate::config::{TrackerParams, TrackingConfig, TrackingMode};
pub use crate::error::TrackerError;
pub use crate::feature_set::{ChannelOutput, FeatureSet};
pub use crate::tracker::{FeatureTracker, TrackInput};

pub use featrack_image as image;
pub use featrack_imgproc as imgproc;
