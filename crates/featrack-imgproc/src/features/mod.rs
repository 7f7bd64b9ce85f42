//! Feature detection and keypoint extraction.
//!
//! This module provides the corner strength maps and the "good features to
//! track" detector built on top of them:
//!
//! - **Shi-Tomasi**: minimum eigenvalue of the gradient structure tensor.
//! - **Harris**: `det(M) - k * trace(M)^2` of the same tensor.

mod responses;
pub use responses::*;

mod good_features;
pub use good_features::*;
