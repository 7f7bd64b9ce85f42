use featrack_image::{ImageError, ImageSize};

/// An error type for the tracker.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TrackerError {
    /// Error coming from the image layer, e.g. a malformed frame buffer.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The previous and current frames do not have the same size.
    #[error("Previous frame is {previous} but the current frame is {current}")]
    FrameSizeMismatch {
        /// size of the previous frame
        previous: ImageSize,
        /// size of the current frame
        current: ImageSize,
    },

    /// The x and y channels do not hold the same number of samples.
    #[error("Channel length mismatch: tx has {tx} samples, ty has {ty}")]
    ChannelLengthMismatch {
        /// number of samples in tx
        tx: usize,
        /// number of samples in ty
        ty: usize,
    },
}
