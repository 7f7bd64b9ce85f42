/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must agree in size do not.
    #[error("Image size mismatch: ({0}, {1}) vs ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the frame shape cannot hold an image.
    #[error("Invalid frame shape: {height}x{width}x{channels}")]
    InvalidFrameShape {
        /// number of rows of the frame
        height: usize,
        /// number of columns of the frame
        width: usize,
        /// number of interleaved channels of the frame
        channels: usize,
    },

    /// Error when a pixel value cannot be represented in the target type.
    #[error("Failed to cast image data")]
    CastError,
}
