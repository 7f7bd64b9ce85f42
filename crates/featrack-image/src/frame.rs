//! Raw frames as handed over by a host and their conversion to gray8.
//!
//! A host exposes a frame as an interleaved `height x width x channels` buffer
//! whose sample type depends on the source (8/16/32-bit integers or floats in
//! `[0, 1]`). Detection and tracking only ever see the normalized
//! single-channel `u8` image returned by [`normalize_frame`].

use crate::{error::ImageError, image::Image, ImageSize};

/// Sample buffer of a raw frame, tagged by its element type.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameData {
    /// 8-bit unsigned samples.
    U8(Vec<u8>),
    /// 16-bit unsigned samples.
    U16(Vec<u16>),
    /// 32-bit unsigned samples.
    U32(Vec<u32>),
    /// 32-bit signed samples.
    I32(Vec<i32>),
    /// single precision samples, nominally in `[0, 1]`.
    F32(Vec<f32>),
    /// double precision samples, nominally in `[0, 1]`.
    F64(Vec<f64>),
}

impl FrameData {
    /// Number of samples in the buffer.
    pub fn len(&self) -> usize {
        match self {
            FrameData::U8(v) => v.len(),
            FrameData::U16(v) => v.len(),
            FrameData::U32(v) => v.len(),
            FrameData::I32(v) => v.len(),
            FrameData::F32(v) => v.len(),
            FrameData::F64(v) => v.len(),
        }
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A frame with an arbitrary number of interleaved channels.
#[derive(Clone, Debug, PartialEq)]
pub struct RawFrame {
    size: ImageSize,
    channels: usize,
    data: FrameData,
}

impl RawFrame {
    /// Create a raw frame, checking that the buffer matches the shape.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the frame in pixels.
    /// * `channels` - The number of interleaved channels.
    /// * `data` - The sample buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is empty or the buffer length does not match it.
    pub fn new(size: ImageSize, channels: usize, data: FrameData) -> Result<Self, ImageError> {
        if size.width == 0 || size.height == 0 || channels == 0 {
            return Err(ImageError::InvalidFrameShape {
                height: size.height,
                width: size.width,
                channels,
            });
        }

        let expected = size.width * size.height * channels;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }

        Ok(Self {
            size,
            channels,
            data,
        })
    }

    /// Wrap an already single-channel gray8 image.
    pub fn from_gray8(image: &Image<u8, 1>) -> Self {
        Self {
            size: image.size(),
            channels: 1,
            data: FrameData::U8(image.as_slice().to_vec()),
        }
    }

    /// The size of the frame in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The number of interleaved channels.
    pub fn num_channels(&self) -> usize {
        self.channels
    }

    /// The sample buffer.
    pub fn data(&self) -> &FrameData {
        &self.data
    }
}

/// Normalize a raw frame to a single-channel gray8 image.
///
/// Only the first channel is kept. Floating point samples are scaled by 255 and
/// truncated toward zero, saturating outside `[0, 255]`. Integer samples of
/// other widths are cast without rescaling, keeping the low 8 bits.
///
/// # Examples
///
/// ```
/// use featrack_image::{normalize_frame, FrameData, RawFrame};
///
/// let frame = RawFrame::new([2, 1].into(), 2, FrameData::F32(vec![1.0, 0.3, 0.5, 0.7])).unwrap();
/// let gray = normalize_frame(&frame).unwrap();
/// assert_eq!(gray.as_slice(), &[255, 127]);
/// ```
pub fn normalize_frame(frame: &RawFrame) -> Result<Image<u8, 1>, ImageError> {
    let step = frame.channels;
    let data = match &frame.data {
        FrameData::U8(v) => first_channel(v, step, |x| x),
        FrameData::U16(v) => first_channel(v, step, |x| x as u8),
        FrameData::U32(v) => first_channel(v, step, |x| x as u8),
        FrameData::I32(v) => first_channel(v, step, |x| x as u8),
        FrameData::F32(v) => first_channel(v, step, |x| (x * 255.0) as u8),
        FrameData::F64(v) => first_channel(v, step, |x| (x * 255.0) as u8),
    };

    Image::new(frame.size, data)
}

fn first_channel<T: Copy>(data: &[T], step: usize, f: impl Fn(T) -> u8) -> Vec<u8> {
    data.iter().step_by(step).map(|&x| f(x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_u8_is_noop() -> Result<(), ImageError> {
        let data = (0..=255u8).collect::<Vec<_>>();
        let frame = RawFrame::new([16, 16].into(), 1, FrameData::U8(data.clone()))?;
        let gray = normalize_frame(&frame)?;
        assert_eq!(gray.as_slice(), data.as_slice());
        Ok(())
    }

    #[test]
    fn normalize_keeps_first_channel() -> Result<(), ImageError> {
        let frame = RawFrame::new(
            [2, 1].into(),
            4,
            FrameData::U8(vec![10, 20, 30, 255, 40, 50, 60, 255]),
        )?;
        let gray = normalize_frame(&frame)?;
        assert_eq!(gray.as_slice(), &[10, 40]);
        Ok(())
    }

    #[test]
    fn normalize_float_truncates() -> Result<(), ImageError> {
        let frame = RawFrame::new(
            [5, 1].into(),
            1,
            FrameData::F64(vec![0.0, 0.5, 0.999, 1.0, 1.5]),
        )?;
        let gray = normalize_frame(&frame)?;
        assert_eq!(gray.as_slice(), &[0, 127, 254, 255, 255]);

        let frame = RawFrame::new([1, 1].into(), 1, FrameData::F32(vec![-0.2]))?;
        assert_eq!(normalize_frame(&frame)?.as_slice(), &[0]);
        Ok(())
    }

    #[test]
    fn normalize_wide_integers_cast_without_rescale() -> Result<(), ImageError> {
        let frame = RawFrame::new([3, 1].into(), 1, FrameData::U16(vec![12, 255, 256 + 7]))?;
        assert_eq!(normalize_frame(&frame)?.as_slice(), &[12, 255, 7]);

        let frame = RawFrame::new([2, 1].into(), 1, FrameData::I32(vec![200, -1]))?;
        assert_eq!(normalize_frame(&frame)?.as_slice(), &[200, 255]);
        Ok(())
    }

    #[test]
    fn float_and_u8_agree_within_one_level() -> Result<(), ImageError> {
        let levels = (0..=255u8).collect::<Vec<_>>();
        let floats = levels.iter().map(|&v| v as f32 / 255.0).collect::<Vec<_>>();

        let from_u8 = normalize_frame(&RawFrame::new([16, 16].into(), 1, FrameData::U8(levels))?)?;
        let from_f32 = normalize_frame(&RawFrame::new([16, 16].into(), 1, FrameData::F32(floats))?)?;

        for (a, b) in from_u8.as_slice().iter().zip(from_f32.as_slice()) {
            assert!(a.abs_diff(*b) <= 1, "{a} vs {b}");
        }
        Ok(())
    }

    #[test]
    fn raw_frame_rejects_bad_shapes() {
        assert_eq!(
            RawFrame::new([0, 4].into(), 1, FrameData::U8(vec![])),
            Err(ImageError::InvalidFrameShape {
                height: 4,
                width: 0,
                channels: 1
            })
        );
        assert_eq!(
            RawFrame::new([2, 2].into(), 3, FrameData::U8(vec![0; 4])),
            Err(ImageError::InvalidChannelShape(4, 12))
        );
    }
}
