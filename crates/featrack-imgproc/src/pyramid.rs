use crate::filter::{kernels, separable_filter};
use featrack_image::{Image, ImageError, ImageSize};

/// Size of the image produced by [`pyrdown`] for a given source size.
pub fn pyrdown_size(size: ImageSize) -> ImageSize {
    ImageSize {
        width: size.width.div_ceil(2),
        height: size.height.div_ceil(2),
    }
}

/// Blur an image and then downsample it by a factor of two.
///
/// The image is smoothed with the 5x5 binomial kernel and every other row and
/// column is kept, so `dst` holds `ceil(W / 2) x ceil(H / 2)` pixels.
///
/// # Arguments
///
/// * `src` - The source image to be downsampled.
/// * `dst` - The destination image to store the result.
///
/// # Example
///
/// ```
/// use featrack_image::{Image, ImageSize};
/// use featrack_imgproc::pyramid::pyrdown;
///
/// let image = Image::<f32, 1>::from_size_val([5, 4].into(), 1.0).unwrap();
/// let mut downsampled = Image::<f32, 1>::from_size_val([3, 2].into(), 0.0).unwrap();
///
/// pyrdown(&image, &mut downsampled).unwrap();
/// assert!(downsampled.as_slice().iter().all(|&v| (v - 1.0).abs() < 1e-6));
/// ```
pub fn pyrdown<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
) -> Result<(), ImageError> {
    let expected = pyrdown_size(src.size());
    if dst.size() != expected {
        return Err(ImageError::InvalidImageSize(
            expected.width,
            expected.height,
            dst.width(),
            dst.height(),
        ));
    }

    let kernel = kernels::pyramid_kernel_1d();
    let mut blurred = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    separable_filter(src, &mut blurred, &kernel, &kernel)?;

    let (src_cols, dst_cols) = (src.cols(), dst.cols());
    let blurred = blurred.as_slice();
    dst.as_slice_mut()
        .chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(r, dst_row)| {
            let src_row = &blurred[2 * r * src_cols * C..(2 * r + 1) * src_cols * C];
            dst_row
                .chunks_exact_mut(C)
                .enumerate()
                .for_each(|(c, dst_pixel)| {
                    dst_pixel.copy_from_slice(&src_row[2 * c * C..(2 * c + 1) * C]);
                });
        });

    Ok(())
}

/// Build a gaussian pyramid.
///
/// Level 0 is a copy of `src`. Downsampling stops after `max_level` levels or as
/// soon as the next level would be smaller than `min_size` pixels in either
/// dimension, whichever comes first.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `max_level` - The maximum level index (0-based) of the pyramid.
/// * `min_size` - The minimum width and height of any level above the base.
///
/// # Returns
///
/// The pyramid levels from finest to coarsest.
pub fn build_pyramid<const C: usize>(
    src: &Image<f32, C>,
    max_level: usize,
    min_size: usize,
) -> Result<Vec<Image<f32, C>>, ImageError> {
    let mut levels = Vec::with_capacity(max_level + 1);
    levels.push(src.clone());

    for _ in 0..max_level {
        let Some(prev) = levels.last() else {
            break;
        };
        let size = pyrdown_size(prev.size());
        if size.width < min_size || size.height < min_size || size == prev.size() {
            break;
        }
        let mut next = Image::<f32, C>::from_size_val(size, 0.0)?;
        pyrdown(prev, &mut next)?;
        levels.push(next);
    }

    Ok(levels)
}
