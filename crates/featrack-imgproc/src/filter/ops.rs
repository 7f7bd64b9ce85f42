use featrack_image::{Image, ImageError};

use super::{kernels, separable_filter};

/// Blur an image using a box blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y).
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn box_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_size: (usize, usize),
) -> Result<(), ImageError> {
    let kernel_x = kernels::box_blur_kernel_1d(kernel_size.0);
    let kernel_y = kernels::box_blur_kernel_1d(kernel_size.1);
    separable_filter(src, dst, &kernel_x, &kernel_y)?;
    Ok(())
}

/// Compute the first order spatial derivatives of an image with the 3x3 sobel operator.
///
/// The operator is normalized so that the derivatives are expressed in intensity
/// units per pixel.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dx` - The destination image for the horizontal derivative.
/// * `dy` - The destination image for the vertical derivative.
///
/// PRECONDITION: `src`, `dx` and `dy` must have the same shape.
pub fn spatial_gradient<const C: usize>(
    src: &Image<f32, C>,
    dx: &mut Image<f32, C>,
    dy: &mut Image<f32, C>,
) -> Result<(), ImageError> {
    let (deriv, smooth) = kernels::sobel_kernel_1d();
    separable_filter(src, dx, &deriv, &smooth)?;
    separable_filter(src, dy, &smooth, &deriv)?;
    Ok(())
}
