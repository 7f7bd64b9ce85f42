use featrack_image::Image;

/// Kernel for bilinear interpolation
///
/// Coordinates outside the image are clamped to the nearest border pixel.
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated pixel value.
///
/// PRECONDITION: the image must not be empty.
pub fn bilinear_interpolation(image: &Image<f32, 1>, u: f32, v: f32) -> f32 {
    let (rows, cols) = (image.rows(), image.cols());

    let u = u.clamp(0.0, (cols - 1) as f32);
    let v = v.clamp(0.0, (rows - 1) as f32);

    let iu0 = u.floor() as usize;
    let iv0 = v.floor() as usize;

    let frac_u = u - iu0 as f32;
    let frac_v = v - iv0 as f32;

    let iu1 = (iu0 + 1).min(cols - 1);
    let iv1 = (iv0 + 1).min(rows - 1);

    let data = image.as_slice();
    let p00 = data[iv0 * cols + iu0];
    let p01 = data[iv0 * cols + iu1];
    let p10 = data[iv1 * cols + iu0];
    let p11 = data[iv1 * cols + iu1];

    let w00 = (1.0 - frac_u) * (1.0 - frac_v);
    let w01 = frac_u * (1.0 - frac_v);
    let w10 = (1.0 - frac_u) * frac_v;
    let w11 = frac_u * frac_v;

    p00 * w00 + p01 * w01 + p10 * w10 + p11 * w11
}
