use featrack_image::{Image, ImageError};
use rayon::prelude::*;

use crate::filter::{box_blur, spatial_gradient};

/// Corner strength measure computed from the gradient structure tensor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum CornerResponse {
    /// Shi-Tomasi criterion: the smaller eigenvalue of the tensor.
    #[default]
    MinEigenValue,
    /// Harris criterion: `det - k * trace^2`.
    Harris {
        /// The harris free parameter, typically `0.04`.
        k: f32,
    },
}

/// Averaged products of the image derivatives over a square window.
struct StructureTensor {
    dxx: Image<f32, 1>,
    dxy: Image<f32, 1>,
    dyy: Image<f32, 1>,
}

impl StructureTensor {
    fn compute(src: &Image<f32, 1>, block_size: usize) -> Result<Self, ImageError> {
        let mut dx = Image::from_size_val(src.size(), 0.0)?;
        let mut dy = Image::from_size_val(src.size(), 0.0)?;
        spatial_gradient(src, &mut dx, &mut dy)?;

        let products = |f: fn(f32, f32) -> f32| -> Result<Image<f32, 1>, ImageError> {
            let data = dx
                .as_slice()
                .iter()
                .zip(dy.as_slice())
                .map(|(&gx, &gy)| f(gx, gy))
                .collect();
            let prod = Image::new(src.size(), data)?;
            let mut blurred = Image::from_size_val(src.size(), 0.0)?;
            box_blur(&prod, &mut blurred, (block_size, block_size))?;
            Ok(blurred)
        };

        Ok(Self {
            dxx: products(|gx, _| gx * gx)?,
            dxy: products(|gx, gy| gx * gy)?,
            dyy: products(|_, gy| gy * gy)?,
        })
    }
}

/// Compute a corner response map.
///
/// Args:
///     src: The source image with shape (H, W).
///     dst: The destination image with shape (H, W).
///     block_size: The side of the window the structure tensor is averaged over.
///     response: The corner strength measure.
pub fn corner_response(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    block_size: usize,
    response: CornerResponse,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let tensor = StructureTensor::compute(src, block_size)?;

    dst.as_slice_mut()
        .par_iter_mut()
        .zip(tensor.dxx.as_slice().par_iter())
        .zip(tensor.dxy.as_slice().par_iter())
        .zip(tensor.dyy.as_slice().par_iter())
        .for_each(|(((dst_pixel, &a), &b), &c)| {
            *dst_pixel = match response {
                CornerResponse::MinEigenValue => {
                    let half_trace = 0.5 * (a + c);
                    let half_diff = 0.5 * (a - c);
                    half_trace - (half_diff * half_diff + b * b).sqrt()
                }
                CornerResponse::Harris { k } => {
                    let det = a * c - b * b;
                    let trace = a + c;
                    det - k * trace * trace
                }
            };
        });

    Ok(())
}

/// Compute the Shi-Tomasi response, the smaller eigenvalue of the structure tensor.
pub fn min_eigen_response(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    block_size: usize,
) -> Result<(), ImageError> {
    corner_response(src, dst, block_size, CornerResponse::MinEigenValue)
}

/// Computes the harris response
pub fn harris_response(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    block_size: usize,
    k: f32,
) -> Result<(), ImageError> {
    corner_response(src, dst, block_size, CornerResponse::Harris { k })
}
