use featrack_image::{Image, ImageError};
use rayon::prelude::*;

/// Map an out-of-range index into `[0, len)` mirroring around the border
/// without repeating the edge pixel, i.e. `gfedcb|abcdefgh|gfedcba`.
pub(crate) fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }

    let last = len as isize - 1;
    let mut i = index;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// Apply a separable filter to an image.
///
/// The horizontal kernel is applied first, then the vertical one. Both are
/// applied as correlations centered on the middle tap, and the border is
/// handled by reflection (reflect-101).
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn separable_filter<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (rows, cols) = (src.rows(), src.cols());
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let half_x = (kernel_x.len() / 2) as isize;
    let half_y = (kernel_y.len() / 2) as isize;
    let src_data = src.as_slice();

    // horizontal pass
    let mut temp = vec![0.0f32; src_data.len()];
    temp.par_chunks_exact_mut(cols * C)
        .zip(src_data.par_chunks_exact(cols * C))
        .for_each(|(temp_row, src_row)| {
            for c in 0..cols {
                for k in 0..C {
                    let mut acc = 0.0f32;
                    for (i, kx) in kernel_x.iter().enumerate() {
                        let x = reflect_101(c as isize + i as isize - half_x, cols);
                        acc += src_row[x * C + k] * kx;
                    }
                    temp_row[c * C + k] = acc;
                }
            }
        });

    // vertical pass
    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .enumerate()
        .for_each(|(r, dst_row)| {
            dst_row.iter_mut().for_each(|v| *v = 0.0);
            for (i, ky) in kernel_y.iter().enumerate() {
                let y = reflect_101(r as isize + i as isize - half_y, rows);
                let temp_row = &temp[y * cols * C..(y + 1) * cols * C];
                dst_row
                    .iter_mut()
                    .zip(temp_row.iter())
                    .for_each(|(d, t)| *d += t * ky);
            }
        });

    Ok(())
}
