/// Create a box blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn box_blur_kernel_1d(kernel_size: usize) -> Vec<f32> {
    vec![1.0 / kernel_size as f32; kernel_size]
}

/// Create the 3-tap sobel kernels.
///
/// # Returns
///
/// The central difference kernel `[-1, 0, 1] / 2` and the smoothing kernel
/// `[1, 2, 1] / 4`. Their outer product is the 3x3 sobel operator divided by 8,
/// so a unit intensity ramp yields a unit gradient.
pub fn sobel_kernel_1d() -> (Vec<f32>, Vec<f32>) {
    (vec![-0.5, 0.0, 0.5], vec![0.25, 0.5, 0.25])
}

/// Create the 5-tap binomial kernel used to build gaussian pyramids.
///
/// The 2D kernel is the outer product of `[1, 4, 6, 4, 1] / 16` with itself.
pub fn pyramid_kernel_1d() -> Vec<f32> {
    [1.0, 4.0, 6.0, 4.0, 1.0].iter().map(|&x| x / 16.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sobel_kernel_1d() {
        let (deriv, smooth) = sobel_kernel_1d();
        assert_eq!(deriv, vec![-0.5, 0.0, 0.5]);
        assert_eq!(smooth.iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_box_blur_kernel_1d() {
        let kernel = box_blur_kernel_1d(4);
        assert_eq!(kernel, vec![0.25; 4]);
    }

    #[test]
    fn test_pyramid_kernel_1d() {
        let kernel = pyramid_kernel_1d();
        assert_eq!(kernel.len(), 5);
        assert_eq!(kernel.iter().sum::<f32>(), 1.0);
    }
}
