use crate::error::ImageError;

/// Width and height of an image, in pixels.
///
/// # Examples
///
/// ```
/// use featrack_image::ImageSize;
///
/// let size: ImageSize = [640, 480].into();
/// assert_eq!(size.width, 640);
/// assert_eq!(size.height, 480);
/// assert_eq!(size.to_string(), "640x480");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<[usize; 2]> for ImageSize {
    /// Build a size from `[width, height]`.
    fn from([width, height]: [usize; 2]) -> Self {
        ImageSize { width, height }
    }
}

/// Owned image buffer with a compile time channel count.
///
/// Pixels are stored row by row with interleaved channels, so the sample of
/// channel `c` at row `y` and column `x` lives at `(y * width + x) * C + c`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const C: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const C: usize> Image<T, C> {
    /// Wrap a pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidChannelShape`] if `data` does not hold
    /// exactly `width * height * C` samples.
    ///
    /// # Examples
    ///
    /// ```
    /// use featrack_image::Image;
    ///
    /// let gray = Image::<u8, 1>::new([4, 2].into(), vec![0; 8]).unwrap();
    /// assert_eq!(gray.cols(), 4);
    /// assert_eq!(gray.rows(), 2);
    ///
    /// assert!(Image::<u8, 3>::new([4, 2].into(), vec![0; 8]).is_err());
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        let expected = size.width * size.height * C;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }
        Ok(Self { size, data })
    }

    /// Create an image with every sample set to `val`.
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Image::new(size, vec![val; size.width * size.height * C])
    }

    /// The image size.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Same as [`Image::cols`].
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Same as [`Image::rows`].
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// The samples in storage order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The samples in storage order, mutably.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// The sample at `[row, col, channel]`, or `None` outside the image.
    pub fn get(&self, [y, x, c]: [usize; 3]) -> Option<&T> {
        if y >= self.rows() || x >= self.cols() || c >= C {
            return None;
        }
        self.data.get((y * self.cols() + x) * C + c)
    }

    /// Convert every sample to `U` and multiply it by `scale`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::CastError`] if a sample has no `U` representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use featrack_image::Image;
    ///
    /// let gray = Image::<u8, 1>::new([3, 1].into(), vec![0, 51, 255]).unwrap();
    /// let unit = gray.cast_and_scale::<f32>(1.0 / 255.0).unwrap();
    /// assert_eq!(unit.as_slice()[0], 0.0);
    /// assert_eq!(unit.as_slice()[2], 1.0);
    /// ```
    pub fn cast_and_scale<U>(&self, scale: U) -> Result<Image<U, C>, ImageError>
    where
        U: num_traits::NumCast + std::ops::Mul<Output = U> + Copy,
        T: num_traits::NumCast + Copy,
    {
        let data = self
            .data
            .iter()
            .map(|&v| U::from(v).map(|u| u * scale).ok_or(ImageError::CastError))
            .collect::<Result<Vec<U>, _>>()?;
        Image::new(self.size, data)
    }
}
