use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use rt_core::error::CoreError;
use rt_core::frame::ImageSample;

/// Correction d'aspect : une cellule monospace est environ deux fois plus haute que large.
pub const CELL_ASPECT: f64 = 0.5;

/// Méthode d'échantillonnage d'une cellule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sampling {
    /// Moyenne de la zone source couverte par la cellule (filtre boîte, une passe).
    BlockAverage,
    /// Pixel source le plus proche, sans interpolation : bords francs.
    Nearest,
}

/// Dimensions `(cols, rows)` de la grille pour une source `src_width × src_height`.
///
/// `rows = round(target_width × src_height / src_width × 0.5)`, au minimum 1.
///
/// # Errors
/// [`CoreError::InvalidDimensions`] si une des dimensions est nulle.
///
/// # Example
/// ```
/// use rt_source::resize::grid_dimensions;
/// assert_eq!(grid_dimensions(100, 50, 80).unwrap(), (80, 20));
/// assert_eq!(grid_dimensions(640, 480, 100).unwrap(), (100, 38));
/// assert!(grid_dimensions(0, 50, 80).is_err());
/// ```
pub fn grid_dimensions(
    src_width: u32,
    src_height: u32,
    target_width: u32,
) -> Result<(u32, u32), CoreError> {
    if target_width == 0 {
        return Err(CoreError::InvalidDimensions {
            width: target_width,
            height: src_height,
        });
    }
    if src_width == 0 || src_height == 0 {
        return Err(CoreError::InvalidDimensions {
            width: src_width,
            height: src_height,
        });
    }
    let aspect = f64::from(src_height) / f64::from(src_width);
    let rows = (f64::from(target_width) * aspect * CELL_ASPECT).round();
    let rows = (rows as u32).max(1);
    Ok((target_width, rows))
}

/// Resizer réutilisable wrappant fast_image_resize.
///
/// # Example
/// ```
/// use rt_source::resize::{Resampler, Sampling};
/// use rt_core::frame::ImageSample;
/// let mut r = Resampler::new();
/// let src = ImageSample::filled(100, 100, (10, 20, 30));
/// let dst = r.resample(&src, 50, 25, Sampling::BlockAverage).unwrap();
/// assert_eq!((dst.width(), dst.height()), (50, 25));
/// ```
pub struct Resampler {
    inner: FirResizer,
}

impl Resampler {
    /// Create a new resampler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
        }
    }

    /// Resample `src` to exactly `cols × rows` pixels, one per grid cell.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] for an empty source or target,
    /// [`CoreError::Resample`] if the backend rejects the buffers.
    pub fn resample(
        &mut self,
        src: &ImageSample,
        cols: u32,
        rows: u32,
        sampling: Sampling,
    ) -> Result<ImageSample, CoreError> {
        if src.width() == 0 || src.height() == 0 {
            return Err(CoreError::InvalidDimensions {
                width: src.width(),
                height: src.height(),
            });
        }
        if cols == 0 || rows == 0 {
            return Err(CoreError::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        if src.width() == cols && src.height() == rows {
            return Ok(src.clone());
        }

        let src_image = ImageRef::new(src.width(), src.height(), src.data(), PixelType::U8x3)
            .map_err(|e| CoreError::Resample(format!("source {e}")))?;
        let mut dst_image = Image::new(cols, rows, PixelType::U8x3);

        let alg = match sampling {
            Sampling::BlockAverage => ResizeAlg::Convolution(FilterType::Box),
            Sampling::Nearest => ResizeAlg::Nearest,
        };
        let options = ResizeOptions::new().resize_alg(alg);

        self.inner
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| CoreError::Resample(e.to_string()))?;

        ImageSample::from_raw(cols, rows, dst_image.into_vec())
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new()
    }
}
