use crate::color::{Rgb, luminance};
use crate::error::CoreError;

/// Image source décodée. Immuable une fois construite.
///
/// Stocke les pixels en RGB row-major, 3 bytes par pixel.
///
/// # Example
/// ```
/// use rt_core::frame::ImageSample;
/// let img = ImageSample::filled(4, 2, (10, 20, 30));
/// assert_eq!(img.data().len(), 4 * 2 * 3);
/// assert_eq!(img.pixel(3, 1), (10, 20, 30));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageSample {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl ImageSample {
    /// Wrap a raw RGB buffer.
    ///
    /// # Errors
    /// Returns [`CoreError::BufferSize`] if `data.len() != width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(CoreError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Image unie de la couleur donnée.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&[color.0, color.1, color.2]);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Build an image from a per-pixel function `f(x, y)`.
    ///
    /// # Example
    /// ```
    /// use rt_core::frame::ImageSample;
    /// let img = ImageSample::from_fn(3, 1, |x, _| (x as u8 * 100, 0, 0));
    /// assert_eq!(img.pixel(2, 0), (200, 0, 0));
    /// ```
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgb) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                let (r, g, b) = f(x, y);
                data.extend_from_slice(&[r, g, b]);
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels RGB bruts, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Accès au pixel (x, y) → (r, g, b).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        if idx + 2 >= self.data.len() {
            return (0, 0, 0);
        }
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Luminance BT.601 du pixel (x, y).
    #[inline(always)]
    #[must_use]
    pub fn luminance(&self, x: u32, y: u32) -> u8 {
        let (r, g, b) = self.pixel(x, y);
        luminance(r, g, b)
    }
}

/// Single cell of the glyph grid.
///
/// `color` is `Some` iff color output was requested for the conversion.
///
/// # Example
/// ```
/// use rt_core::frame::GlyphCell;
/// let cell = GlyphCell::default();
/// assert_eq!(cell.ch, ' ');
/// assert!(cell.color.is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphCell {
    /// Caractère à afficher.
    pub ch: char,
    /// Couleur du glyphe (RGB), absente en mode sans couleur.
    pub color: Option<Rgb>,
}

impl Default for GlyphCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            color: None,
        }
    }
}

/// Grille de glyphes produite par la conversion.
///
/// Lecture seule une fois construite : chaque renderer la reçoit par `&`.
///
/// # Example
/// ```
/// use rt_core::frame::{GlyphGrid, GlyphCell};
/// let mut grid = GlyphGrid::new(80, 24);
/// grid.set(0, 0, GlyphCell { ch: '@', color: Some((255, 0, 0)) });
/// assert_eq!(grid.get(0, 0).ch, '@');
/// assert_eq!(grid.row(0).len(), 80);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    /// Flat array of cells, row-major.
    pub cells: Vec<GlyphCell>,
    /// Width in characters.
    pub cols: u32,
    /// Height in characters.
    pub rows: u32,
}

impl GlyphGrid {
    /// Crée une grille remplie d'espaces sans couleur.
    #[must_use]
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cells: vec![GlyphCell::default(); cols as usize * rows as usize],
            cols,
            rows,
        }
    }

    /// Set a cell at position (col, row).
    #[inline(always)]
    pub fn set(&mut self, col: u32, row: u32, cell: GlyphCell) {
        let idx = row as usize * self.cols as usize + col as usize;
        self.cells[idx] = cell;
    }

    /// Get a cell reference at position (col, row).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, col: u32, row: u32) -> &GlyphCell {
        &self.cells[row as usize * self.cols as usize + col as usize]
    }

    /// Cells of one row.
    #[must_use]
    pub fn row(&self, row: u32) -> &[GlyphCell] {
        let start = row as usize * self.cols as usize;
        &self.cells[start..start + self.cols as usize]
    }

    /// Mutable cells of one row.
    pub fn row_mut(&mut self, row: u32) -> &mut [GlyphCell] {
        let start = row as usize * self.cols as usize;
        let cols = self.cols as usize;
        &mut self.cells[start..start + cols]
    }

    /// Itère sur les lignes, de haut en bas.
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[GlyphCell]> {
        // chunks_exact panics on a zero chunk size; an empty grid has no rows anyway.
        self.cells.chunks_exact(self.cols.max(1) as usize)
    }

    /// Caractères d'une ligne, sans séparateur.
    #[must_use]
    pub fn row_text(&self, row: u32) -> String {
        self.row(row).iter().map(|c| c.ch).collect()
    }

    /// `true` si au moins une cellule porte une couleur.
    #[must_use]
    pub fn has_color(&self) -> bool {
        self.cells.iter().any(|c| c.color.is_some())
    }
}
