//! Mode 16-bit : quantification sur la palette fixe, puis scanlines CRT.

use rt_core::charset::DensityMapper;
use rt_core::color::{dim_permille, luminance};
use rt_core::frame::{GlyphCell, GlyphGrid, ImageSample};
use rt_core::palette;
use rt_core::traits::ProgressSink;

/// Atténuation des lignes paires, en pour-mille (×0.9).
pub const SCANLINE_PERMILLE: u32 = 900;

/// Quantifie chaque pixel sur [`palette::PALETTE_16`] et choisit le glyphe
/// d'après la luminance de la couleur *quantifiée*.
///
/// `progress` advances once per completed row.
///
/// # Example
/// ```
/// use rt_core::charset::{DensityMapper, RAMP_RETRO16};
/// use rt_core::frame::ImageSample;
/// use rt_core::traits::NoProgress;
/// use rt_ascii::retro::quantize_grid;
///
/// let sample = ImageSample::filled(2, 2, (250, 5, 250));
/// let mapper = DensityMapper::new(RAMP_RETRO16).unwrap();
/// let grid = quantize_grid(&sample, &mapper, true, &NoProgress);
/// assert_eq!(grid.get(0, 0).color, Some((241, 91, 254)));
/// ```
pub fn quantize_grid(
    sample: &ImageSample,
    mapper: &DensityMapper,
    color_enabled: bool,
    progress: &dyn ProgressSink,
) -> GlyphGrid {
    let mut grid = GlyphGrid::new(sample.width(), sample.height());
    for cy in 0..grid.rows {
        for (cx, cell) in (0u32..).zip(grid.row_mut(cy).iter_mut()) {
            let (_, q) = palette::nearest(sample.pixel(cx, cy));
            *cell = GlyphCell {
                ch: mapper.map(luminance(q.0, q.1, q.2)),
                color: color_enabled.then_some(q),
            };
        }
        progress.advance(1);
    }
    grid
}

/// Assombrit la couleur des cellules des lignes paires (index 0, 2, 4, ...).
///
/// Each channel becomes `round(v × 0.9)`; odd rows and characters are left
/// untouched. Cells without color are skipped. Apply exactly once per grid.
///
/// # Example
/// ```
/// use rt_core::frame::{GlyphCell, GlyphGrid};
/// use rt_ascii::retro::apply_scanlines;
///
/// let mut grid = GlyphGrid::new(1, 2);
/// grid.set(0, 0, GlyphCell { ch: '█', color: Some((255, 255, 255)) });
/// grid.set(0, 1, GlyphCell { ch: '█', color: Some((255, 255, 255)) });
/// apply_scanlines(&mut grid);
/// assert_eq!(grid.get(0, 0).color, Some((230, 230, 230)));
/// assert_eq!(grid.get(0, 1).color, Some((255, 255, 255)));
/// ```
pub fn apply_scanlines(grid: &mut GlyphGrid) {
    for cy in (0..grid.rows).step_by(2) {
        for cell in grid.row_mut(cy) {
            if let Some(c) = cell.color.as_mut() {
                *c = dim_permille(*c, SCANLINE_PERMILLE);
            }
        }
    }
}
