use std::collections::BTreeSet;
use std::io::Cursor;

use anyhow::{Context, bail};
use image::{ImageFormat, RgbImage};
use rayon::prelude::*;
use rt_core::color::blend;
use rt_core::frame::GlyphGrid;
use rt_core::traits::{ProgressSink, RenderStyle, Renderer};

use crate::font::GlyphAtlas;

/// Plafond du canevas, en pixels, pour refuser les grilles aberrantes.
const MAX_CANVAS_PIXELS: u64 = 400_000_000;

/// Rend la grille en image : chaque glyphe est composité sur le fond à taille de cellule fixe.
///
/// # Example
/// ```
/// use rt_core::config::{FontConfig, Mode};
/// use rt_core::frame::GlyphGrid;
/// use rt_core::traits::{NoProgress, RenderStyle, Renderer};
/// use rt_export::raster::RasterRenderer;
///
/// let grid = GlyphGrid::new(3, 2);
/// let style = RenderStyle::for_mode(Mode::Retro16, true, FontConfig::default());
/// let png = RasterRenderer::png().render(&grid, &style, &NoProgress).unwrap();
/// assert_eq!(&png[1..4], b"PNG");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RasterRenderer {
    format: ImageFormat,
}

impl RasterRenderer {
    /// Encodeur PNG.
    #[must_use]
    pub fn png() -> Self {
        Self {
            format: ImageFormat::Png,
        }
    }

    /// Encodeur TIFF.
    #[must_use]
    pub fn tiff() -> Self {
        Self {
            format: ImageFormat::Tiff,
        }
    }

    /// Compose la grille sur un canevas RGB, sans encoder.
    ///
    /// Rows are composited in parallel bands, one progress unit per row.
    ///
    /// # Errors
    /// Returns an error for an empty grid or a canvas too large to allocate.
    pub fn rasterize(
        grid: &GlyphGrid,
        style: &RenderStyle,
        atlas: &GlyphAtlas,
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<RgbImage> {
        if grid.cols == 0 || grid.rows == 0 {
            bail!("Grille vide ({}×{})", grid.cols, grid.rows);
        }
        let (cw, ch) = atlas.cell_size();
        let width = grid.cols * cw;
        let height = grid.rows * ch;
        if u64::from(width) * u64::from(height) > MAX_CANVAS_PIXELS {
            bail!("Canevas trop grand : {width}×{height}");
        }

        let stride = width as usize * 3;
        let band_size = stride * ch as usize;
        let mut data = vec![0u8; stride * height as usize];

        data.par_chunks_exact_mut(band_size)
            .enumerate()
            .for_each(|(gy, band)| {
                for (gx, cell) in grid.row(gy as u32).iter().enumerate() {
                    let alpha = atlas.glyph(cell.ch);
                    let fg = style.fill_for(cell.color);
                    let x0 = gx * cw as usize;

                    for cy in 0..ch as usize {
                        let row_offset = cy * stride;
                        for cx in 0..cw as usize {
                            let (r, g, b) = blend(fg, style.background, alpha[cy * cw as usize + cx]);
                            let px = row_offset + (x0 + cx) * 3;
                            band[px] = r;
                            band[px + 1] = g;
                            band[px + 2] = b;
                        }
                    }
                }
                progress.advance(1);
            });

        RgbImage::from_raw(width, height, data).context("Buffer raster incohérent")
    }
}

impl Renderer for RasterRenderer {
    fn render(
        &self,
        grid: &GlyphGrid,
        style: &RenderStyle,
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<Vec<u8>> {
        let chars: BTreeSet<char> = grid.cells.iter().map(|c| c.ch).collect();
        let atlas = GlyphAtlas::load(&style.font, chars);
        let canvas = Self::rasterize(grid, style, &atlas, progress)?;

        let mut bytes = Vec::new();
        canvas
            .write_to(&mut Cursor::new(&mut bytes), self.format)
            .with_context(|| format!("Encodage {} impossible", self.name()))?;
        Ok(bytes)
    }

    fn name(&self) -> &'static str {
        match self.format {
            ImageFormat::Tiff => "tiff",
            _ => "png",
        }
    }
}
