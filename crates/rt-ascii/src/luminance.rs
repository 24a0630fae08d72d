use rt_core::charset::DensityMapper;
use rt_core::frame::{GlyphCell, GlyphGrid, ImageSample};
use rt_core::traits::ProgressSink;

/// Convertit un échantillon (un pixel par cellule) en grille de glyphes.
///
/// Each pixel's BT.601 luminance picks a character from `mapper`; the pixel
/// color is kept on the cell when `color_enabled`. `progress` advances once
/// per completed row.
///
/// # Example
/// ```
/// use rt_core::charset::DensityMapper;
/// use rt_core::frame::ImageSample;
/// use rt_core::traits::NoProgress;
/// use rt_ascii::luminance::map_luminance;
///
/// let sample = ImageSample::from_fn(2, 1, |x, _| if x == 0 { (0, 0, 0) } else { (255, 255, 255) });
/// let mapper = DensityMapper::new("@. ").unwrap();
/// let grid = map_luminance(&sample, &mapper, false, &NoProgress);
/// assert_eq!(grid.row_text(0), "@ ");
/// ```
pub fn map_luminance(
    sample: &ImageSample,
    mapper: &DensityMapper,
    color_enabled: bool,
    progress: &dyn ProgressSink,
) -> GlyphGrid {
    let mut grid = GlyphGrid::new(sample.width(), sample.height());
    for cy in 0..grid.rows {
        for (cx, cell) in (0u32..).zip(grid.row_mut(cy).iter_mut()) {
            let rgb = sample.pixel(cx, cy);
            *cell = GlyphCell {
                ch: mapper.map(sample.luminance(cx, cy)),
                color: color_enabled.then_some(rgb),
            };
        }
        progress.advance(1);
    }
    grid
}
