use rt_core::frame::GlyphGrid;
use rt_core::traits::{ProgressSink, RenderStyle, Renderer};

/// Texte brut `.asc` : une ligne par rangée, terminée par `\n`. La couleur est ignorée.
///
/// # Example
/// ```
/// use rt_core::config::{FontConfig, Mode};
/// use rt_core::frame::{GlyphCell, GlyphGrid};
/// use rt_core::traits::{NoProgress, RenderStyle, Renderer};
/// use rt_export::text::TextRenderer;
///
/// let mut grid = GlyphGrid::new(2, 2);
/// grid.set(0, 0, GlyphCell { ch: '@', color: Some((1, 2, 3)) });
/// let style = RenderStyle::for_mode(Mode::Monochrome, true, FontConfig::default());
/// let bytes = TextRenderer.render(&grid, &style, &NoProgress).unwrap();
/// assert_eq!(String::from_utf8(bytes).unwrap(), "@ \n  \n");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(
        &self,
        grid: &GlyphGrid,
        _style: &RenderStyle,
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<Vec<u8>> {
        let mut out = String::with_capacity((grid.cols as usize * 3 + 1) * grid.rows as usize);
        for row in grid.iter_rows().take(grid.rows as usize) {
            out.extend(row.iter().map(|c| c.ch));
            out.push('\n');
            progress.advance(1);
        }
        Ok(out.into_bytes())
    }

    fn name(&self) -> &'static str {
        "texte"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rt_core::config::{FontConfig, Mode};
    use rt_core::frame::GlyphCell;
    use rt_core::progress::ProgressTracker;

    fn style() -> RenderStyle {
        RenderStyle::for_mode(Mode::Block, true, FontConfig::default())
    }

    #[test]
    fn line_and_column_counts_match_grid() {
        let mut grid = GlyphGrid::new(80, 20);
        for (i, cell) in grid.cells.iter_mut().enumerate() {
            cell.ch = if i % 3 == 0 { '█' } else { '░' };
        }
        let bytes = TextRenderer.render(&grid, &style(), &rt_core::NoProgress).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 20);
        assert!(lines.iter().all(|l| l.chars().count() == 80));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn color_is_ignored() {
        let mut grid = GlyphGrid::new(1, 1);
        grid.set(0, 0, GlyphCell { ch: 'x', color: Some((255, 0, 0)) });
        let bytes = TextRenderer.render(&grid, &style(), &rt_core::NoProgress).unwrap();
        assert_eq!(bytes, b"x\n");
    }

    #[test]
    fn one_progress_unit_per_row() {
        let grid = GlyphGrid::new(4, 7);
        let tracker = ProgressTracker::new(7);
        TextRenderer.render(&grid, &style(), &tracker).unwrap();
        assert!(tracker.snapshot().is_done());
    }
}
