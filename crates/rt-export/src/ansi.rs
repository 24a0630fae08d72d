//! Aperçu terminal en couleurs 24 bits (pas de fichier).

use std::fmt::Write;

use crossterm::style::{Color, Stylize};
use rt_core::frame::{GlyphCell, GlyphGrid};
use rt_core::traits::{ProgressSink, RenderStyle, Renderer};

/// Une rangée prête à imprimer : séquences truecolor par groupe de glyphes de même couleur.
///
/// Without color (or with color disabled in `style`) the row is plain text.
///
/// # Example
/// ```
/// use rt_core::config::{FontConfig, Mode};
/// use rt_core::frame::{GlyphCell, GlyphGrid};
/// use rt_core::traits::RenderStyle;
/// use rt_export::ansi::ansi_line;
///
/// let mut grid = GlyphGrid::new(2, 1);
/// grid.set(0, 0, GlyphCell { ch: '@', color: Some((255, 0, 0)) });
/// let style = RenderStyle::for_mode(Mode::Monochrome, true, FontConfig::default());
/// let line = ansi_line(grid.row(0), &style);
/// assert!(line.contains("\x1b[38;2;255;0;0m"));
/// ```
#[must_use]
pub fn ansi_line(row: &[GlyphCell], style: &RenderStyle) -> String {
    if !style.color_enabled || row.iter().all(|c| c.color.is_none()) {
        return row.iter().map(|c| c.ch).collect();
    }
    let mut out = String::new();
    let mut start = 0;
    while start < row.len() {
        let (r, g, b) = style.fill_for(row[start].color);
        let run: String = row[start..]
            .iter()
            .take_while(|c| style.fill_for(c.color) == (r, g, b))
            .map(|c| c.ch)
            .collect();
        start += run.chars().count();
        // Écriture dans une String : ne peut pas échouer.
        let _ = write!(out, "{}", run.with(Color::Rgb { r, g, b }));
    }
    out
}

/// Renderer ANSI pour l'aperçu terminal : une ligne [`ansi_line`] par rangée.
///
/// Not an export format: the CLI writes the bytes straight to stdout.
///
/// # Example
/// ```
/// use rt_core::config::{FontConfig, Mode};
/// use rt_core::frame::GlyphGrid;
/// use rt_core::traits::{NoProgress, RenderStyle, Renderer};
/// use rt_export::ansi::AnsiRenderer;
///
/// let style = RenderStyle::for_mode(Mode::Dots, false, FontConfig::default());
/// let out = AnsiRenderer.render(&GlyphGrid::new(4, 3), &style, &NoProgress).unwrap();
/// assert_eq!(out, b"    \n    \n    \n");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AnsiRenderer;

impl Renderer for AnsiRenderer {
    fn render(
        &self,
        grid: &GlyphGrid,
        style: &RenderStyle,
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<Vec<u8>> {
        let mut out = String::new();
        for row in grid.iter_rows().take(grid.rows as usize) {
            out.push_str(&ansi_line(row, style));
            out.push('\n');
            progress.advance(1);
        }
        Ok(out.into_bytes())
    }

    fn name(&self) -> &'static str {
        "ansi"
    }
}
