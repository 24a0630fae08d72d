use std::fmt::Write;

use rt_core::color::hex;
use rt_core::frame::GlyphGrid;
use rt_core::traits::{ProgressSink, RenderStyle, Renderer};

use crate::font::GlyphAtlas;

/// Part de la hauteur de ligne au-dessus de la ligne de base.
const BASELINE_RATIO: f32 = 0.8;

/// Ajoute `ch` à `out`, échappé pour XML/HTML.
pub(crate) fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(ch),
    }
}

/// Nombre compact pour les attributs : `6`, `0.6`, `12.5`.
fn num(v: f32) -> String {
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Image vectorielle : un `<rect>` de fond puis un `<text>` par rangée.
///
/// Colored grids emit one `<tspan>` per visible glyph with its own `x` and
/// `fill`. Cells take the size of the raster atlas for the same font, so the
/// SVG and PNG outputs share one geometry.
///
/// # Example
/// ```
/// use rt_core::config::{FontConfig, Mode};
/// use rt_core::frame::{GlyphCell, GlyphGrid};
/// use rt_core::traits::{NoProgress, RenderStyle, Renderer};
/// use rt_export::svg::SvgRenderer;
///
/// let mut grid = GlyphGrid::new(1, 1);
/// grid.set(0, 0, GlyphCell { ch: '<', color: None });
/// let style = RenderStyle::for_mode(Mode::Monochrome, false, FontConfig::default());
/// let svg = String::from_utf8(SvgRenderer.render(&grid, &style, &NoProgress).unwrap()).unwrap();
/// assert!(svg.contains("&lt;"));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    /// Rend la grille avec une cellule `(largeur, hauteur)` imposée, en pixels.
    ///
    /// # Errors
    /// Only fails if formatting into the output buffer fails.
    pub fn render_with_cell(
        grid: &GlyphGrid,
        style: &RenderStyle,
        (char_w, line_h): (f32, f32),
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<Vec<u8>> {
        let size = style.font.size;
        let width = num(grid.cols as f32 * char_w);
        let height = num(grid.rows as f32 * line_h);
        let family = "DejaVu Sans Mono, Consolas, monospace";

        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
             viewBox=\"0 0 {width} {height}\">"
        )?;
        writeln!(
            out,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            hex(style.background)
        )?;
        writeln!(
            out,
            "<g font-family=\"{family}\" font-size=\"{}\" fill=\"{}\" xml:space=\"preserve\">",
            num(size),
            hex(style.foreground)
        )?;

        let colored = style.color_enabled && grid.has_color();
        for (gy, row) in grid.iter_rows().take(grid.rows as usize).enumerate() {
            let y = num(gy as f32 * line_h + line_h * BASELINE_RATIO);
            if colored {
                write!(out, "<text y=\"{y}\">")?;
                for (gx, cell) in row.iter().enumerate() {
                    if cell.ch.is_whitespace() {
                        continue;
                    }
                    write!(
                        out,
                        "<tspan x=\"{}\" fill=\"{}\">",
                        num(gx as f32 * char_w),
                        hex(style.fill_for(cell.color))
                    )?;
                    push_escaped(&mut out, cell.ch);
                    out.push_str("</tspan>");
                }
            } else {
                write!(out, "<text x=\"0\" y=\"{y}\">")?;
                for cell in row {
                    push_escaped(&mut out, cell.ch);
                }
            }
            out.push_str("</text>\n");
            progress.advance(1);
        }

        out.push_str("</g>\n</svg>\n");
        Ok(out.into_bytes())
    }
}

impl Renderer for SvgRenderer {
    fn render(
        &self,
        grid: &GlyphGrid,
        style: &RenderStyle,
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<Vec<u8>> {
        let (cw, ch) = GlyphAtlas::load(&style.font, std::iter::empty::<char>()).cell_size();
        Self::render_with_cell(grid, style, (cw as f32, ch as f32), progress)
    }

    fn name(&self) -> &'static str {
        "svg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rt_core::config::{FontConfig, Mode};
    use rt_core::frame::GlyphCell;

    /// Rendu avec la cellule de la police bitmap, indépendante des polices installées.
    fn render(grid: &GlyphGrid, mode: Mode, color: bool) -> String {
        let style = RenderStyle::for_mode(mode, color, FontConfig::default());
        let (cw, ch) = GlyphAtlas::bitmap(style.font.size, std::iter::empty::<char>()).cell_size();
        let bytes =
            SvgRenderer::render_with_cell(grid, &style, (cw as f32, ch as f32), &rt_core::NoProgress)
                .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn geometry_follows_font_size() {
        let grid = GlyphGrid::new(10, 4);
        let svg = render(&grid, Mode::Monochrome, false);
        assert!(svg.contains("width=\"60\" height=\"40\""), "{svg}");
        assert!(svg.contains("fill=\"#2B3338\""));
        assert_eq!(svg.matches("<text ").count(), 4);
        assert!(svg.contains("xml:space=\"preserve\""));
    }

    #[test]
    fn all_markup_chars_are_escaped() {
        let mut grid = GlyphGrid::new(5, 1);
        for (i, ch) in ['&', '<', '>', '"', '\''].into_iter().enumerate() {
            grid.set(i as u32, 0, GlyphCell { ch, color: Some((1, 2, 3)) });
        }
        for color in [false, true] {
            let svg = render(&grid, Mode::Custom, color);
            let text: String = svg.lines().filter(|l| l.starts_with("<text")).collect();
            for entity in ["&amp;", "&lt;", "&gt;", "&quot;", "&#39;"] {
                assert!(text.contains(entity), "{entity} manquant : {text}");
            }
            assert!(!text.contains("<<") && !text.contains(">>"));
        }
    }

    #[test]
    fn colored_cells_get_their_own_tspan() {
        let mut grid = GlyphGrid::new(3, 1);
        grid.set(0, 0, GlyphCell { ch: '#', color: Some((255, 0, 0)) });
        grid.set(1, 0, GlyphCell { ch: ' ', color: Some((0, 0, 0)) });
        grid.set(2, 0, GlyphCell { ch: '@', color: Some((0, 0, 255)) });
        let svg = render(&grid, Mode::Monochrome, true);
        assert!(svg.contains("<tspan x=\"0\" fill=\"#FF0000\">#</tspan>"), "{svg}");
        assert!(svg.contains("<tspan x=\"12\" fill=\"#0000FF\">@</tspan>"), "{svg}");
        assert_eq!(svg.matches("<tspan").count(), 2);
    }

    #[test]
    fn canvas_matches_raster_for_same_atlas() {
        let grid = GlyphGrid::new(9, 5);
        let style = RenderStyle::for_mode(Mode::Monochrome, false, FontConfig::default());
        // Cellule TTF typique, plus haute que 0.6 × taille.
        let atlas = GlyphAtlas::load(&style.font, ['#']);
        let (cw, ch) = atlas.cell_size();
        let raster = crate::raster::RasterRenderer::rasterize(&grid, &style, &atlas, &rt_core::NoProgress)
            .unwrap();
        let svg = String::from_utf8(
            SvgRenderer::render_with_cell(&grid, &style, (cw as f32, ch as f32), &rt_core::NoProgress)
                .unwrap(),
        )
        .unwrap();
        let expected = format!("width=\"{}\" height=\"{}\"", raster.width(), raster.height());
        assert!(svg.contains(&expected), "{expected} absent : {svg}");

        let svg = String::from_utf8(SvgRenderer.render(&grid, &style, &rt_core::NoProgress).unwrap())
            .unwrap();
        assert!(svg.contains(&expected), "{expected} absent : {svg}");
    }

    #[test]
    fn line_height_follows_cell() {
        let grid = GlyphGrid::new(2, 2);
        let style = RenderStyle::for_mode(Mode::Monochrome, false, FontConfig::default());
        let svg = String::from_utf8(
            SvgRenderer::render_with_cell(&grid, &style, (7.0, 12.0), &rt_core::NoProgress).unwrap(),
        )
        .unwrap();
        assert!(svg.contains("width=\"14\" height=\"24\""), "{svg}");
        assert!(svg.contains("y=\"9.6\""), "{svg}");
        assert!(svg.contains("y=\"21.6\""), "{svg}");
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(6.0), "6");
        assert_eq!(num(0.6), "0.6");
        assert_eq!(num(12.25), "12.25");
    }
}
