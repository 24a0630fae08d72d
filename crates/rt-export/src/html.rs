use std::fmt::Write;

use rt_core::color::{Rgb, css_rgb, hex};
use rt_core::frame::{GlyphCell, GlyphGrid};
use rt_core::traits::{ProgressSink, RenderStyle, Renderer};

use crate::svg::push_escaped;

/// Document HTML autonome : police monospace, `white-space: pre`, un `<div>` par rangée.
///
/// Consecutive glyphs sharing a color are merged into one `<span>`; without
/// color each row is a single span in the mode foreground.
///
/// # Example
/// ```
/// use rt_core::config::{FontConfig, Mode};
/// use rt_core::frame::GlyphGrid;
/// use rt_core::traits::{NoProgress, RenderStyle, Renderer};
/// use rt_export::html::HtmlRenderer;
///
/// let grid = GlyphGrid::new(4, 3);
/// let style = RenderStyle::for_mode(Mode::Dots, false, FontConfig::default());
/// let html = String::from_utf8(HtmlRenderer.render(&grid, &style, &NoProgress).unwrap()).unwrap();
/// assert!(html.starts_with("<!DOCTYPE html>"));
/// assert_eq!(html.matches("<div class=\"row\">").count(), 3);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlRenderer;

fn push_span(out: &mut String, color: Rgb, cells: &[GlyphCell]) -> std::fmt::Result {
    write!(out, "<span style=\"color:{}\">", css_rgb(color))?;
    for cell in cells {
        push_escaped(out, cell.ch);
    }
    out.push_str("</span>");
    Ok(())
}

impl Renderer for HtmlRenderer {
    fn render(
        &self,
        grid: &GlyphGrid,
        style: &RenderStyle,
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<Vec<u8>> {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str("<title>retroscii</title>\n<style>\n");
        writeln!(
            out,
            "body {{ margin: 0; padding: 1em; background: {}; }}",
            hex(style.background)
        )?;
        writeln!(
            out,
            ".ascii {{ font-family: 'DejaVu Sans Mono', Consolas, monospace; font-size: {}px; \
             line-height: 1; white-space: pre; color: {}; }}",
            style.font.size,
            hex(style.foreground)
        )?;
        out.push_str("</style>\n</head>\n<body>\n<div class=\"ascii\">\n");

        for row in grid.iter_rows().take(grid.rows as usize) {
            out.push_str("<div class=\"row\">");
            if style.color_enabled {
                let mut start = 0;
                while start < row.len() {
                    let fill = style.fill_for(row[start].color);
                    let len = row[start..]
                        .iter()
                        .take_while(|c| style.fill_for(c.color) == fill)
                        .count();
                    push_span(&mut out, fill, &row[start..start + len])?;
                    start += len;
                }
            } else {
                push_span(&mut out, style.foreground, row)?;
            }
            out.push_str("</div>\n");
            progress.advance(1);
        }

        out.push_str("</div>\n</body>\n</html>\n");
        Ok(out.into_bytes())
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rt_core::config::{FontConfig, Mode};

    fn render(grid: &GlyphGrid, mode: Mode, color: bool) -> String {
        let style = RenderStyle::for_mode(mode, color, FontConfig::default());
        String::from_utf8(HtmlRenderer.render(grid, &style, &rt_core::NoProgress).unwrap()).unwrap()
    }

    #[test]
    fn background_follows_mode() {
        let grid = GlyphGrid::new(1, 1);
        assert!(render(&grid, Mode::Block, false).contains("background: #FFFFFF"));
        assert!(render(&grid, Mode::Retro16, false).contains("background: #000000"));
        assert!(render(&grid, Mode::Alphanumeric, false).contains("background: #2B3338"));
    }

    #[test]
    fn uncolored_row_is_one_span() {
        let mut grid = GlyphGrid::new(3, 2);
        grid.set(0, 0, GlyphCell { ch: '<', color: None });
        grid.set(1, 0, GlyphCell { ch: '&', color: None });
        let html = render(&grid, Mode::Monochrome, false);
        assert!(html.contains(
            "<div class=\"row\"><span style=\"color:rgb(250,250,250)\">&lt;&amp; </span></div>"
        ));
        assert_eq!(html.matches("<span").count(), 2);
    }

    #[test]
    fn same_color_runs_share_a_span() {
        let mut grid = GlyphGrid::new(4, 1);
        let red = Some((255, 0, 0));
        let blue = Some((0, 0, 255));
        grid.set(0, 0, GlyphCell { ch: 'a', color: red });
        grid.set(1, 0, GlyphCell { ch: 'b', color: red });
        grid.set(2, 0, GlyphCell { ch: 'c', color: blue });
        grid.set(3, 0, GlyphCell { ch: '"', color: red });
        let html = render(&grid, Mode::Monochrome, true);
        assert!(html.contains(
            "<span style=\"color:rgb(255,0,0)\">ab</span>\
             <span style=\"color:rgb(0,0,255)\">c</span>\
             <span style=\"color:rgb(255,0,0)\">&quot;</span>"
        ), "{html}");
    }
}
