use std::fmt;

use rt_core::charset::DensityMapper;
use rt_core::config::{ConversionConfig, Mode};
use rt_core::error::CoreError;
use rt_core::frame::{GlyphGrid, ImageSample};
use rt_core::traits::ProgressSink;
use rt_source::resize::{Resampler, Sampling, grid_dimensions};

use crate::{luminance, retro};

/// Anomalie de configuration corrigée automatiquement pendant la conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionWarning {
    /// Mode Custom sans caractère : la rampe monochrome a été utilisée.
    EmptyCustomRamp,
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::EmptyCustomRamp => {
                f.write_str("rampe personnalisée vide, rampe monochrome utilisée")
            }
        }
    }
}

/// Résultat d'une conversion : la grille et les avertissements à remonter.
#[derive(Clone, Debug)]
pub struct Conversion {
    /// Grille de glyphes, en lecture seule pour les renderers.
    pub grid: GlyphGrid,
    /// Replis appliqués (vide si la configuration était complète).
    pub warnings: Vec<ConversionWarning>,
}

/// Rampe effective d'une configuration.
///
/// Custom mode with an empty ramp falls back to the monochrome ramp and
/// reports [`ConversionWarning::EmptyCustomRamp`].
///
/// # Example
/// ```
/// use rt_core::config::{ConversionConfig, Mode};
/// use rt_ascii::convert::{resolve_ramp, ConversionWarning};
///
/// let config = ConversionConfig { mode: Mode::Custom, ..ConversionConfig::default() };
/// let (mapper, warning) = resolve_ramp(&config);
/// assert_eq!(mapper.map(0), '@');
/// assert_eq!(warning, Some(ConversionWarning::EmptyCustomRamp));
/// ```
#[must_use]
pub fn resolve_ramp(config: &ConversionConfig) -> (DensityMapper, Option<ConversionWarning>) {
    let ramp = config
        .mode
        .builtin_ramp()
        .unwrap_or(config.custom_ramp.as_str());
    match DensityMapper::new(ramp) {
        Some(mapper) => (mapper, None),
        None => {
            log::warn!("Rampe personnalisée vide, repli sur la rampe monochrome.");
            (DensityMapper::default(), Some(ConversionWarning::EmptyCustomRamp))
        }
    }
}

/// Dimensions `(cols, rows)` de la grille produite par [`convert`].
///
/// Retro16 ignores `target_width` and uses a fixed square grid.
///
/// # Errors
/// [`CoreError::InvalidDimensions`] for a zero target width or an empty source.
///
/// # Example
/// ```
/// use rt_core::config::{ConversionConfig, Mode};
/// use rt_ascii::convert::grid_shape;
///
/// let config = ConversionConfig { target_width: 80, ..ConversionConfig::default() };
/// assert_eq!(grid_shape(&config, 100, 50).unwrap(), (80, 20));
/// let retro = ConversionConfig { mode: Mode::Retro16, ..config };
/// assert_eq!(grid_shape(&retro, 100, 50).unwrap(), (128, 128));
/// ```
pub fn grid_shape(
    config: &ConversionConfig,
    src_width: u32,
    src_height: u32,
) -> Result<(u32, u32), CoreError> {
    let (cols, rows) = grid_dimensions(src_width, src_height, config.target_width)?;
    if config.mode == Mode::Retro16 {
        let side = config.retro_resolution;
        if side == 0 {
            return Err(CoreError::InvalidDimensions {
                width: side,
                height: side,
            });
        }
        return Ok((side, side));
    }
    Ok((cols, rows))
}

/// Convertit une image en grille de glyphes.
///
/// Pipeline : rééchantillonnage → (quantification → scanlines, en Retro16)
/// → mapping de densité. `progress` reçoit une unité par ligne de grille.
///
/// In Retro16 the glyph is chosen from the quantized color before the
/// scanline pass, so scanlines only ever change colors.
///
/// # Errors
/// [`CoreError::InvalidDimensions`] for a zero target width or an empty
/// source image; no partial grid is returned.
///
/// # Example
/// ```
/// use rt_core::config::ConversionConfig;
/// use rt_core::frame::ImageSample;
/// use rt_core::traits::NoProgress;
/// use rt_ascii::convert::convert;
///
/// let image = ImageSample::filled(100, 50, (0, 0, 0));
/// let config = ConversionConfig { target_width: 80, color_enabled: false, ..ConversionConfig::default() };
/// let out = convert(&image, &config, &NoProgress).unwrap();
/// assert_eq!((out.grid.cols, out.grid.rows), (80, 20));
/// assert!(out.warnings.is_empty());
/// ```
pub fn convert(
    image: &ImageSample,
    config: &ConversionConfig,
    progress: &dyn ProgressSink,
) -> Result<Conversion, CoreError> {
    let (cols, rows) = grid_shape(config, image.width(), image.height())?;
    let (mapper, warning) = resolve_ramp(config);
    let mut resampler = Resampler::new();

    log::info!(
        "Conversion {}×{} → {cols}×{rows} ({}, couleur {})",
        image.width(),
        image.height(),
        config.mode,
        if config.color_enabled { "oui" } else { "non" }
    );

    let grid = if config.mode == Mode::Retro16 {
        let sample = resampler.resample(image, cols, rows, Sampling::Nearest)?;
        let mut grid = retro::quantize_grid(&sample, &mapper, config.color_enabled, progress);
        retro::apply_scanlines(&mut grid);
        grid
    } else {
        let sample = resampler.resample(image, cols, rows, Sampling::BlockAverage)?;
        luminance::map_luminance(&sample, &mapper, config.color_enabled, progress)
    };

    Ok(Conversion {
        grid,
        warnings: warning.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rt_core::NoProgress;
    use rt_core::charset::RAMP_RETRO16;
    use rt_core::palette::PALETTE_16;

    fn config(mode: Mode, width: u32, color: bool) -> ConversionConfig {
        ConversionConfig {
            target_width: width,
            mode,
            color_enabled: color,
            ..ConversionConfig::default()
        }
    }

    #[test]
    fn tracker_sized_from_shape_completes() {
        use rt_core::progress::ProgressTracker;

        let image = ImageSample::filled(90, 60, (120, 30, 200));
        for mode in [Mode::Monochrome, Mode::Block, Mode::Retro16] {
            let cfg = config(mode, 30, true);
            let (_, rows) = grid_shape(&cfg, image.width(), image.height()).unwrap();
            let tracker = ProgressTracker::new(u64::from(rows));
            let out = convert(&image, &cfg, &tracker).unwrap();
            assert_eq!(out.grid.rows, rows, "{mode}");
            assert!(tracker.snapshot().is_done(), "{mode}");
            assert_eq!(tracker.snapshot().completed, u64::from(rows), "{mode}");
        }
    }

    #[test]
    fn monochrome_100x50_at_80_columns() {
        let image = ImageSample::from_fn(100, 50, |x, y| ((x * 2) as u8, (y * 4) as u8, 90));
        let out = convert(&image, &config(Mode::Monochrome, 80, false), &NoProgress).unwrap();
        assert_eq!(out.grid.cols, 80);
        assert_eq!(out.grid.rows, 20);
        assert_eq!(out.grid.cells.len(), 80 * 20);
        assert!(!out.grid.has_color());
    }

    #[test]
    fn shape_matches_formula_for_many_aspects() {
        for (w, h) in [(1, 1), (3, 7), (640, 480), (1920, 1080), (50, 400)] {
            for target in [1u32, 13, 80, 200] {
                let image = ImageSample::filled(w, h, (128, 128, 128));
                let out = convert(&image, &config(Mode::Dots, target, false), &NoProgress).unwrap();
                let aspect = f64::from(h) / f64::from(w);
                let expected = ((f64::from(target) * aspect * 0.5).round() as u32).max(1);
                assert_eq!((out.grid.cols, out.grid.rows), (target, expected), "{w}×{h} @ {target}");
            }
        }
    }

    #[test]
    fn zero_width_fails_without_grid() {
        let image = ImageSample::filled(10, 10, (0, 0, 0));
        for mode in Mode::ALL {
            assert!(matches!(
                convert(&image, &config(mode, 0, true), &NoProgress),
                Err(CoreError::InvalidDimensions { .. })
            ));
        }
        let empty = ImageSample::filled(0, 10, (0, 0, 0));
        assert!(convert(&empty, &config(Mode::Monochrome, 10, true), &NoProgress).is_err());
    }

    #[test]
    fn retro16_black_image_uses_darkest_entry() {
        let image = ImageSample::filled(300, 200, (0, 0, 0));
        let out = convert(&image, &config(Mode::Retro16, 80, true), &NoProgress).unwrap();
        assert_eq!((out.grid.cols, out.grid.rows), (128, 128));
        let darkest = RAMP_RETRO16.chars().next().unwrap();
        for row in 0..out.grid.rows {
            for cell in out.grid.row(row) {
                assert_eq!(cell.ch, darkest);
                // Le noir atténué reste noir sur les lignes paires.
                assert_eq!(cell.color, Some(PALETTE_16[0]));
            }
        }
    }

    #[test]
    fn retro16_scanlines_dim_even_rows_only() {
        let image = ImageSample::filled(64, 64, (250, 250, 250));
        let out = convert(&image, &config(Mode::Retro16, 80, true), &NoProgress).unwrap();
        assert_eq!(out.grid.get(5, 0).color, Some((230, 230, 230)));
        assert_eq!(out.grid.get(5, 1).color, Some((255, 255, 255)));
        assert_eq!(out.grid.get(5, 126).color, Some((230, 230, 230)));
        assert_eq!(out.grid.get(5, 127).color, Some((255, 255, 255)));
    }

    #[test]
    fn retro16_glyphs_come_from_pre_scanline_luminance() {
        // Blanc quantifié : luminance 255 → dernier glyphe. Après scanline (230),
        // la luminance donnerait l'avant-dernier : les deux lignes doivent rester identiques.
        let image = ImageSample::filled(16, 16, (255, 255, 255));
        let out = convert(&image, &config(Mode::Retro16, 80, true), &NoProgress).unwrap();
        let lightest = RAMP_RETRO16.chars().last().unwrap();
        assert_eq!(out.grid.row_text(0), out.grid.row_text(1));
        assert!(out.grid.row(0).iter().all(|c| c.ch == lightest));
    }

    #[test]
    fn retro16_respects_configured_resolution() {
        let image = ImageSample::filled(10, 10, (0, 0, 255));
        let cfg = ConversionConfig {
            retro_resolution: 32,
            ..config(Mode::Retro16, 80, false)
        };
        let out = convert(&image, &cfg, &NoProgress).unwrap();
        assert_eq!((out.grid.cols, out.grid.rows), (32, 32));
        assert!(!out.grid.has_color());
    }

    #[test]
    fn empty_custom_ramp_falls_back_with_warning() {
        let image = ImageSample::filled(40, 40, (0, 0, 0));
        let out = convert(&image, &config(Mode::Custom, 20, false), &NoProgress).unwrap();
        assert_eq!(out.warnings, vec![ConversionWarning::EmptyCustomRamp]);
        assert!(out.grid.cells.iter().all(|c| c.ch == '@'));
    }

    #[test]
    fn custom_ramp_is_used_when_present() {
        let image = ImageSample::filled(40, 40, (0, 0, 0));
        let cfg = ConversionConfig {
            custom_ramp: "XO".to_string(),
            ..config(Mode::Custom, 20, true)
        };
        let out = convert(&image, &cfg, &NoProgress).unwrap();
        assert!(out.warnings.is_empty());
        assert!(out.grid.cells.iter().all(|c| c.ch == 'X'));
        assert!(out.grid.cells.iter().all(|c| c.color == Some((0, 0, 0))));
    }

    #[test]
    fn builtin_modes_ignore_custom_ramp() {
        let cfg = ConversionConfig {
            custom_ramp: "XO".to_string(),
            ..config(Mode::Block, 20, true)
        };
        let (mapper, warning) = resolve_ramp(&cfg);
        assert_eq!(mapper.chars(), "█▓▒░ ".chars().collect::<Vec<_>>().as_slice());
        assert!(warning.is_none());
    }

    #[test]
    fn horizontal_gradient_is_monotonic() {
        let image = ImageSample::from_fn(256, 8, |x, _| (x as u8, x as u8, x as u8));
        let out = convert(&image, &config(Mode::Alphanumeric, 64, false), &NoProgress).unwrap();
        let (mapper, _) = resolve_ramp(&config(Mode::Alphanumeric, 64, false));
        let indices: Vec<usize> = out
            .grid
            .row(0)
            .iter()
            .map(|c| mapper.chars().iter().position(|&r| r == c.ch).unwrap())
            .collect();
        assert!(indices.windows(2).all(|w| w[0] <= w[1]), "{indices:?}");
    }
}
