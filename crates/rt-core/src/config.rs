use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset;
use crate::color::{BLACK, Rgb, SLATE, SNOW, WHITE};
use crate::error::CoreError;

/// Largeur ASCII par défaut (en caractères).
pub const DEFAULT_TARGET_WIDTH: u32 = 100;

/// Côté de la grille fixe du mode Retro16.
pub const DEFAULT_RETRO_RESOLUTION: u32 = 128;

/// Police préférée pour l'export raster.
pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf";

/// Taille de police par défaut (pixels), pour le raster et le SVG.
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// Conversion style.
///
/// # Example
/// ```
/// use rt_core::config::Mode;
/// let mode: Mode = "16bit".parse().unwrap();
/// assert_eq!(mode, Mode::Retro16);
/// assert_eq!(Mode::default(), Mode::Monochrome);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Rampe `@%#*+=-:. `.
    #[default]
    Monochrome,
    /// Blocs Unicode `█▓▒░ `.
    Block,
    /// Points `•· `.
    Dots,
    /// Lettres, chiffres et ponctuation.
    Alphanumeric,
    /// Rampe fournie par l'utilisateur.
    Custom,
    /// Pixel-art 16 couleurs : grille fixe, palette, scanlines.
    #[serde(alias = "16bit")]
    Retro16,
}

impl Mode {
    /// All modes, in menu order.
    pub const ALL: [Mode; 6] = [
        Mode::Monochrome,
        Mode::Block,
        Mode::Dots,
        Mode::Alphanumeric,
        Mode::Custom,
        Mode::Retro16,
    ];

    /// Rampe intégrée du mode. `None` pour [`Mode::Custom`].
    #[must_use]
    pub fn builtin_ramp(self) -> Option<&'static str> {
        match self {
            Mode::Monochrome => Some(charset::RAMP_MONOCHROME),
            Mode::Block => Some(charset::RAMP_BLOCK),
            Mode::Dots => Some(charset::RAMP_DOTS),
            Mode::Alphanumeric => Some(charset::RAMP_ALPHANUMERIC),
            Mode::Custom => None,
            Mode::Retro16 => Some(charset::RAMP_RETRO16),
        }
    }

    /// Couleur de fond des exports pour ce mode.
    #[must_use]
    pub fn background(self) -> Rgb {
        match self {
            Mode::Retro16 => BLACK,
            Mode::Block => WHITE,
            _ => SLATE,
        }
    }

    /// Couleur de texte par défaut (sans couleur par cellule).
    #[must_use]
    pub fn foreground(self) -> Rgb {
        match self {
            Mode::Block => BLACK,
            _ => SNOW,
        }
    }

    /// Nom court, tel qu'accepté par `FromStr`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Mode::Monochrome => "monochrome",
            Mode::Block => "block",
            Mode::Dots => "dots",
            Mode::Alphanumeric => "alphanumeric",
            Mode::Custom => "custom",
            Mode::Retro16 => "retro16",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    /// Accepte le nom (insensible à la casse), l'alias `16bit`, ou le numéro de menu 1–6.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monochrome" | "mono" | "1" => Ok(Mode::Monochrome),
            "block" | "blocks" | "2" => Ok(Mode::Block),
            "dots" | "3" => Ok(Mode::Dots),
            "alphanumeric" | "alnum" | "4" => Ok(Mode::Alphanumeric),
            "custom" | "5" => Ok(Mode::Custom),
            "retro16" | "16bit" | "16-bit" | "6" => Ok(Mode::Retro16),
            other => Err(CoreError::InvalidConfig(format!("mode inconnu '{other}'"))),
        }
    }
}

/// Format de sortie d'un export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Texte brut `.asc`.
    Asc,
    /// Image raster PNG.
    Png,
    /// Image raster TIFF.
    Tiff,
    /// Image vectorielle SVG.
    Svg,
    /// Document HTML.
    Html,
}

impl OutputFormat {
    /// All formats, in menu order.
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Png,
        OutputFormat::Tiff,
        OutputFormat::Svg,
        OutputFormat::Html,
        OutputFormat::Asc,
    ];

    /// File extension, without the dot.
    ///
    /// # Example
    /// ```
    /// use rt_core::config::OutputFormat;
    /// assert_eq!(OutputFormat::Tiff.extension(), "tiff");
    /// ```
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Asc => "asc",
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Svg => "svg",
            OutputFormat::Html => "html",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "txt" | "text" => Ok(OutputFormat::Asc),
            "png" => Ok(OutputFormat::Png),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            "svg" => Ok(OutputFormat::Svg),
            "html" | "htm" => Ok(OutputFormat::Html),
            other => Err(CoreError::InvalidConfig(format!("format inconnu '{other}'"))),
        }
    }
}

/// Police utilisée par les exports raster et vectoriel.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FontConfig {
    /// Police TTF/OTF préférée. `None` = candidats système uniquement.
    pub path: Option<PathBuf>,
    /// Taille en pixels.
    pub size: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from(DEFAULT_FONT_PATH)),
            size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Paramètres d'une conversion image → grille de glyphes.
///
/// # Example
/// ```
/// use rt_core::config::{ConversionConfig, Mode};
/// let config = ConversionConfig::default();
/// assert_eq!(config.target_width, 100);
/// assert_eq!(config.mode, Mode::Monochrome);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConversionConfig {
    /// Largeur de la grille en caractères (modes hors Retro16).
    pub target_width: u32,
    /// Style de conversion.
    pub mode: Mode,
    /// Conserver la couleur source par cellule.
    pub color_enabled: bool,
    /// Rampe du mode Custom, du plus sombre au plus clair.
    pub custom_ramp: String,
    /// Côté de la grille carrée du mode Retro16.
    pub retro_resolution: u32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            mode: Mode::Monochrome,
            color_enabled: true,
            custom_ramp: String::new(),
            retro_resolution: DEFAULT_RETRO_RESOLUTION,
        }
    }
}

/// Paramètres d'export.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Formats à produire.
    pub formats: Vec<OutputFormat>,
    /// Dossier de sortie. `None` = `<dossier source>/<nom>_ascii/`.
    pub output_dir: Option<PathBuf>,
    /// Police raster/SVG.
    pub font: FontConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            formats: vec![OutputFormat::Png, OutputFormat::Svg, OutputFormat::Html],
            output_dir: None,
            font: FontConfig::default(),
        }
    }
}

/// Configuration complète de l'application.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Section `[conversion]`.
    pub conversion: ConversionConfig,
    /// Section `[export]`.
    pub export: ExportConfig,
}

impl AppConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.conversion.target_width = self.conversion.target_width.clamp(1, 2000);
        self.conversion.retro_resolution = self.conversion.retro_resolution.clamp(8, 1024);
        if !self.export.font.size.is_finite() {
            self.export.font.size = DEFAULT_FONT_SIZE;
        }
        self.export.font.size = self.export.font.size.clamp(4.0, 96.0);
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    conversion: Option<ConversionSection>,
    export: Option<ExportSection>,
}

#[derive(Deserialize)]
struct ConversionSection {
    target_width: Option<u32>,
    mode: Option<Mode>,
    color_enabled: Option<bool>,
    custom_ramp: Option<String>,
    retro_resolution: Option<u32>,
}

#[derive(Deserialize)]
struct ExportSection {
    formats: Option<Vec<OutputFormat>>,
    output_dir: Option<PathBuf>,
    font_path: Option<PathBuf>,
    font_size: Option<f32>,
}

/// Parse une configuration TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the TOML is malformed or a value has the wrong type.
///
/// # Example
/// ```
/// use rt_core::config::{parse_config, Mode};
/// let config = parse_config("[conversion]\nmode = \"16bit\"\n").unwrap();
/// assert_eq!(config.conversion.mode, Mode::Retro16);
/// assert_eq!(config.conversion.target_width, 100);
/// ```
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = AppConfig::default();

    if let Some(c) = file.conversion {
        if let Some(v) = c.target_width {
            config.conversion.target_width = v;
        }
        if let Some(v) = c.mode {
            config.conversion.mode = v;
        }
        if let Some(v) = c.color_enabled {
            config.conversion.color_enabled = v;
        }
        if let Some(v) = c.custom_ramp {
            config.conversion.custom_ramp = v;
        }
        if let Some(v) = c.retro_resolution {
            config.conversion.retro_resolution = v;
        }
    }

    if let Some(e) = file.export {
        if let Some(v) = e.formats {
            config.export.formats = v;
        }
        if let Some(v) = e.output_dir {
            config.export.output_dir = Some(v);
        }
        if let Some(v) = e.font_path {
            config.export.font.path = Some(v);
        }
        if let Some(v) = e.font_size {
            config.export.font.size = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use rt_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Configuration invalide dans {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parse_accepts_names_aliases_and_menu_numbers() {
        assert_eq!("Block".parse::<Mode>().unwrap(), Mode::Block);
        assert_eq!("6".parse::<Mode>().unwrap(), Mode::Retro16);
        assert_eq!(" alnum ".parse::<Mode>().unwrap(), Mode::Alphanumeric);
        assert!(matches!(
            "sepia".parse::<Mode>(),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn mode_name_roundtrips_through_from_str() {
        for mode in Mode::ALL {
            assert_eq!(mode.name().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn backgrounds_are_declared_per_mode() {
        assert_eq!(Mode::Retro16.background(), BLACK);
        assert_eq!(Mode::Block.background(), WHITE);
        assert_eq!(Mode::Monochrome.background(), SLATE);
        assert_eq!(Mode::Block.foreground(), BLACK);
        assert_eq!(Mode::Dots.foreground(), SNOW);
    }

    #[test]
    fn format_parse_and_extension() {
        assert_eq!("TIF".parse::<OutputFormat>().unwrap(), OutputFormat::Tiff);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Asc);
        assert!("gif".parse::<OutputFormat>().is_err());
        for f in OutputFormat::ALL {
            assert_eq!(f.extension().parse::<OutputFormat>().unwrap(), f);
        }
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
            [export]
            formats = ["asc", "tiff"]
            font_size = 14.0
            "#,
        )
        .unwrap();
        assert_eq!(config.conversion, ConversionConfig::default());
        assert_eq!(
            config.export.formats,
            vec![OutputFormat::Asc, OutputFormat::Tiff]
        );
        assert!((config.export.font.size - 14.0).abs() < f32::EPSILON);
        assert_eq!(
            config.export.font.path,
            Some(PathBuf::from(DEFAULT_FONT_PATH))
        );
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = parse_config(
            "[conversion]\ntarget_width = 0\nretro_resolution = 100000\n[export]\nfont_size = 1000.0\n",
        )
        .unwrap();
        assert_eq!(config.conversion.target_width, 1);
        assert_eq!(config.conversion.retro_resolution, 1024);
        assert!((config.export.font.size - 96.0).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_mode_in_toml_is_an_error() {
        assert!(parse_config("[conversion]\nmode = \"sepia\"\n").is_err());
    }

    #[test]
    fn shipped_default_toml_matches_defaults() {
        let config = parse_config(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[conversion]\nmode = \"block\"\ncolor_enabled = false\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.conversion.mode, Mode::Block);
        assert!(!config.conversion.color_enabled);
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }
}
