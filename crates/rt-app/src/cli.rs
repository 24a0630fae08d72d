use std::path::PathBuf;

use clap::Parser;
use rt_core::config::{AppConfig, Mode, OutputFormat};

/// retroscii — Convertit une image en art ASCII (texte, PNG, TIFF, SVG, HTML).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, GIF, TIFF, WebP).
    pub image: PathBuf,

    /// Largeur de la grille en caractères.
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Style : monochrome, block, dots, alphanumeric, custom, retro16 (ou 1–6).
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Rampe personnalisée, du plus sombre au plus clair. Implique --mode custom.
    #[arg(long)]
    pub ramp: Option<String>,

    /// Désactiver la couleur.
    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    /// Formats de sortie séparés par des virgules : asc, png, tiff, svg, html.
    #[arg(short, long, value_delimiter = ',')]
    pub formats: Option<Vec<String>>,

    /// Dossier de sortie. Défaut : `<dossier de l'image>/<nom>_ascii/`.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Police TTF/OTF pour l'export raster.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Taille de police en pixels.
    #[arg(long)]
    pub font_size: Option<f32>,

    /// Côté de la grille du mode retro16.
    #[arg(long)]
    pub retro_resolution: Option<u32>,

    /// Afficher la grille dans le terminal avant l'export.
    #[arg(long, default_value_t = false)]
    pub preview: bool,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Applique les options de la ligne de commande sur la configuration chargée.
    ///
    /// Unknown modes and formats are logged and ignored; the result is clamped.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(w) = self.width {
            config.conversion.target_width = w;
        }
        if let Some(ref ramp) = self.ramp {
            config.conversion.custom_ramp.clone_from(ramp);
            config.conversion.mode = Mode::Custom;
        }
        if let Some(ref mode) = self.mode {
            config.conversion.mode = mode.parse().unwrap_or_else(|e| {
                log::warn!("{e}, utilisation du mode monochrome.");
                Mode::Monochrome
            });
        }
        if self.no_color {
            config.conversion.color_enabled = false;
        }
        if let Some(r) = self.retro_resolution {
            config.conversion.retro_resolution = r;
        }
        if let Some(ref names) = self.formats {
            let formats: Vec<OutputFormat> = names
                .iter()
                .filter_map(|n| match n.parse() {
                    Ok(f) => Some(f),
                    Err(e) => {
                        log::warn!("{e}, ignoré.");
                        None
                    }
                })
                .collect();
            if formats.is_empty() {
                log::warn!("Aucun format valide, formats par défaut conservés.");
            } else {
                config.export.formats = formats;
            }
        }
        if let Some(ref dir) = self.output_dir {
            config.export.output_dir = Some(dir.clone());
        }
        if let Some(ref font) = self.font {
            config.export.font.path = Some(font.clone());
        }
        if let Some(size) = self.font_size {
            config.export.font.size = size;
        }
        config.clamp_all();
    }
}
