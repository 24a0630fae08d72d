use crate::color::Rgb;
use crate::config::{FontConfig, Mode};
use crate::frame::GlyphGrid;

/// Reçoit les unités de travail terminées (lignes converties, lignes rendues).
///
/// Implémenté par : `ProgressTracker`, `NoProgress`.
///
/// # Example
/// ```
/// use rt_core::traits::ProgressSink;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// struct Counter(AtomicU64);
/// impl ProgressSink for Counter {
///     fn advance(&self, units: u64) { self.0.fetch_add(units, Ordering::Relaxed); }
/// }
/// ```
pub trait ProgressSink: Send + Sync {
    /// Signale `units` unités terminées. Appelé depuis n'importe quel thread.
    fn advance(&self, units: u64);
}

/// Puits de progression qui ignore tout.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&self, _units: u64) {}
}

/// Apparence commune à tous les renderers.
///
/// # Example
/// ```
/// use rt_core::traits::RenderStyle;
/// use rt_core::config::{FontConfig, Mode};
/// let style = RenderStyle::for_mode(Mode::Block, false, FontConfig::default());
/// assert_eq!(style.background, (255, 255, 255));
/// assert_eq!(style.foreground, (0, 0, 0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStyle {
    /// Couleur de fond du canevas / document.
    pub background: Rgb,
    /// Couleur des glyphes sans couleur propre.
    pub foreground: Rgb,
    /// Utiliser la couleur des cellules quand elle est présente.
    pub color_enabled: bool,
    /// Police raster / vectorielle.
    pub font: FontConfig,
}

impl RenderStyle {
    /// Style par défaut d'un mode : fond et texte déclarés par [`Mode`].
    #[must_use]
    pub fn for_mode(mode: Mode, color_enabled: bool, font: FontConfig) -> Self {
        Self {
            background: mode.background(),
            foreground: mode.foreground(),
            color_enabled,
            font,
        }
    }

    /// Couleur effective d'une cellule.
    #[inline]
    #[must_use]
    pub fn fill_for(&self, color: Option<Rgb>) -> Rgb {
        match color {
            Some(c) if self.color_enabled => c,
            _ => self.foreground,
        }
    }
}

/// Sérialise une grille de glyphes dans un format de sortie.
///
/// CONTRAT : lecture seule de la grille ; une unité de progression par ligne.
///
/// # Example
/// ```
/// use rt_core::traits::{Renderer, RenderStyle, ProgressSink};
/// use rt_core::frame::GlyphGrid;
///
/// struct DummyRenderer;
/// impl Renderer for DummyRenderer {
///     fn render(&self, _grid: &GlyphGrid, _style: &RenderStyle,
///               _progress: &dyn ProgressSink) -> anyhow::Result<Vec<u8>> { Ok(Vec::new()) }
///     fn name(&self) -> &'static str { "dummy" }
/// }
/// ```
pub trait Renderer: Send + Sync {
    /// Produit les octets du fichier de sortie.
    ///
    /// # Errors
    /// Retourne une erreur si l'encodage échoue.
    fn render(
        &self,
        grid: &GlyphGrid,
        style: &RenderStyle,
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<Vec<u8>>;

    /// Nom lisible pour les logs.
    fn name(&self) -> &'static str;
}
