//! Atlas de glyphes pour le rendu raster.
//!
//! La police TTF/OTF configurée est essayée en premier, puis [`FONT_CANDIDATES`].
//! Sans police lisible, la police bitmap 8×8 intégrée est agrandie à la taille
//! de cellule : ce chemin ne peut pas échouer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, point};
use anyhow::Context;
use font8x8::{BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, LATIN_FONTS, MISC_FONTS, UnicodeFonts};
use rt_core::config::FontConfig;

/// Polices monospace connues, essayées dans l'ordre après la police configurée.
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
    "/Library/Fonts/Courier New.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// Motif affiché pour un caractère absent de toutes les tables bitmap.
const REPLACEMENT_GLYPH: [u8; 8] = [0x00, 0x00, 0x18, 0x3C, 0x3C, 0x18, 0x00, 0x00];

/// Rapport largeur/hauteur de la cellule bitmap.
pub const CHAR_WIDTH_RATIO: f32 = 0.6;

/// Origine des glyphes de l'atlas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// Police vectorielle chargée depuis ce fichier.
    TrueType(PathBuf),
    /// Police bitmap 8×8 intégrée.
    Bitmap,
}

/// Masques alpha pré-calculés, un par caractère, à taille de cellule fixe.
///
/// # Example
/// ```
/// use rt_export::font::{FontSource, GlyphAtlas};
/// let atlas = GlyphAtlas::bitmap(16.0, "AB".chars());
/// assert_eq!(atlas.source(), &FontSource::Bitmap);
/// let (w, h) = atlas.cell_size();
/// assert_eq!(atlas.glyph('A').len(), (w * h) as usize);
/// ```
pub struct GlyphAtlas {
    cell_width: u32,
    cell_height: u32,
    glyphs: HashMap<char, Vec<u8>>,
    /// Masque vide, rendu pour les caractères non mis en cache.
    blank: Vec<u8>,
    source: FontSource,
}

impl GlyphAtlas {
    /// Construit l'atlas des caractères `chars` avec la meilleure police disponible.
    ///
    /// Never fails: an unreadable font is logged and the next candidate is
    /// tried, down to the built-in bitmap font.
    pub fn load(font: &FontConfig, chars: impl IntoIterator<Item = char>) -> Self {
        let chars: Vec<char> = chars.into_iter().collect();
        let candidates = font
            .path
            .iter()
            .map(PathBuf::as_path)
            .chain(FONT_CANDIDATES.iter().map(Path::new));

        for path in candidates {
            if !path.is_file() {
                log::debug!("Police absente : {}", path.display());
                continue;
            }
            match Self::from_file(path, font.size, chars.iter().copied()) {
                Ok(atlas) => {
                    log::debug!("Police chargée : {}", path.display());
                    return atlas;
                }
                Err(e) => log::warn!("{e:#}"),
            }
        }

        log::warn!("Aucune police TTF utilisable, repli sur la police bitmap 8×8.");
        Self::bitmap(font.size, chars)
    }

    /// Charge une police TTF/OTF depuis un fichier.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid font.
    pub fn from_file(
        path: &Path,
        size: f32,
        chars: impl IntoIterator<Item = char>,
    ) -> anyhow::Result<Self> {
        let data =
            std::fs::read(path).with_context(|| format!("Lecture de {} impossible", path.display()))?;
        let font = FontVec::try_from_vec(data)
            .with_context(|| format!("Police invalide : {}", path.display()))?;
        Ok(Self::from_font(
            &font,
            size,
            chars,
            FontSource::TrueType(path.to_path_buf()),
        ))
    }

    fn from_font(
        font: &FontVec,
        size: f32,
        chars: impl IntoIterator<Item = char>,
        source: FontSource,
    ) -> Self {
        let scale = PxScale::from(size);

        let v_advance = font.ascent_unscaled() - font.descent_unscaled() + font.line_gap_unscaled();
        let height = (v_advance * scale.y / font.height_unscaled()).ceil() as u32;

        let m_glyph = font.glyph_id('M');
        let h_advance = font.h_advance_unscaled(m_glyph);
        let width = (h_advance * scale.x / font.height_unscaled()).ceil() as u32;

        let mut atlas = Self::empty(width.max(1), height.max(1), source);
        let ascent_px = font.ascent_unscaled() * scale.y / font.height_unscaled();

        for ch in chars {
            if atlas.glyphs.contains_key(&ch) {
                continue;
            }
            let gid = font.glyph_id(ch);
            // glyph_id 0 = .notdef : le bitmap fait mieux qu'une boîte vide.
            let mask = if gid.0 == 0 && !ch.is_whitespace() {
                atlas.bitmap_mask(ch)
            } else {
                let mut buffer = atlas.blank.clone();
                let glyph = gid.with_scale_and_position(scale, point(0.0, ascent_px));
                if let Some(outline) = font.outline_glyph(glyph) {
                    let bounds = outline.px_bounds();
                    let (cw, chh) = (atlas.cell_width, atlas.cell_height);
                    #[allow(clippy::cast_possible_wrap)]
                    outline.draw(|x, y, v| {
                        let px = (x as i32 + bounds.min.x as i32).max(0) as u32;
                        let py = (y as i32 + bounds.min.y as i32).max(0) as u32;
                        if px < cw && py < chh {
                            let idx = (py * cw + px) as usize;
                            buffer[idx] = buffer[idx].max((v.clamp(0.0, 1.0) * 255.0).round() as u8);
                        }
                    });
                }
                buffer
            };
            atlas.glyphs.insert(ch, mask);
        }
        atlas
    }

    /// Atlas bitmap 8×8 agrandi à une cellule `0.6·size × size`.
    #[must_use]
    pub fn bitmap(size: f32, chars: impl IntoIterator<Item = char>) -> Self {
        let size = if size.is_finite() { size.max(1.0) } else { 8.0 };
        let width = (size * CHAR_WIDTH_RATIO).ceil() as u32;
        let height = size.ceil() as u32;
        let mut atlas = Self::empty(width.max(1), height.max(1), FontSource::Bitmap);
        for ch in chars {
            if !atlas.glyphs.contains_key(&ch) {
                let mask = atlas.bitmap_mask(ch);
                atlas.glyphs.insert(ch, mask);
            }
        }
        atlas
    }

    fn empty(cell_width: u32, cell_height: u32, source: FontSource) -> Self {
        Self {
            cell_width,
            cell_height,
            glyphs: HashMap::new(),
            blank: vec![0u8; (cell_width * cell_height) as usize],
            source,
        }
    }

    /// Glyphe bitmap de `ch`, agrandi au plus proche voisin.
    fn bitmap_mask(&self, ch: char) -> Vec<u8> {
        let rows = bitmap_rows(ch);
        let (cw, chh) = (self.cell_width, self.cell_height);
        let mut mask = self.blank.clone();
        for py in 0..chh {
            let bits = rows[(py * 8 / chh) as usize];
            for px in 0..cw {
                // Bit de poids faible = pixel le plus à gauche.
                if (bits >> (px * 8 / cw)) & 1 == 1 {
                    mask[(py * cw + px) as usize] = 255;
                }
            }
        }
        mask
    }

    /// Masque alpha de `ch` (`cell_width × cell_height`, row-major).
    ///
    /// Characters not passed at construction render as blank.
    #[inline]
    #[must_use]
    pub fn glyph(&self, ch: char) -> &[u8] {
        self.glyphs.get(&ch).unwrap_or(&self.blank)
    }

    /// `(largeur, hauteur)` d'une cellule en pixels.
    #[must_use]
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// Police effectivement utilisée.
    #[must_use]
    pub fn source(&self) -> &FontSource {
        &self.source
    }
}

fn bitmap_rows(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BLOCK_FONTS.get(ch))
        .or_else(|| BOX_FONTS.get(ch))
        .or_else(|| MISC_FONTS.get(ch))
        .unwrap_or(REPLACEMENT_GLYPH)
}
