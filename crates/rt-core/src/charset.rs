//! Rampes de caractères (du plus sombre au plus clair) et mapping luminance → caractère.

/// 10 caractères — rampe monochrome classique.
pub const RAMP_MONOCHROME: &str = "@%#*+=-:. ";

/// Blocs Unicode — pseudo-pixels.
pub const RAMP_BLOCK: &str = "█▓▒░ ";

/// Points — rendu aéré.
pub const RAMP_DOTS: &str = "•· ";

/// 67 caractères alphanumériques et ponctuation.
pub const RAMP_ALPHANUMERIC: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ9876543210?!;:,. ";

/// Sous-rampe restreinte du mode 16-bit (6 caractères).
pub const RAMP_RETRO16: &str = "█▓▒░▀▄";

/// Index dans une rampe de `len` caractères pour un niveau `level` ∈ [0.0, 1.0].
///
/// `floor(level × (len − 1))`, clampé à `[0, len − 1]`. The level is quantized to
/// 8 bits first so the result always agrees with [`DensityMapper`].
///
/// # Example
/// ```
/// use rt_core::charset::ramp_index;
/// assert_eq!(ramp_index(0.0, 10), 0);
/// assert_eq!(ramp_index(1.0, 10), 9);
/// assert_eq!(ramp_index(0.5, 10), 4);
/// assert_eq!(ramp_index(7.0, 10), 9);
/// ```
#[must_use]
pub fn ramp_index(level: f32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let luminance = (level.clamp(0.0, 1.0) * 255.0).round() as usize;
    luminance_index(luminance, len)
}

#[inline(always)]
fn luminance_index(luminance: usize, len: usize) -> usize {
    (luminance * (len - 1) / 255).min(len - 1)
}

/// Lookup table mapping luminance [0..255] → character of a ramp.
///
/// Pre-computed once per conversion for O(1) per-pixel cost.
///
/// # Example
/// ```
/// use rt_core::charset::DensityMapper;
/// let mapper = DensityMapper::new("@#:. ").unwrap();
/// assert_eq!(mapper.map(0), '@');
/// assert_eq!(mapper.map(255), ' ');
/// ```
#[derive(Clone, Debug)]
pub struct DensityMapper {
    chars: Vec<char>,
    lut: [usize; 256],
}

impl DensityMapper {
    /// Build a LUT from a ramp ordered darkest→lightest.
    ///
    /// Returns `None` for an empty ramp. A single-character ramp maps every
    /// luminance to that character.
    #[must_use]
    pub fn new(ramp: &str) -> Option<Self> {
        let chars: Vec<char> = ramp.chars().collect();
        if chars.is_empty() {
            return None;
        }
        Some(Self::from_chars(chars))
    }

    fn from_chars(chars: Vec<char>) -> Self {
        let mut lut = [0usize; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = ramp_index(i as f32 / 255.0, chars.len());
        }
        Self { chars, lut }
    }

    /// Map a luminance value [0..255] to a character.
    #[inline(always)]
    #[must_use]
    pub fn map(&self, luminance: u8) -> char {
        self.chars[self.lut[luminance as usize]]
    }

    /// Index dans la rampe pour une luminance donnée.
    #[inline(always)]
    #[must_use]
    pub fn index(&self, luminance: u8) -> usize {
        self.lut[luminance as usize]
    }

    /// Nombre de caractères de la rampe.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Toujours `false` : une rampe vide est refusée par [`DensityMapper::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Caractères de la rampe, du plus sombre au plus clair.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

impl Default for DensityMapper {
    /// Rampe monochrome ([`RAMP_MONOCHROME`]).
    fn default() -> Self {
        Self::from_chars(RAMP_MONOCHROME.chars().collect())
    }
}
