/// Triplet RGB [0,255].
pub type Rgb = (u8, u8, u8);

/// Noir pur.
pub const BLACK: Rgb = (0, 0, 0);
/// Blanc pur.
pub const WHITE: Rgb = (255, 255, 255);
/// Gris ardoise `#2B3338`, fond par défaut des modes non-bloc.
pub const SLATE: Rgb = (0x2B, 0x33, 0x38);
/// Blanc cassé `#FAFAFA`, texte par défaut sur fond sombre.
pub const SNOW: Rgb = (0xFA, 0xFA, 0xFA);

/// Luminance ITU-R BT.601 (poids 299/587/114), arrondie, dans [0, 255].
///
/// # Example
/// ```
/// use rt_core::color::luminance;
/// assert_eq!(luminance(0, 0, 0), 0);
/// assert_eq!(luminance(255, 255, 255), 255);
/// assert_eq!(luminance(255, 0, 0), 76);
/// ```
#[inline(always)]
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114 + 500) / 1000) as u8
}

/// Multiplie chaque canal par `permille / 1000`, arrondi au plus proche (0.5 vers le haut).
///
/// Integer arithmetic keeps the result exact: `dim(255, 900)` is 230, not 229.
///
/// # Example
/// ```
/// use rt_core::color::dim_permille;
/// assert_eq!(dim_permille((255, 100, 0), 900), (230, 90, 0));
/// ```
#[must_use]
pub fn dim_permille(color: Rgb, permille: u32) -> Rgb {
    let scale = |c: u8| -> u8 { ((u32::from(c) * permille + 500) / 1000).min(255) as u8 };
    (scale(color.0), scale(color.1), scale(color.2))
}

/// Format CSS/SVG `rgb(r,g,b)`.
///
/// # Example
/// ```
/// use rt_core::color::css_rgb;
/// assert_eq!(css_rgb((1, 2, 3)), "rgb(1,2,3)");
/// ```
#[must_use]
pub fn css_rgb(color: Rgb) -> String {
    format!("rgb({},{},{})", color.0, color.1, color.2)
}

/// Format hexadécimal `#RRGGBB`.
///
/// # Example
/// ```
/// use rt_core::color::hex;
/// assert_eq!(hex((0x2B, 0x33, 0x38)), "#2B3338");
/// ```
#[must_use]
pub fn hex(color: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", color.0, color.1, color.2)
}

/// Alpha-blend `fg` sur `bg`, `alpha` dans [0, 255].
#[inline(always)]
#[must_use]
pub fn blend(fg: Rgb, bg: Rgb, alpha: u8) -> Rgb {
    let a = f32::from(alpha) / 255.0;
    let mix = |f: u8, b: u8| -> u8 { (f32::from(f) * a + f32::from(b) * (1.0 - a)).round() as u8 };
    (mix(fg.0, bg.0), mix(fg.1, bg.1), mix(fg.2, bg.2))
}
