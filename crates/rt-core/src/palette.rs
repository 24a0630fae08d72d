use crate::color::Rgb;

/// Palette 16 couleurs inspirée des jaquettes NES, utilisée par le mode Retro16.
///
/// L'index 0 (noir) est l'entrée la plus sombre. L'ordre est stable : la
/// quantification départage les égalités par l'index le plus bas.
pub const PALETTE_16: [Rgb; 16] = [
    (0, 0, 0),       // noir
    (166, 39, 33),   // rouge franc
    (225, 147, 33),  // orange vif
    (173, 214, 0),   // jaune-vert
    (81, 223, 0),    // vert citron
    (57, 195, 223),  // cyan
    (11, 83, 215),   // bleu profond
    (102, 33, 247),  // violet électrique
    (241, 91, 254),  // magenta
    (254, 94, 196),  // rose vif
    (121, 211, 0),   // vert clair
    (134, 67, 0),    // brun
    (0, 109, 133),   // bleu-vert sombre
    (66, 66, 66),    // gris foncé
    (161, 161, 161), // gris clair
    (255, 255, 255), // blanc
];

/// Distance euclidienne au carré dans l'espace RGB.
///
/// # Example
/// ```
/// use rt_core::palette::distance_sq;
/// assert_eq!(distance_sq((0, 0, 0), (1, 2, 2)), 9);
/// ```
#[inline(always)]
#[must_use]
pub fn distance_sq(a: Rgb, b: Rgb) -> u32 {
    let d = |x: u8, y: u8| -> u32 {
        let v = i32::from(x) - i32::from(y);
        (v * v) as u32
    };
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}

/// Entrée de `palette` la plus proche de `color`, avec son index.
///
/// Strict `<` comparison: on equal distance the lowest index wins.
/// Returns `(0, BLACK)` for an empty palette.
///
/// # Example
/// ```
/// use rt_core::palette::{nearest_in, PALETTE_16};
/// let (idx, c) = nearest_in(&PALETTE_16, (250, 250, 250));
/// assert_eq!(idx, 15);
/// assert_eq!(c, (255, 255, 255));
/// ```
#[must_use]
pub fn nearest_in(palette: &[Rgb], color: Rgb) -> (usize, Rgb) {
    let mut best = (0usize, crate::color::BLACK);
    let mut best_dist = u32::MAX;
    for (i, &entry) in palette.iter().enumerate() {
        let dist = distance_sq(color, entry);
        if dist < best_dist {
            best_dist = dist;
            best = (i, entry);
        }
    }
    best
}

/// Quantifie `color` sur [`PALETTE_16`].
#[inline]
#[must_use]
pub fn nearest(color: Rgb) -> (usize, Rgb) {
    nearest_in(&PALETTE_16, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_entries_map_to_themselves() {
        for (i, &c) in PALETTE_16.iter().enumerate() {
            assert_eq!(nearest(c), (i, c));
        }
    }

    #[test]
    fn result_minimizes_distance() {
        for r in (0..=255u16).step_by(15) {
            for g in (0..=255u16).step_by(15) {
                for b in (0..=255u16).step_by(15) {
                    let c = (r as u8, g as u8, b as u8);
                    let (_, q) = nearest(c);
                    let best = distance_sq(c, q);
                    assert!(PALETTE_16.iter().all(|&p| distance_sq(c, p) >= best));
                }
            }
        }
    }

    #[test]
    fn exact_midpoint_resolves_to_lowest_index() {
        // (33, 33, 33) est à égale distance du noir (0) et du gris foncé (13) : 3267.
        let mid = (33, 33, 33);
        assert_eq!(distance_sq(mid, PALETTE_16[0]), distance_sq(mid, PALETTE_16[13]));
        assert_eq!(nearest(mid).0, 0);
    }

    #[test]
    fn tie_break_on_custom_palette() {
        let palette = [(10, 0, 0), (0, 0, 0), (20, 0, 0)];
        // 5 est à distance 25 de l'index 0 et de l'index 1 ; 15 de l'index 0 et de l'index 2.
        assert_eq!(nearest_in(&palette, (5, 0, 0)).0, 0);
        assert_eq!(nearest_in(&palette, (15, 0, 0)).0, 0);
        assert_eq!(nearest_in(&[], (1, 1, 1)), (0, (0, 0, 0)));
    }

    #[test]
    fn quantization_is_reproducible() {
        let inputs = [(12, 200, 77), (128, 128, 128), (240, 10, 250)];
        let first: Vec<_> = inputs.iter().map(|&c| nearest(c)).collect();
        let second: Vec<_> = inputs.iter().map(|&c| nearest(c)).collect();
        assert_eq!(first, second);
    }
}
