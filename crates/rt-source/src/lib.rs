//! Chargement d'image et rééchantillonnage vers la résolution de la grille.

pub mod image;
pub mod resize;
