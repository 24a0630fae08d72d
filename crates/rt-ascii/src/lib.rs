//! Moteur de conversion image → grille de glyphes pour retroscii.
//!
//! Resamples an image to one pixel per cell, then maps each pixel to a
//! character by luminance (or, in Retro16 mode, quantizes to the 16-color
//! palette and applies scanlines).

pub mod convert;
pub mod luminance;
pub mod retro;

pub use convert::{Conversion, ConversionWarning, convert};
