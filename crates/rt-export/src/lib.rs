//! Rendu des grilles de glyphes : texte, raster (PNG/TIFF), SVG, HTML et aperçu ANSI.
//!
//! Every renderer implements [`rt_core::Renderer`]; [`export::export_all`]
//! writes several formats in parallel and reports per-format results.

pub mod ansi;
pub mod error;
pub mod export;
pub mod font;
pub mod html;
pub mod raster;
pub mod svg;
pub mod text;

pub use error::ExportError;
pub use export::{ExportPlan, ExportReport, ExportedFile, export_all, render_to_file};
