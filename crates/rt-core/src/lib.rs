//! Types partagés, configuration et suivi de progression pour retroscii.
//!
//! This crate contains the glyph grid, the image sample, the character ramps,
//! the 16-color palette and the configuration used across the workspace.

pub mod charset;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod palette;
pub mod progress;
pub mod traits;

pub use charset::DensityMapper;
pub use config::{AppConfig, ConversionConfig, Mode, OutputFormat};
pub use error::CoreError;
pub use frame::{GlyphCell, GlyphGrid, ImageSample};
pub use progress::{ProgressSnapshot, ProgressTracker};
pub use traits::{NoProgress, ProgressSink, RenderStyle, Renderer};
