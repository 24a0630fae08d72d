use std::path::Path;

use anyhow::{Context, Result};
use rt_core::frame::ImageSample;

/// Extensions d'image reconnues.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "webp", "bmp", "tiff", "tif", "gif"];

/// `true` si l'extension du chemin fait partie de [`SUPPORTED_EXTENSIONS`].
///
/// # Example
/// ```
/// use rt_source::image::is_supported;
/// use std::path::Path;
/// assert!(is_supported(Path::new("photo.JPG")));
/// assert!(!is_supported(Path::new("notes.txt")));
/// ```
#[must_use]
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Charge une image depuis le disque, convertie en RGB 8 bits.
///
/// The format is detected from the file content, not its extension.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
///
/// # Example
/// ```no_run
/// use rt_source::image::load_image;
/// use std::path::Path;
/// let img = load_image(Path::new("photo.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<ImageSample> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Impossible de charger {}", path.display()))?;
    decode_image(&bytes).with_context(|| format!("Impossible de décoder {}", path.display()))
}

/// Décode une image encodée en mémoire (PNG, JPEG, ...).
///
/// # Errors
/// Returns an error if the bytes are not a supported image.
pub fn decode_image(bytes: &[u8]) -> Result<ImageSample> {
    let img = image::load_from_memory(bytes).context("Image illisible")?;
    into_sample(&img)
}

fn into_sample(img: &image::DynamicImage) -> Result<ImageSample> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    log::debug!("Image décodée : {width}×{height}");
    Ok(ImageSample::from_raw(width, height, rgb.into_raw())?)
}
