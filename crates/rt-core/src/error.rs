use thiserror::Error;

/// Errors originating from the core module and the conversion pipeline.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value (unknown mode, unknown format, ...).
    #[error("Configuration invalide : {0}")]
    InvalidConfig(String),

    /// Invalid width/height dimensions at resample time.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// The resampling backend rejected the operation.
    #[error("Échec du redimensionnement : {0}")]
    Resample(String),

    /// Raw pixel buffer length does not match the declared dimensions.
    #[error("Buffer image incohérent : {expected} octets attendus, {actual} reçus")]
    BufferSize {
        /// Expected byte count (`width * height * 3`).
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },
}
