use std::path::PathBuf;

use rt_core::OutputFormat;
use thiserror::Error;

/// Échec d'export d'un format. Chaque variante nomme le format fautif.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The renderer failed to produce the file bytes.
    #[error("Échec du rendu {format}")]
    Render {
        /// Format concerné.
        format: OutputFormat,
        /// Cause (encodage, canevas, ...).
        #[source]
        source: anyhow::Error,
    },

    /// The output directory or file could not be written.
    #[error("Écriture {format} impossible : {}", path.display())]
    Io {
        /// Format concerné.
        format: OutputFormat,
        /// Chemin visé.
        path: PathBuf,
        /// Erreur système.
        #[source]
        source: std::io::Error,
    },

    /// The format was skipped because a stop was requested.
    #[error("Export {format} interrompu")]
    Interrupted {
        /// Format non produit.
        format: OutputFormat,
    },
}

impl ExportError {
    /// Format concerné.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        match self {
            ExportError::Render { format, .. }
            | ExportError::Io { format, .. }
            | ExportError::Interrupted { format } => *format,
        }
    }
}
