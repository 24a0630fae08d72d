use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use rt_core::config::OutputFormat;
use rt_core::frame::GlyphGrid;
use rt_core::progress::{ProgressSnapshot, ProgressTracker};
use rt_core::traits::{ProgressSink, RenderStyle, Renderer};

use crate::error::ExportError;
use crate::html::HtmlRenderer;
use crate::raster::RasterRenderer;
use crate::svg::SvgRenderer;
use crate::text::TextRenderer;

/// Renderer associé à un format de fichier.
#[must_use]
pub fn renderer_for(format: OutputFormat) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Asc => Box::new(TextRenderer),
        OutputFormat::Png => Box::new(RasterRenderer::png()),
        OutputFormat::Tiff => Box::new(RasterRenderer::tiff()),
        OutputFormat::Svg => Box::new(SvgRenderer),
        OutputFormat::Html => Box::new(HtmlRenderer),
    }
}

/// Nom de base d'un fichier source, sans extension (`photo` pour `a/photo.jpg`).
#[must_use]
pub fn basename_of(source: &Path) -> String {
    source
        .file_stem()
        .map_or_else(|| "image".to_string(), |s| s.to_string_lossy().into_owned())
}

/// Dossier de sortie par défaut : `<dossier source>/<nom>_ascii/`.
///
/// # Example
/// ```
/// use rt_export::export::output_dir_for;
/// use std::path::{Path, PathBuf};
/// assert_eq!(output_dir_for(Path::new("/tmp/cat.jpg")), PathBuf::from("/tmp/cat_ascii"));
/// assert_eq!(output_dir_for(Path::new("cat.jpg")), PathBuf::from("cat_ascii"));
/// ```
#[must_use]
pub fn output_dir_for(source: &Path) -> PathBuf {
    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}_ascii", basename_of(source)))
}

/// `<dir>/<basename>.<ext>`.
#[must_use]
pub fn output_path(dir: &Path, basename: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{basename}.{}", format.extension()))
}

/// Rend la grille dans `format` et écrit le fichier `path`.
///
/// Creates the parent directory if needed. Returns the number of bytes written.
///
/// # Errors
/// [`ExportError::Render`] if the renderer fails, [`ExportError::Io`] if the
/// directory or file cannot be written.
pub fn render_to_file(
    grid: &GlyphGrid,
    format: OutputFormat,
    path: &Path,
    style: &RenderStyle,
    progress: &dyn ProgressSink,
) -> Result<u64, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            format,
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let renderer = renderer_for(format);
    let bytes = renderer
        .render(grid, style, progress)
        .map_err(|source| ExportError::Render { format, source })?;

    std::fs::write(path, &bytes).map_err(|source| ExportError::Io {
        format,
        path: path.to_path_buf(),
        source,
    })?;
    Ok(bytes.len() as u64)
}

/// Ce qu'un export doit produire et où.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportPlan {
    /// Dossier de sortie.
    pub output_dir: PathBuf,
    /// Nom de base commun des fichiers.
    pub basename: String,
    /// Formats demandés, sans doublon, dans l'ordre de la demande.
    pub formats: Vec<OutputFormat>,
}

impl ExportPlan {
    /// Plan explicite. Les formats en double sont ignorés.
    #[must_use]
    pub fn new(output_dir: PathBuf, basename: String, formats: &[OutputFormat]) -> Self {
        let mut unique = Vec::with_capacity(formats.len());
        for &f in formats {
            if !unique.contains(&f) {
                unique.push(f);
            }
        }
        Self {
            output_dir,
            basename,
            formats: unique,
        }
    }

    /// Plan pour un fichier source. `output_dir = None` donne [`output_dir_for`].
    ///
    /// # Example
    /// ```
    /// use rt_core::config::OutputFormat;
    /// use rt_export::export::ExportPlan;
    /// use std::path::{Path, PathBuf};
    ///
    /// let plan = ExportPlan::for_source(Path::new("/img/dog.png"), &[OutputFormat::Svg], None);
    /// assert_eq!(plan.path_for(OutputFormat::Svg), PathBuf::from("/img/dog_ascii/dog.svg"));
    /// ```
    #[must_use]
    pub fn for_source(
        source: &Path,
        formats: &[OutputFormat],
        output_dir: Option<PathBuf>,
    ) -> Self {
        let dir = output_dir.unwrap_or_else(|| output_dir_for(source));
        Self::new(dir, basename_of(source), formats)
    }

    /// Chemin du fichier d'un format.
    #[must_use]
    pub fn path_for(&self, format: OutputFormat) -> PathBuf {
        output_path(&self.output_dir, &self.basename, format)
    }

    /// Unités de progression attendues : une par rangée et par format.
    #[must_use]
    pub fn total_units(&self, grid: &GlyphGrid) -> u64 {
        u64::from(grid.rows) * self.formats.len() as u64
    }
}

/// Fichier produit avec succès.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFile {
    /// Chemin écrit.
    pub path: PathBuf,
    /// Taille en octets.
    pub bytes: u64,
}

/// Résultat d'un export multi-format.
#[derive(Debug)]
pub struct ExportReport {
    /// Un résultat par format, dans l'ordre du plan.
    pub results: Vec<(OutputFormat, Result<ExportedFile, ExportError>)>,
    /// Dernier état de la progression.
    pub progress: ProgressSnapshot,
}

impl ExportReport {
    /// Fichiers écrits.
    pub fn succeeded(&self) -> impl Iterator<Item = (OutputFormat, &ExportedFile)> {
        self.results
            .iter()
            .filter_map(|(f, r)| r.as_ref().ok().map(|file| (*f, file)))
    }

    /// Formats en échec, avec leur erreur.
    pub fn failures(&self) -> impl Iterator<Item = (OutputFormat, &ExportError)> {
        self.results
            .iter()
            .filter_map(|(f, r)| r.as_ref().err().map(|e| (*f, e)))
    }

    /// `true` si tous les formats ont été écrits.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|(_, r)| r.is_ok())
    }
}

/// Écrit tous les formats du plan en parallèle, avec un tracker interne.
///
/// See [`export_all_with`] to observe progress while the export runs.
#[must_use]
pub fn export_all(
    grid: &GlyphGrid,
    plan: &ExportPlan,
    style: &RenderStyle,
    stop: &AtomicBool,
) -> ExportReport {
    let tracker = ProgressTracker::new(plan.total_units(grid));
    export_all_with(grid, plan, style, stop, &tracker)
}

/// Écrit tous les formats du plan en parallèle (un worker rayon par format).
///
/// `stop` is checked before each format starts; skipped formats report
/// [`ExportError::Interrupted`]. A failing format never stops the others.
#[must_use]
pub fn export_all_with(
    grid: &GlyphGrid,
    plan: &ExportPlan,
    style: &RenderStyle,
    stop: &AtomicBool,
    tracker: &ProgressTracker,
) -> ExportReport {
    log::info!(
        "Export de {} format(s) vers {}",
        plan.formats.len(),
        plan.output_dir.display()
    );

    let results = plan
        .formats
        .par_iter()
        .map(|&format| {
            if stop.load(Ordering::Relaxed) {
                log::warn!("Export {format} annulé");
                return (format, Err(ExportError::Interrupted { format }));
            }
            let path = plan.path_for(format);
            let started = Instant::now();
            let result = render_to_file(grid, format, &path, style, tracker).map(|bytes| {
                log::info!(
                    "{} écrit ({}) en {:.2?}",
                    path.display(),
                    format_size(bytes),
                    started.elapsed()
                );
                ExportedFile { path, bytes }
            });
            if let Err(e) = &result {
                log::error!("Export {format} : {e}");
            }
            (format, result)
        })
        .collect();

    ExportReport {
        results,
        progress: tracker.snapshot(),
    }
}

/// Taille lisible : octets, KB ou MB (base 1024).
///
/// # Example
/// ```
/// use rt_export::export::format_size;
/// assert_eq!(format_size(512), "512 octets");
/// assert_eq!(format_size(2048), "2.00 KB");
/// assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes < KB {
        format!("{bytes} octets")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rt_core::config::{FontConfig, Mode};
    use rt_core::frame::GlyphCell;

    fn sample_grid() -> GlyphGrid {
        let mut grid = GlyphGrid::new(6, 3);
        for (i, cell) in grid.cells.iter_mut().enumerate() {
            *cell = GlyphCell {
                ch: ['@', '#', '.'][i % 3],
                color: Some(((i * 10) as u8, 80, 160)),
            };
        }
        grid
    }

    fn style() -> RenderStyle {
        RenderStyle::for_mode(Mode::Monochrome, true, FontConfig::default())
    }

    #[test]
    fn plan_dedupes_formats_in_order() {
        use OutputFormat::{Asc, Html, Png};
        let plan = ExportPlan::new(PathBuf::from("out"), "x".into(), &[Html, Asc, Html, Png, Asc]);
        assert_eq!(plan.formats, vec![Html, Asc, Png]);
        assert_eq!(plan.path_for(Png), PathBuf::from("out/x.png"));
        assert_eq!(plan.total_units(&sample_grid()), 9);
    }

    #[test]
    fn render_to_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/grid.asc");
        let bytes =
            render_to_file(&sample_grid(), OutputFormat::Asc, &path, &style(), &rt_core::NoProgress)
                .unwrap();
        assert_eq!(bytes, std::fs::metadata(&path).unwrap().len());
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let err = render_to_file(
            &sample_grid(),
            OutputFormat::Svg,
            &blocker.join("sub/out.svg"),
            &style(),
            &rt_core::NoProgress,
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }), "{err}");
        assert_eq!(err.format(), OutputFormat::Svg);
    }

    #[test]
    fn directory_in_place_of_file_names_the_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        std::fs::create_dir(&path).unwrap();
        let err = render_to_file(&sample_grid(), OutputFormat::Svg, &path, &style(), &rt_core::NoProgress)
            .unwrap_err();
        assert!(matches!(err, ExportError::Io { format: OutputFormat::Svg, .. }), "{err}");
        assert_eq!(err.format(), OutputFormat::Svg);
        assert!(err.to_string().starts_with("Écriture svg"), "{err}");
    }

    #[test]
    fn empty_grid_raster_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_to_file(
            &GlyphGrid::new(0, 0),
            OutputFormat::Png,
            &dir.path().join("empty.png"),
            &style(),
            &rt_core::NoProgress,
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Render { format: OutputFormat::Png, .. }));
        assert_eq!(err.format(), OutputFormat::Png);
    }

    #[test]
    fn stop_flag_skips_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let plan = ExportPlan::new(
            dir.path().to_path_buf(),
            "stopped".into(),
            &[OutputFormat::Asc, OutputFormat::Svg],
        );
        let stop = AtomicBool::new(true);
        let report = export_all(&sample_grid(), &plan, &style(), &stop);
        assert_eq!(report.failures().count(), 2);
        assert!(
            report
                .failures()
                .all(|(_, e)| matches!(e, ExportError::Interrupted { .. }))
        );
        assert_eq!(report.progress.completed, 0);
        assert!(!plan.path_for(OutputFormat::Asc).exists());
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(0), "0 octets");
        assert_eq!(format_size(1023), "1023 octets");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024 + 512 * 1024), "5.50 MB");
    }
}
