use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rt_ascii::convert::{convert, grid_shape};
use rt_core::config::AppConfig;
use rt_core::progress::ProgressTracker;
use rt_core::traits::{NoProgress, RenderStyle, Renderer};
use rt_export::ansi::AnsiRenderer;
use rt_export::export::{ExportPlan, export_all_with, format_size};
use rt_source::image::{is_supported, load_image};

pub mod cli;

/// Largeur de la barre de progression, en caractères.
const BAR_WIDTH: usize = 30;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config, puis les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply_overrides(&mut config);

    // 4. Charger l'image
    if !is_supported(&cli.image) {
        log::warn!(
            "Extension non reconnue pour {}, tentative de décodage quand même.",
            cli.image.display()
        );
    }
    let image = load_image(&cli.image)?;

    // 5. Conversion, une unité de progression par rangée
    let (_, rows) = grid_shape(&config.conversion, image.width(), image.height())
        .with_context(|| format!("Conversion de {} impossible", cli.image.display()))?;
    let tracker = ProgressTracker::new(u64::from(rows));
    let conversion = with_progress_bar("Conversion", &tracker, || {
        convert(&image, &config.conversion, &tracker)
    })
    .with_context(|| format!("Conversion de {} impossible", cli.image.display()))?;
    for warning in &conversion.warnings {
        eprintln!("Attention : {warning}");
    }
    let grid = conversion.grid;

    let style = RenderStyle::for_mode(
        config.conversion.mode,
        config.conversion.color_enabled,
        config.export.font.clone(),
    );

    if cli.preview {
        let preview = AnsiRenderer.render(&grid, &style, &NoProgress)?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&preview)?;
        stdout.flush()?;
    }

    // 6. Interruption propre : les formats non démarrés sont annulés
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
            eprintln!("\nInterruption demandée, arrêt après les exports en cours...");
        }) {
            log::warn!("Gestionnaire Ctrl+C indisponible : {e}");
        }
    }

    // 7. Export parallèle avec barre de progression
    let plan = ExportPlan::for_source(
        &cli.image,
        &config.export.formats,
        config.export.output_dir.clone(),
    );
    let tracker = ProgressTracker::new(plan.total_units(&grid));
    let report = with_progress_bar("Export", &tracker, || {
        export_all_with(&grid, &plan, &style, &stop, &tracker)
    });

    // 8. Résumé
    println!("Fichiers générés dans {} :", plan.output_dir.display());
    for (format, file) in report.succeeded() {
        println!(
            "  {format:<5} {} ({})",
            file.path.display(),
            format_size(file.bytes)
        );
    }
    for (format, err) in report.failures() {
        eprintln!("  {format:<5} échec : {}", error_chain(err));
    }

    if report.succeeded().next().is_none() {
        anyhow::bail!("Aucun fichier n'a pu être généré.");
    }
    Ok(())
}

/// Exécute `work` en affichant la barre de `tracker` sur stderr jusqu'à la fin.
fn with_progress_bar<T>(label: &str, tracker: &ProgressTracker, work: impl FnOnce() -> T) -> T {
    let done = AtomicBool::new(false);
    std::thread::scope(|s| {
        s.spawn(|| {
            while !done.load(Ordering::Acquire) {
                eprint!("\r{label:<10} {}", tracker.current().render_bar(BAR_WIDTH));
                std::thread::sleep(Duration::from_millis(100));
            }
            eprintln!("\r{label:<10} {}", tracker.current().render_bar(BAR_WIDTH));
        });
        let out = work();
        done.store(true, Ordering::Release);
        out
    })
}

/// `erreur: cause: cause...`, comme `{:#}` pour anyhow.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

/// Charge `--config` s'il existe, sinon les valeurs par défaut.
fn resolve_config(cli: &cli::Cli) -> Result<AppConfig> {
    if cli.config.exists() {
        rt_core::config::load_config(&cli.config)
    } else {
        log::info!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(AppConfig::default())
    }
}
