//! Command implementations

use crate::cli::ExportArgs;
use anyhow::{bail, Context, Result};
use doc_model::{find_preset, LetterFile, PRESETS};
use export::{CancelFlag, ExportService, PaginatedExporter};
use raster::SvgRasterizer;
use render_model::{compose_letter, LiveDocument, PreviewZoom};
use std::path::Path;
use std::time::Duration;
use store::pdf::PdfAssembler;
use store::{ExportSettings, SettingsManager};
use tracing::info;

/// Compose the letter file and export it
pub async fn export(args: ExportArgs) -> Result<()> {
    let mut letter = store::load_letter(&args.letter)
        .await
        .with_context(|| format!("reading letter {}", args.letter.display()))?;
    if let Some(id) = &args.preset {
        find_preset(id)?.apply(&mut letter.profile);
    }

    let mut settings = match &args.config {
        Some(path) => {
            let mut manager = SettingsManager::at_path(path);
            manager.load().await?.clone()
        }
        None => ExportSettings::default(),
    };
    if let Some(scale) = args.scale {
        settings.supersample_scale = scale;
    }
    if let Some(format) = args.format {
        settings.page_format = format;
    }
    settings.validate()?;

    let format = settings.format();
    let root = compose_letter(&letter.profile, &letter.content, &format)
        .context("composing letterhead")?;
    let zoom = args.zoom.map(PreviewZoom::new).unwrap_or_default();
    let document = LiveDocument::new(root, format).with_zoom(zoom);
    info!(
        preview_pages = document.preview_page_count()?,
        zoom = zoom.value(),
        format = %settings.page_format,
        "composed letter"
    );

    let mut pdf_options = settings.pdf_options();
    if !letter.content.subject.trim().is_empty() {
        pdf_options = pdf_options.with_title(letter.content.subject.trim());
    }
    if pdf_options.author.is_none() && !letter.profile.name.trim().is_empty() {
        pdf_options = pdf_options.with_author(letter.profile.name.trim());
    }

    // Font discovery walks the filesystem
    let rasterizer = tokio::task::spawn_blocking(SvgRasterizer::new).await?;
    let exporter = PaginatedExporter::new(rasterizer, PdfAssembler::new(pdf_options))
        .with_settings(&settings)?;
    let service = ExportService::new(exporter);

    let cancel = CancelFlag::new();
    let pending = service.export_cancellable(&document, args.output.clone(), cancel.clone());
    let report = match args.timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), pending).await {
            Ok(result) => result?,
            Err(_) => {
                cancel.cancel();
                bail!("export did not finish within {} s; nothing was written", secs);
            }
        },
        None => pending.await?,
    };

    println!(
        "Exported {} page{} to {}",
        report.page_count,
        if report.page_count == 1 { "" } else { "s" },
        args.output.display()
    );
    Ok(())
}

/// Print the preset catalogue
pub fn presets() -> Result<()> {
    for preset in PRESETS.iter() {
        println!(
            "{:<16} {:<18} {:?}, {:?}",
            preset.id, preset.name, preset.style.layout, preset.style.font_family
        );
    }
    Ok(())
}

/// Write a default letter file to `path`
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    store::save_letter_sync(&LetterFile::default(), path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
