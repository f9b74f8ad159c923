// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stampwerk: command-line document stamping
//
// Entry point. Initialises logging, loads the engine config, rasterizes the
// input, replays a stamp plan through an editor session, and writes the
// flattened PDF.

mod plan;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use stampwerk_core::error::StampwerkError;
use stampwerk_core::human_errors::humanize_error;
use stampwerk_core::{EngineConfig, MediaType};
use stampwerk_document::{PageRasterizer, StampFont};
use stampwerk_editor::{Document, EditorSession, QrProvider, RolePolicy};

use plan::{ImageQrProvider, Plan};

/// Stamp an image or PDF according to a JSON placement plan.
#[derive(Debug, Parser)]
#[command(name = "stampwerk", version, about)]
struct Args {
    /// Document to stamp (PDF or still image).
    #[arg(long)]
    input: PathBuf,

    /// Declared media type of the input; inferred from the extension if absent.
    #[arg(long)]
    media_type: Option<String>,

    /// JSON plan listing the stamps to place.
    #[arg(long)]
    plan: PathBuf,

    /// Where to write the flattened PDF.
    #[arg(long)]
    output: PathBuf,

    /// Engine configuration (JSON).
    #[arg(long, env = "STAMPWERK_CONFIG")]
    config: Option<PathBuf>,

    /// View zoom the plan's coordinates were captured at.
    #[arg(long, default_value_t = 1.0)]
    zoom: f32,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!("Stampwerk starting");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(error = %err, "Stamping failed");
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), StampwerkError> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let font = StampFont::resolve(config.font_path.as_deref())?;

    let plan = Plan::load(&args.plan)?;
    let qr = plan.qr_image.as_ref().map(ImageQrProvider::new);

    let mime = match args.media_type {
        Some(mime) => mime,
        None => infer_mime(&args.input)?.to_owned(),
    };
    let data = std::fs::read(&args.input)?;

    let mut session = EditorSession::new(
        config.clone(),
        Document::default(),
        plan.actor,
        Box::new(RolePolicy),
        Some(font),
    );
    session
        .upload(&rasterizer(&config, &mime)?, &data, &mime)
        .await?;
    session.set_zoom(args.zoom);

    plan::replay(&plan, &mut session, qr.as_ref().map(|p| p as &dyn QrProvider))?;

    let output = session.composite().await?;
    std::fs::write(&args.output, &output.pdf)?;
    println!("{}  {}", output.sha256, args.output.display());
    Ok(())
}

fn infer_mime(path: &Path) -> Result<&'static str, StampwerkError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    MediaType::mime_from_extension(ext)
        .ok_or_else(|| StampwerkError::UnsupportedMediaType(format!("file extension '{ext}'")))
}

/// PDFium is only bound for PDF inputs, so images stamp without it.
#[cfg(feature = "pdfium")]
fn rasterizer(config: &EngineConfig, mime: &str) -> Result<PageRasterizer, StampwerkError> {
    let rasterizer = PageRasterizer::new(config.page);
    if !matches!(MediaType::from_mime(mime), Ok(MediaType::Pdf)) {
        return Ok(rasterizer);
    }
    let renderer = stampwerk_document::PdfiumRenderer::from_system_library()?;
    Ok(rasterizer.with_renderer(renderer))
}

#[cfg(not(feature = "pdfium"))]
fn rasterizer(config: &EngineConfig, mime: &str) -> Result<PageRasterizer, StampwerkError> {
    if matches!(MediaType::from_mime(mime), Ok(MediaType::Pdf)) {
        return Err(StampwerkError::RendererUnavailable(
            "this build has no PDF renderer (rebuild with the \"pdfium\" feature)".into(),
        ));
    }
    Ok(PageRasterizer::new(config.page))
}
