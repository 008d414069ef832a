use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qr_studio::config::{Gradient, GradientKind, Logo};
use qr_studio::export::{self, png::encode_png, ExportFormat};
use qr_studio::history::{HistoryEntry, HistoryStore};
use qr_studio::payload::normalize_url;
use qr_studio::pipeline;
use qr_studio::sink::{DirectorySink, DownloadSink};
use qr_studio::{Color, ContentKind, ErrorCorrection, ModuleShape, QrConfig};

/// Render a styled QR code and export it as PNG, SVG or PDF.
#[derive(Parser, Debug)]
#[command(name = "qr-studio", version, about)]
struct Args {
    /// JSON file with a full configuration; flags override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content to encode
    #[arg(long)]
    content: Option<String>,

    /// url, text, email, phone, sms, wifi or vcard
    #[arg(long)]
    kind: Option<ContentKind>,

    /// Error correction level (L, M, Q, H)
    #[arg(long)]
    ecc: Option<ErrorCorrection>,

    /// Output side length in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Quiet zone, in modules
    #[arg(long)]
    margin: Option<u32>,

    /// Module shape: square, dots or rounded
    #[arg(long)]
    style: Option<ModuleShape>,

    /// Finder pattern shape: square, dots or rounded
    #[arg(long)]
    eye_style: Option<ModuleShape>,

    #[arg(long)]
    corner_radius: Option<u32>,

    #[arg(long)]
    foreground: Option<Color>,

    #[arg(long)]
    background: Option<Color>,

    #[arg(long)]
    transparent: bool,

    /// Two hex colors, e.g. "#3b82f6:#8b5cf6"
    #[arg(long, value_name = "START:END")]
    gradient: Option<String>,

    /// Use a radial instead of a linear gradient
    #[arg(long)]
    radial: bool,

    /// PNG or JPEG image to place in the centre
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Logo width as a percentage of the code width
    #[arg(long, default_value_t = 20)]
    logo_size: u32,

    #[arg(long)]
    label: Option<String>,

    /// Output formats (png, svg, pdf); repeatable
    #[arg(short, long = "format", default_values_t = vec!["png".to_string()])]
    formats: Vec<String>,

    /// Directory the exports are written to
    #[arg(short, long, default_value = "generated")]
    out: PathBuf,

    /// History file to record this render in
    #[arg(long)]
    history: Option<PathBuf>,
}

fn parse_gradient(stops: &str, radial: bool) -> anyhow::Result<Gradient> {
    let (start, end) = stops
        .split_once(':')
        .with_context(|| format!("gradient {stops:?} must look like START:END"))?;
    Ok(Gradient {
        kind: if radial { GradientKind::Radial } else { GradientKind::Linear },
        color_start: start.parse()?,
        color_end: end.parse()?,
    })
}

fn build_config(args: &Args) -> anyhow::Result<QrConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
        None => QrConfig::default(),
    };

    if let Some(content) = &args.content {
        config.content = content.clone();
    }
    if let Some(kind) = args.kind {
        config.content_kind = kind;
    }
    if config.content_kind == ContentKind::Url {
        config.content = normalize_url(&config.content);
    }
    if let Some(ecc) = args.ecc {
        config.error_correction = ecc;
    }
    if let Some(size) = args.size {
        config.target_size_pixels = size;
    }
    if let Some(margin) = args.margin {
        config.margin = margin;
    }
    if let Some(style) = args.style {
        config.module_style = style;
    }
    if let Some(style) = args.eye_style {
        config.eye_style = style;
    }
    if let Some(radius) = args.corner_radius {
        config.corner_radius = radius;
    }
    if let Some(color) = args.foreground {
        config.foreground_color = color;
    }
    if let Some(color) = args.background {
        config.background_color = color;
    }
    if args.transparent {
        config.transparent_background = true;
    }
    if let Some(stops) = &args.gradient {
        config.gradient = Some(parse_gradient(stops, args.radial)?);
    }
    if let Some(path) = &args.logo {
        let bytes = fs::read(path).with_context(|| format!("reading logo {}", path.display()))?;
        config.logo = Some(Logo::new(bytes, args.logo_size));
    }
    if let Some(label) = &args.label {
        config.label = Some(label.clone());
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "qr_studio=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let formats = args
        .formats
        .iter()
        .map(|f| f.parse::<ExportFormat>())
        .collect::<Result<Vec<_>, _>>()?;

    let raster = pipeline::render(&config).context("rendering QR code")?;
    let sink = DirectorySink::new(&args.out);

    let mut failed = 0;
    for format in formats {
        match export::export(&raster, &config, format) {
            Ok(artifact) => sink.deliver_artifact(&artifact),
            Err(err) => {
                tracing::error!(format = %format, error = %err, "Export failed");
                failed += 1;
            }
        }
    }

    if let Some(path) = &args.history {
        let store = HistoryStore::open(path);
        match encode_png(&raster) {
            Ok(png) => {
                let entries = store.save(HistoryEntry::new(config.clone(), &png));
                tracing::info!(count = entries.len(), "Recorded render in history");
            }
            Err(err) => tracing::warn!(error = %err, "Skipping history entry"),
        }
    }

    if failed > 0 {
        bail!("{failed} export(s) failed");
    }
    Ok(())
}
