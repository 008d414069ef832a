//! # qr-studio
//!
//! A Rust library for rendering styled QR codes and exporting them as PNG, SVG or PDF.
//!
//! `qr-studio` takes a [`config::QrConfig`] (content, error correction level, colors,
//! module shapes, gradient, logo, caption) and runs it through a fixed pipeline of pure
//! value-to-value stages. Encoding is delegated to the `qrcode` crate; everything after the
//! bit matrix happens here.
//!
//! ## Features
//!
//! - Square, dot or rounded modules, styled separately for the three finder patterns.
//! - Flat or transparent backgrounds, and linear or radial gradients clipped to the dark modules.
//! - Centered logos on a protective patch, sized as a share of the code width.
//! - Caption labels drawn under the code with an embedded bitmap font.
//! - PNG, SVG (embedding the PNG) and single-page A4 PDF export from the same raster.
//! - A bounded, de-duplicated render history with JSON import and export.
//! - A debounced async scheduler that drops renders superseded by newer requests.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qr-studio = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Render a code with a gradient and a label, then export it:
//!
//! ```rust
//! use qr_studio::config::{Gradient, QrConfig};
//! use qr_studio::export::ExportFormat;
//! use qr_studio::pipeline::generate;
//!
//! let config = QrConfig {
//!     gradient: Some(Gradient::default()),
//!     label: Some("Scan Me".into()),
//!     ..QrConfig::new("https://example.com")
//! };
//! let artifact = generate(&config, ExportFormat::Png).unwrap();
//! assert_eq!(artifact.mime, "image/png");
//! assert!(artifact.filename.starts_with("qr-code-"));
//! ```
//!
//! Build the payload for a Wi-Fi network:
//!
//! ```rust
//! use qr_studio::payload::WifiConfig;
//!
//! let payload = WifiConfig { ssid: "Home".into(), password: "secret".into(), ..Default::default() }
//!     .to_payload();
//! assert!(payload.starts_with("WIFI:T:WPA;S:Home;"));
//! ```
//!
//! ## Modules
//!
//! - [`encoder`]: Adapter over the external QR encoder.
//! - [`raster`]: The base rasterizer.
//! - [`compose`]: Gradient, logo and label passes.
//! - [`export`]: PNG, SVG and PDF serializers.
//! - [`history`]: The recent-renders store.
//! - [`pipeline`] and [`scheduler`]: Synchronous and debounced async entry points.

#![forbid(unsafe_code)]

pub mod color;
pub mod compose;
pub mod config;
pub mod encoder;
pub mod error;
pub mod export;
pub mod history;
pub mod payload;
pub mod pipeline;
pub mod raster;
pub mod scheduler;
pub mod sink;

pub use color::Color;
pub use config::{ContentKind, ErrorCorrection, Gradient, GradientKind, Logo, ModuleShape, QrConfig};
pub use error::{EncodingError, Error, ExportError, ImportError, RenderError, Result};
pub use export::{Artifact, ExportFormat};
pub use history::{HistoryEntry, HistoryStore};
pub use raster::RasterImage;
pub use scheduler::RenderScheduler;
pub use sink::{DirectorySink, DownloadSink, MemorySink};
