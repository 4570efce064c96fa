//! # edgequake-pdf2img
//!
//! Convert PDF documents to raster images with ImageMagick or GraphicsMagick.
//!
//! The crate does no PDF parsing or image encoding itself. It asks `pdfinfo`
//! for the page count, runs one `convert` (or `gm convert`) process per page,
//! and optionally stacks the page images into a single tall image. Images
//! already on disk that are at least as new as the PDF are reused, so
//! repeated conversions of an unchanged document spawn nothing but the probe.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Probe    pdfinfo "doc.pdf"                      → Pages: N
//!  ├─ 2. Pages    convert <opts> "doc.pdf[i]" "doc-i.png" (concurrent, skipped when fresh)
//!  ├─ 3. Order    sort images by page index
//!  └─ 4. Combine  convert -append … "doc.png"           (optional; deletes page images)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2img::{ConvertFlag, PdfImage, PdfImageOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = PdfImageOptions::builder()
//!         .convert_option(ConvertFlag::Density, "150")
//!         .convert_option(ConvertFlag::Quality, "90")
//!         .build()?;
//!     let pdf = PdfImage::new("document.pdf", options);
//!     for path in pdf.convert_file().await? {
//!         println!("{}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## External tools
//!
//! `pdfinfo` (poppler-utils) and either ImageMagick's `convert` or
//! GraphicsMagick's `gm` must be on `PATH`. A missing binary surfaces as a
//! [`Pdf2ImgError`] whose [`ProcessError::exit`] is [`ExitInfo::SpawnFailed`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConvertFlag, ConvertOptions, PdfImageOptions, PdfImageOptionsBuilder, ToolFamily};
pub use convert::{convert, convert_sync, inspect};
pub use document::PdfImage;
pub use error::{ExitInfo, PageCountError, Pdf2ImgError, ProcessError};
pub use pipeline::command::ToolCommand;
pub use pipeline::freshness::Freshness;
pub use pipeline::metadata::DocumentInfo;
pub use pipeline::runner::{CommandRunner, ProcessOutput, SystemRunner};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
