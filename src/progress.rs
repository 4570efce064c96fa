//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::PdfImageOptionsBuilder::progress_callback`] to receive
//! events as [`crate::PdfImage::convert_file`] works through the document.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2img::{ConversionProgressCallback, PdfImageOptions};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page: usize, total_pages: usize, path: &Path, reused: bool) {
//!         if !reused {
//!             self.rendered.fetch_add(1, Ordering::SeqCst);
//!         }
//!         eprintln!("Page {}/{} → {}", page + 1, total_pages, path.display());
//!     }
//! }
//!
//! let options = PdfImageOptions::builder()
//!     .progress_callback(Arc::new(CountingCallback { rendered: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by [`crate::PdfImage::convert_file`] as pages finish.
///
/// Pages convert concurrently, so `on_page_complete` and `on_page_error`
/// may be called in any page order and from different threads. All methods
/// default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the page count is known, before any page is converted.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page image is available.
    ///
    /// # Arguments
    /// * `page`   — zero-based page index
    /// * `path`   — the page image
    /// * `reused` — true when an up-to-date image was already on disk
    fn on_page_complete(&self, page: usize, total_pages: usize, path: &Path, reused: bool) {
        let _ = (page, total_pages, path, reused);
    }

    /// Called when a page fails. The conversion stops after the first failure.
    fn on_page_error(&self, page: usize, total_pages: usize, error: &str) {
        let _ = (page, total_pages, error);
    }

    /// Called after the page images were stacked into `output`.
    fn on_combine_complete(&self, input_count: usize, output: &Path) {
        let _ = (input_count, output);
    }

    /// Called once after a successful conversion.
    ///
    /// `output_count` is the number of paths returned to the caller: the page
    /// count, or 1 for a combined image.
    fn on_conversion_complete(&self, total_pages: usize, output_count: usize) {
        let _ = (total_pages, output_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PdfImageOptions`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
