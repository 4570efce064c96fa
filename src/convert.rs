//! Conversion entry points.
//!
//! ```text
//! convert_file
//!  ├─ number_of_pages   pdfinfo → "Pages: N"
//!  ├─ convert_page × N  concurrent; each skips work when its image is fresh
//!  ├─ sort by page      completion order is not page order
//!  └─ combine_images    optional: stack, then delete the per-page images
//! ```
//!
//! The page fan-out is a single future: the first failing page ends it, and
//! dropping the remaining in-flight conversions kills their processes.

use crate::config::PdfImageOptions;
use crate::document::PdfImage;
use crate::error::Pdf2ImgError;
use crate::pipeline::command::{combine_command, page_convert_command, probe_command};
use crate::pipeline::freshness::{check_freshness, Freshness};
use crate::pipeline::metadata::{parse_probe_output, DocumentInfo};
use futures::future::join_all;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of converting one page.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PageOutcome {
    page: usize,
    path: PathBuf,
    reused: bool,
}

impl PdfImage {
    /// Run the probe tool and return everything it reported.
    pub async fn info(&self) -> Result<DocumentInfo, Pdf2ImgError> {
        let command = probe_command(self.pdf_path());
        debug!("Probe: {}", command);

        let output = self
            .runner
            .run(&command)
            .await
            .map_err(|source| Pdf2ImgError::Probe {
                path: self.pdf_path().to_path_buf(),
                source,
            })?;

        Ok(parse_probe_output(&output.stdout))
    }

    /// Number of pages, as reported by the probe tool.
    pub async fn number_of_pages(&self) -> Result<usize, Pdf2ImgError> {
        let info = self.info().await?;
        info.page_count().map_err(|source| Pdf2ImgError::Metadata {
            path: self.pdf_path().to_path_buf(),
            source,
        })
    }

    /// Convert one zero-based page and return its image path.
    ///
    /// When an image at least as new as the PDF already exists, it is
    /// returned without running the conversion tool.
    pub async fn convert_page(&self, page: usize) -> Result<PathBuf, Pdf2ImgError> {
        self.render_page(page).await.map(|outcome| outcome.path)
    }

    async fn render_page(&self, page: usize) -> Result<PageOutcome, Pdf2ImgError> {
        let path = self.page_image_path(page);

        let freshness = check_freshness(&path, self.pdf_path()).await?;
        if freshness == Freshness::Fresh {
            debug!("Page {}: reusing {}", page, path.display());
            return Ok(PageOutcome {
                page,
                path,
                reused: true,
            });
        }

        let command = page_convert_command(
            self.tool(),
            self.pdf_path(),
            page,
            &self.options.convert_options,
            &path,
        );
        debug!("Page {} ({:?}): {}", page, freshness, command);

        self.runner
            .run(&command)
            .await
            .map_err(|source| Pdf2ImgError::Conversion { page, source })?;

        Ok(PageOutcome {
            page,
            path,
            reused: false,
        })
    }

    /// Convert every page.
    ///
    /// Returns the page images in page order, or a single combined image when
    /// [`PdfImageOptions::combined_image`] is set. A document with no pages
    /// yields an empty list.
    ///
    /// # Errors
    /// The first failing page aborts the conversion. Images already written
    /// for other pages stay on disk.
    pub async fn convert_file(&self) -> Result<Vec<PathBuf>, Pdf2ImgError> {
        let start = Instant::now();
        info!("Starting conversion: {}", self.pdf_path().display());

        // ── Step 1: Page count ───────────────────────────────────────────
        let total_pages = self.number_of_pages().await?;
        info!("PDF has {} pages", total_pages);

        if total_pages == 0 {
            warn!("{} has no pages; nothing to convert", self.pdf_path().display());
            return Ok(Vec::new());
        }

        let callback = self.options.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_conversion_start(total_pages);
        }

        // ── Step 2: Convert pages concurrently ───────────────────────────
        let limit = self.options.concurrency.unwrap_or(total_pages).max(1);
        let mut outcomes: Vec<PageOutcome> = stream::iter(0..total_pages)
            .map(|page| async move {
                let result = self.render_page(page).await;
                if let Some(cb) = callback {
                    match &result {
                        Ok(o) => cb.on_page_complete(o.page, total_pages, &o.path, o.reused),
                        Err(e) => cb.on_page_error(page, total_pages, &e.to_string()),
                    }
                }
                result
            })
            .buffer_unordered(limit)
            .try_collect()
            .await?;

        // ── Step 3: Restore page order ───────────────────────────────────
        outcomes.sort_by_key(|o| o.page);
        let reused = outcomes.iter().filter(|o| o.reused).count();
        let paths: Vec<PathBuf> = outcomes.into_iter().map(|o| o.path).collect();
        info!(
            "Converted {} pages ({} reused) in {}ms",
            total_pages,
            reused,
            start.elapsed().as_millis()
        );

        // ── Step 4: Optionally combine ───────────────────────────────────
        let outputs = if self.combined_image() {
            vec![self.combine_images(&paths).await?]
        } else {
            paths
        };

        if let Some(cb) = callback {
            cb.on_conversion_complete(total_pages, outputs.len());
        }

        Ok(outputs)
    }

    /// Stack `image_paths` top to bottom into [`PdfImage::combined_image_path`],
    /// then delete the inputs.
    ///
    /// Deletion failures are logged and do not fail the call. When the
    /// combine itself fails the inputs are left untouched.
    pub async fn combine_images(&self, image_paths: &[PathBuf]) -> Result<PathBuf, Pdf2ImgError> {
        let output = self.combined_image_path();
        let command = combine_command(self.tool(), image_paths, &output);
        debug!("Combine: {}", command);

        self.runner
            .run(&command)
            .await
            .map_err(|source| Pdf2ImgError::Combine {
                output: output.clone(),
                source,
            })?;

        remove_images(image_paths).await;

        if let Some(ref cb) = self.options.progress_callback {
            cb.on_combine_complete(image_paths.len(), &output);
        }
        info!("Combined {} images into {}", image_paths.len(), output.display());
        Ok(output)
    }

    /// Blocking wrapper around [`PdfImage::convert_file`].
    ///
    /// Creates a temporary tokio runtime internally; do not call from inside
    /// an async context.
    pub fn convert_file_blocking(&self) -> Result<Vec<PathBuf>, Pdf2ImgError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| Pdf2ImgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.convert_file())
    }
}

/// Convert every page of `pdf_path` with `options`.
///
/// Shorthand for `PdfImage::new(pdf_path, options).convert_file()`.
pub async fn convert(
    pdf_path: impl AsRef<Path>,
    options: &PdfImageOptions,
) -> Result<Vec<PathBuf>, Pdf2ImgError> {
    PdfImage::new(pdf_path.as_ref(), options.clone())
        .convert_file()
        .await
}

/// Synchronous wrapper around [`convert`].
pub fn convert_sync(
    pdf_path: impl AsRef<Path>,
    options: &PdfImageOptions,
) -> Result<Vec<PathBuf>, Pdf2ImgError> {
    PdfImage::new(pdf_path.as_ref(), options.clone()).convert_file_blocking()
}

/// Report probe metadata for `pdf_path` without converting anything.
pub async fn inspect(pdf_path: impl AsRef<Path>) -> Result<DocumentInfo, Pdf2ImgError> {
    PdfImage::new(pdf_path.as_ref(), PdfImageOptions::default())
        .info()
        .await
}

/// Delete every image, logging failures.
async fn remove_images(image_paths: &[PathBuf]) {
    let results = join_all(image_paths.iter().map(tokio::fs::remove_file)).await;
    for (path, result) in image_paths.iter().zip(results) {
        if let Err(e) = result {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
