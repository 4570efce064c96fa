//! Timestamp-based reuse of previously rendered page images.
//!
//! The filesystem is the cache: an image is reused when it exists and is at
//! least as new as the source PDF. There is no eviction and no other
//! invalidation.

use crate::error::Pdf2ImgError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Whether an output image can be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No file at the output path.
    Missing,
    /// Output exists but is older than the source.
    Stale,
    /// Output exists and is not older than the source.
    Fresh,
}

impl Freshness {
    pub fn needs_render(self) -> bool {
        !matches!(self, Freshness::Fresh)
    }
}

/// Compare `output` against `source`.
///
/// The source is only stat'ed when the output exists. Any stat failure other
/// than a missing output is returned as [`Pdf2ImgError::Stat`].
pub async fn check_freshness(output: &Path, source: &Path) -> Result<Freshness, Pdf2ImgError> {
    let output_meta = match tokio::fs::metadata(output).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} missing", output.display());
            return Ok(Freshness::Missing);
        }
        Err(e) => return Err(stat_error(output, e)),
    };

    let source_meta = tokio::fs::metadata(source)
        .await
        .map_err(|e| stat_error(source, e))?;

    let output_mtime = output_meta.modified().map_err(|e| stat_error(output, e))?;
    let source_mtime = source_meta.modified().map_err(|e| stat_error(source, e))?;

    let freshness = if output_mtime < source_mtime {
        Freshness::Stale
    } else {
        Freshness::Fresh
    };
    debug!("{} is {:?}", output.display(), freshness);
    Ok(freshness)
}

fn stat_error(path: &Path, source: std::io::Error) -> Pdf2ImgError {
    Pdf2ImgError::Stat {
        path: path.to_path_buf(),
        source,
    }
}
