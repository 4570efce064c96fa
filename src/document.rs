//! The document handle: a source PDF plus the options it is converted with.
//!
//! A [`PdfImage`] is immutable once built. It owns no processes or open
//! files; every image it produces is a side effect of a conversion call, and
//! every output path is a pure function of the handle and the page index.

use crate::config::{PdfImageOptions, ToolFamily};
use crate::pipeline::runner::{CommandRunner, SystemRunner};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// A PDF document to rasterise.
#[derive(Clone)]
pub struct PdfImage {
    pdf_path: PathBuf,
    base_name: String,
    output_directory: PathBuf,
    extension: String,
    pub(crate) options: PdfImageOptions,
    pub(crate) runner: Arc<dyn CommandRunner>,
}

impl PdfImage {
    /// Create a handle for `pdf_path`.
    ///
    /// Unset options take their defaults: the base name is the file name with
    /// a trailing `.pdf` removed, and images land next to the source file.
    pub fn new(pdf_path: impl Into<PathBuf>, options: PdfImageOptions) -> Self {
        let pdf_path = pdf_path.into();

        let base_name = options
            .base_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_base_name(&pdf_path));

        let output_directory = options
            .output_directory
            .clone()
            .unwrap_or_else(|| pdf_path.parent().map(Path::to_path_buf).unwrap_or_default());

        let extension = options.effective_extension().to_string();

        let runner: Arc<dyn CommandRunner> = match options.runner {
            Some(ref runner) => Arc::clone(runner),
            None => Arc::new(SystemRunner::new(
                options.process_timeout_secs.map(Duration::from_secs),
            )),
        };

        Self {
            pdf_path,
            base_name,
            output_directory,
            extension,
            options,
            runner,
        }
    }

    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn tool(&self) -> ToolFamily {
        self.options.tool
    }

    pub fn combined_image(&self) -> bool {
        self.options.combined_image
    }

    pub fn options(&self) -> &PdfImageOptions {
        &self.options
    }

    /// Output path of one page: `<dir>/<base>-<page>.<ext>`, page zero-based.
    pub fn page_image_path(&self, page: usize) -> PathBuf {
        self.output_directory
            .join(format!("{}-{}.{}", self.base_name, page, self.extension))
    }

    /// Output path of the combined image: `<dir>/<base>.<ext>`.
    pub fn combined_image_path(&self) -> PathBuf {
        self.output_directory
            .join(format!("{}.{}", self.base_name, self.extension))
    }
}

impl fmt::Debug for PdfImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfImage")
            .field("pdf_path", &self.pdf_path)
            .field("base_name", &self.base_name)
            .field("output_directory", &self.output_directory)
            .field("extension", &self.extension)
            .field("options", &self.options)
            .finish()
    }
}

/// File name of `path` with one trailing `.pdf` removed.
///
/// The suffix is kept when removing it would leave nothing.
fn default_base_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(OsStr::to_string_lossy)
        .unwrap_or_default();
    match name.strip_suffix(".pdf") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn doc(path: &str, options: PdfImageOptions) -> PdfImage {
        PdfImage::new(path, options)
    }

    #[test]
    fn defaults_derive_from_source_path() {
        let d = doc("/data/reports/q3.pdf", PdfImageOptions::default());
        assert_eq!(d.base_name(), "q3");
        assert_eq!(d.output_directory(), Path::new("/data/reports"));
        assert_eq!(d.extension(), "png");
        assert_eq!(d.page_image_path(0), PathBuf::from("/data/reports/q3-0.png"));
        assert_eq!(d.combined_image_path(), PathBuf::from("/data/reports/q3.png"));
    }

    #[test]
    fn only_lowercase_pdf_suffix_is_stripped() {
        assert_eq!(doc("/a/scan.PDF", PdfImageOptions::default()).base_name(), "scan.PDF");
        assert_eq!(doc("/a/x.pdf.pdf", PdfImageOptions::default()).base_name(), "x.pdf");
        assert_eq!(doc("/a/.pdf", PdfImageOptions::default()).base_name(), ".pdf");
    }

    #[test]
    fn bare_file_name_outputs_to_relative_dir() {
        let d = doc("slides.pdf", PdfImageOptions::default());
        assert_eq!(d.page_image_path(3), PathBuf::from("slides-3.png"));
    }

    #[test]
    fn overrides_are_honoured() {
        let options = PdfImageOptions::builder()
            .base_name("page")
            .extension("jpg")
            .output_directory("/tmp/out")
            .build()
            .unwrap();
        let d = doc("/data/in.pdf", options);
        assert_eq!(d.page_image_path(12), PathBuf::from("/tmp/out/page-12.jpg"));
        assert_eq!(d.combined_image_path(), PathBuf::from("/tmp/out/page.jpg"));
    }

    #[test]
    fn page_paths_never_collide() {
        let d = doc("/data/in.pdf", PdfImageOptions::default());
        let paths: HashSet<PathBuf> = (0..500).map(|p| d.page_image_path(p)).collect();
        assert_eq!(paths.len(), 500);
        assert!(!paths.contains(&d.combined_image_path()));
    }
}
