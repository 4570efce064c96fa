//! Configuration types for PDF-to-image conversion.
//!
//! Everything a [`crate::PdfImage`] needs beyond the source path lives in
//! [`PdfImageOptions`], built via its [`PdfImageOptionsBuilder`]. Fields left
//! unset fall back to the documented defaults: PNG output, next to the source
//! file, named after the source file, one ImageMagick process per page.

use crate::error::Pdf2ImgError;
use crate::pipeline::runner::CommandRunner;
use crate::progress::{ConversionProgressCallback, ProgressCallback};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Default output extension: a lossless raster format.
pub const DEFAULT_EXTENSION: &str = "png";

/// Options for a [`crate::PdfImage`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2img::{ConvertFlag, PdfImageOptions, ToolFamily};
///
/// let options = PdfImageOptions::builder()
///     .convert_option(ConvertFlag::Density, "300")
///     .convert_flag(ConvertFlag::Strip)
///     .extension("jpg")
///     .tool(ToolFamily::GraphicsMagick)
///     .build()
///     .unwrap();
/// assert_eq!(options.convert_options.to_options_string(), "-density 300 -strip");
/// ```
#[derive(Clone, Default)]
pub struct PdfImageOptions {
    /// Stem of every output file name. Default: source file name without `.pdf`.
    pub base_name: Option<String>,

    /// Flags passed to the conversion tool before the source page.
    pub convert_options: ConvertOptions,

    /// Output file extension, without the dot. Default: `png`.
    ///
    /// The conversion tool picks the output encoder from this extension.
    pub extension: String,

    /// Which tool family rasterises and combines. Default: ImageMagick.
    pub tool: ToolFamily,

    /// Stack all pages vertically into one image. Default: false.
    ///
    /// The per-page images are deleted once the combined image is written.
    pub combined_image: bool,

    /// Directory for output images. Default: the source file's directory.
    pub output_directory: Option<PathBuf>,

    /// Maximum page conversions in flight at once. Default: None (all pages).
    ///
    /// Each in-flight conversion is a separate OS process. Large documents
    /// with no cap spawn one process per page simultaneously.
    pub concurrency: Option<usize>,

    /// Per-process wall-clock limit in seconds. Default: None (unbounded).
    pub process_timeout_secs: Option<u64>,

    /// Pre-constructed process runner. Default: [`crate::SystemRunner`].
    pub runner: Option<Arc<dyn CommandRunner>>,

    /// Per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for PdfImageOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfImageOptions")
            .field("base_name", &self.base_name)
            .field("convert_options", &self.convert_options)
            .field("extension", &self.extension)
            .field("tool", &self.tool)
            .field("combined_image", &self.combined_image)
            .field("output_directory", &self.output_directory)
            .field("concurrency", &self.concurrency)
            .field("process_timeout_secs", &self.process_timeout_secs)
            .field("runner", &self.runner.as_ref().map(|_| "<dyn CommandRunner>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl PdfImageOptions {
    /// Create a new builder for `PdfImageOptions`.
    pub fn builder() -> PdfImageOptionsBuilder {
        PdfImageOptionsBuilder {
            options: Self {
                extension: DEFAULT_EXTENSION.to_string(),
                ..Self::default()
            },
        }
    }

    /// The extension to use, falling back to the default when left empty.
    pub(crate) fn effective_extension(&self) -> &str {
        if self.extension.is_empty() {
            DEFAULT_EXTENSION
        } else {
            &self.extension
        }
    }
}

/// Builder for [`PdfImageOptions`].
#[derive(Debug)]
pub struct PdfImageOptionsBuilder {
    options: PdfImageOptions,
}

impl PdfImageOptionsBuilder {
    pub fn base_name(mut self, name: impl Into<String>) -> Self {
        self.options.base_name = Some(name.into());
        self
    }

    pub fn convert_options(mut self, options: ConvertOptions) -> Self {
        self.options.convert_options = options;
        self
    }

    /// Add a flag that takes a value, e.g. `-density 300`.
    pub fn convert_option(mut self, flag: ConvertFlag, value: impl Into<String>) -> Self {
        self.options.convert_options.set(flag, value);
        self
    }

    /// Add a flag that is emitted alone, e.g. `-strip`.
    pub fn convert_flag(mut self, flag: ConvertFlag) -> Self {
        self.options.convert_options.set_flag(flag);
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.options.extension = ext.into();
        self
    }

    pub fn tool(mut self, tool: ToolFamily) -> Self {
        self.options.tool = tool;
        self
    }

    pub fn graphics_magick(mut self, v: bool) -> Self {
        self.options.tool = if v {
            ToolFamily::GraphicsMagick
        } else {
            ToolFamily::ImageMagick
        };
        self
    }

    pub fn combined_image(mut self, v: bool) -> Self {
        self.options.combined_image = v;
        self
    }

    pub fn output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.output_directory = Some(dir.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.options.concurrency = Some(n);
        self
    }

    pub fn process_timeout_secs(mut self, secs: u64) -> Self {
        self.options.process_timeout_secs = Some(secs);
        self
    }

    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.options.runner = Some(runner);
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn ConversionProgressCallback>) -> Self {
        self.options.progress_callback = Some(cb);
        self
    }

    /// Build the options, validating constraints.
    pub fn build(self) -> Result<PdfImageOptions, Pdf2ImgError> {
        let o = &self.options;
        if o.extension.is_empty() {
            return Err(Pdf2ImgError::InvalidConfig(
                "Extension must not be empty".into(),
            ));
        }
        if o.extension.starts_with('.') || has_separator(&o.extension) {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "Extension must be a bare name like 'png', got '{}'",
                o.extension
            )));
        }
        if let Some(ref name) = o.base_name {
            if name.is_empty() || has_separator(name) {
                return Err(Pdf2ImgError::InvalidConfig(format!(
                    "Base name must be a non-empty file name, got '{}'",
                    name
                )));
            }
        }
        if o.concurrency == Some(0) {
            return Err(Pdf2ImgError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if o.process_timeout_secs == Some(0) {
            return Err(Pdf2ImgError::InvalidConfig(
                "Process timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.options)
    }
}

fn has_separator(s: &str) -> bool {
    s.contains('/') || s.contains(std::path::MAIN_SEPARATOR)
}

// ── Tool family ──────────────────────────────────────────────────────────

/// The external toolkit that rasterises pages and stacks images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolFamily {
    /// `convert ...` (default)
    #[default]
    ImageMagick,
    /// `gm convert ...`
    GraphicsMagick,
}

// ── Convert options ──────────────────────────────────────────────────────

/// A conversion-tool flag from the supported vocabulary.
///
/// Flags order by their textual form (`+profile` < `-alpha` < … < `-strip`),
/// which is the order they appear on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConvertFlag {
    #[serde(rename = "-resize")]
    Resize,
    #[serde(rename = "-quality")]
    Quality,
    #[serde(rename = "-strip")]
    Strip,
    /// `+profile`: remove embedded profiles matching the value (e.g. `"*"`).
    #[serde(rename = "+profile")]
    StripProfile,
    #[serde(rename = "-density")]
    Density,
    #[serde(rename = "-colorspace")]
    Colorspace,
    #[serde(rename = "-background")]
    Background,
    #[serde(rename = "-alpha")]
    Alpha,
}

impl ConvertFlag {
    pub const ALL: [ConvertFlag; 8] = [
        ConvertFlag::Resize,
        ConvertFlag::Quality,
        ConvertFlag::Strip,
        ConvertFlag::StripProfile,
        ConvertFlag::Density,
        ConvertFlag::Colorspace,
        ConvertFlag::Background,
        ConvertFlag::Alpha,
    ];

    /// The flag as written on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ConvertFlag::Resize => "-resize",
            ConvertFlag::Quality => "-quality",
            ConvertFlag::Strip => "-strip",
            ConvertFlag::StripProfile => "+profile",
            ConvertFlag::Density => "-density",
            ConvertFlag::Colorspace => "-colorspace",
            ConvertFlag::Background => "-background",
            ConvertFlag::Alpha => "-alpha",
        }
    }
}

impl Ord for ConvertFlag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for ConvertFlag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ConvertFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConvertFlag {
    type Err = Pdf2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConvertFlag::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| Pdf2ImgError::InvalidConfig(format!("Unknown convert flag '{s}'")))
    }
}

/// Conversion-tool flags and their optional values.
///
/// Iteration is always in flag order regardless of insertion order, so two
/// option sets with the same entries render the same command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions(BTreeMap<ConvertFlag, Option<String>>);

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `flag value`, replacing any earlier value.
    pub fn set(&mut self, flag: ConvertFlag, value: impl Into<String>) -> &mut Self {
        self.0.insert(flag, Some(value.into()));
        self
    }

    /// Set a bare `flag`, replacing any earlier value.
    pub fn set_flag(&mut self, flag: ConvertFlag) -> &mut Self {
        self.0.insert(flag, None);
        self
    }

    pub fn get(&self, flag: ConvertFlag) -> Option<Option<&str>> {
        self.0.get(&flag).map(|v| v.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Entries in command-line order.
    pub fn iter(&self) -> impl Iterator<Item = (ConvertFlag, Option<&str>)> {
        self.0.iter().map(|(k, v)| (*k, v.as_deref()))
    }

    /// Render as `"flag value flag flag value"`; empty when no options are set.
    pub fn to_options_string(&self) -> String {
        self.iter()
            .map(|(flag, value)| match value {
                Some(v) => format!("{} {}", flag, v),
                None => flag.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromIterator<(ConvertFlag, Option<String>)> for ConvertOptions {
    fn from_iter<I: IntoIterator<Item = (ConvertFlag, Option<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_string_sorted_by_flag() {
        let mut a = ConvertOptions::new();
        a.set(ConvertFlag::Quality, "100")
            .set(ConvertFlag::Density, "300")
            .set_flag(ConvertFlag::Strip)
            .set(ConvertFlag::StripProfile, "*");

        let mut b = ConvertOptions::new();
        b.set(ConvertFlag::StripProfile, "*")
            .set_flag(ConvertFlag::Strip)
            .set(ConvertFlag::Density, "300")
            .set(ConvertFlag::Quality, "100");

        let expected = "+profile * -density 300 -quality 100 -strip";
        assert_eq!(a.to_options_string(), expected);
        assert_eq!(b.to_options_string(), expected);
    }

    #[test]
    fn options_string_empty() {
        assert_eq!(ConvertOptions::new().to_options_string(), "");
    }

    #[test]
    fn flag_order_matches_string_order() {
        let mut flags = ConvertFlag::ALL.to_vec();
        flags.sort();
        let names: Vec<&str> = flags.iter().map(|f| f.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "+profile");
    }

    #[test]
    fn flag_round_trips_through_text() {
        for flag in ConvertFlag::ALL {
            assert_eq!(flag.as_str().parse::<ConvertFlag>().unwrap(), flag);
        }
        assert!("-monochrome".parse::<ConvertFlag>().is_err());
    }

    #[test]
    fn flag_serialises_as_flag_text() {
        let json = serde_json::to_string(&ConvertFlag::StripProfile).unwrap();
        assert_eq!(json, "\"+profile\"");
    }

    #[test]
    fn builder_defaults() {
        let o = PdfImageOptions::builder().build().unwrap();
        assert_eq!(o.extension, "png");
        assert_eq!(o.tool, ToolFamily::ImageMagick);
        assert!(!o.combined_image);
        assert!(o.base_name.is_none());
        assert!(o.output_directory.is_none());
        assert!(o.concurrency.is_none());
        assert!(o.convert_options.is_empty());
    }

    #[test]
    fn default_struct_falls_back_to_png() {
        let o = PdfImageOptions::default();
        assert_eq!(o.effective_extension(), "png");
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert!(PdfImageOptions::builder().extension("").build().is_err());
        assert!(PdfImageOptions::builder().extension(".png").build().is_err());
        assert!(PdfImageOptions::builder().base_name("a/b").build().is_err());
        assert!(PdfImageOptions::builder().base_name("").build().is_err());
        assert!(PdfImageOptions::builder().concurrency(0).build().is_err());
        assert!(PdfImageOptions::builder().process_timeout_secs(0).build().is_err());
    }

    #[test]
    fn graphics_magick_toggle() {
        let o = PdfImageOptions::builder().graphics_magick(true).build().unwrap();
        assert_eq!(o.tool, ToolFamily::GraphicsMagick);
    }
}
