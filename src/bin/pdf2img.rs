//! CLI binary for edgequake-pdf2img.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `PdfImageOptions` and prints the produced image paths.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2img::{
    ConversionProgressCallback, ConvertFlag, PdfImage, PdfImageOptions, ProgressCallback,
    ToolFamily,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar. Pages finish out of order, so each line names its page.
struct CliProgressCallback {
    bar: ProgressBar,
    reused: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading PDF information…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            reused: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
    }

    fn on_page_complete(&self, page: usize, total_pages: usize, path: &Path, reused: bool) {
        if reused {
            self.reused.fetch_add(1, Ordering::SeqCst);
        }
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}{}",
            green("✓"),
            page + 1,
            total_pages,
            dim(&path.display().to_string()),
            if reused { dim("  (up to date)") } else { String::new() },
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page: usize, total_pages: usize, error: &str) {
        let msg = match error.char_indices().nth(100) {
            Some((i, _)) => format!("{}\u{2026}", &error[..i]),
            None => error.to_string(),
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page + 1,
            total_pages,
            red(&msg),
        ));
    }

    fn on_combine_complete(&self, input_count: usize, output: &Path) {
        self.bar.println(format!(
            "  {} Combined {} pages → {}",
            green("✓"),
            input_count,
            output.display()
        ));
    }

    fn on_conversion_complete(&self, total_pages: usize, _output_count: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages converted  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("({} up to date)", self.reused.load(Ordering::SeqCst))),
        );
    }
}

/// Convert PDF pages to images with ImageMagick or GraphicsMagick.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Convert PDF pages to images with ImageMagick or GraphicsMagick",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Directory for output images (default: next to the PDF).
    #[arg(short, long, env = "PDF2IMG_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Output file name stem (default: PDF file name without .pdf).
    #[arg(long)]
    base_name: Option<String>,

    /// Output image extension; selects the encoder.
    #[arg(short, long, env = "PDF2IMG_EXTENSION", default_value = "png")]
    extension: String,

    /// Use GraphicsMagick (`gm convert`) instead of ImageMagick.
    #[arg(long, env = "PDF2IMG_GM")]
    gm: bool,

    /// Stack all pages into a single image and delete the page images.
    #[arg(long)]
    combine: bool,

    /// Convert only this zero-based page.
    #[arg(long, conflicts_with = "combine")]
    page: Option<usize>,

    /// -density value, e.g. 300.
    #[arg(long)]
    density: Option<String>,

    /// -resize geometry, e.g. 1200x or 50%.
    #[arg(long)]
    resize: Option<String>,

    /// -quality value, e.g. 90.
    #[arg(long)]
    quality: Option<String>,

    /// -colorspace value, e.g. Gray.
    #[arg(long)]
    colorspace: Option<String>,

    /// -background colour, e.g. white.
    #[arg(long)]
    background: Option<String>,

    /// -alpha mode, e.g. remove.
    #[arg(long)]
    alpha: Option<String>,

    /// Pass -strip.
    #[arg(long)]
    strip: bool,

    /// Pass +profile "*".
    #[arg(long)]
    strip_profiles: bool,

    /// Maximum concurrent conversion processes (default: one per page).
    #[arg(short, long, env = "PDF2IMG_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Per-process timeout in seconds.
    #[arg(long, env = "PDF2IMG_TIMEOUT")]
    timeout: Option<u64>,

    /// Print pdfinfo metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress =
        !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only && cli.page.is_none();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let options = build_options(&cli, progress)?;
    let pdf = PdfImage::new(&cli.input, options);

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = pdf.info().await.context("Failed to inspect PDF")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize metadata")?
            );
        } else {
            for (key, value) in info.iter() {
                println!("{:<16}{}", format!("{key}:"), value);
            }
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let paths = match cli.page {
        Some(page) => vec![pdf
            .convert_page(page)
            .await
            .with_context(|| format!("Failed to convert page {page}"))?],
        None => pdf.convert_file().await.context("Conversion failed")?,
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&paths).context("Failed to serialise output")?
        );
    } else {
        for path in &paths {
            println!("{}", path.display());
        }
    }

    Ok(())
}

/// Map CLI args to `PdfImageOptions`.
fn build_options(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PdfImageOptions> {
    let mut builder = PdfImageOptions::builder()
        .extension(&cli.extension)
        .tool(if cli.gm {
            ToolFamily::GraphicsMagick
        } else {
            ToolFamily::ImageMagick
        })
        .combined_image(cli.combine);

    let valued = [
        (ConvertFlag::Density, &cli.density),
        (ConvertFlag::Resize, &cli.resize),
        (ConvertFlag::Quality, &cli.quality),
        (ConvertFlag::Colorspace, &cli.colorspace),
        (ConvertFlag::Background, &cli.background),
        (ConvertFlag::Alpha, &cli.alpha),
    ];
    for (flag, value) in valued {
        if let Some(v) = value {
            builder = builder.convert_option(flag, v);
        }
    }
    if cli.strip {
        builder = builder.convert_flag(ConvertFlag::Strip);
    }
    if cli.strip_profiles {
        builder = builder.convert_option(ConvertFlag::StripProfile, "*");
    }

    if let Some(ref name) = cli.base_name {
        builder = builder.base_name(name);
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_directory(dir);
    }
    if let Some(n) = cli.concurrency {
        builder = builder.concurrency(n);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.process_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
