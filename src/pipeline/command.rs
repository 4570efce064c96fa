//! Command construction for `pdfinfo`, `convert`, and `gm convert`.
//!
//! Commands are argument vectors, spawned without a shell, so paths with
//! spaces or shell metacharacters reach the tool untouched. The `Display`
//! form is the equivalent shell command line (paths in double quotes) and is
//! what logs and errors show.

use crate::config::{ConvertOptions, ToolFamily};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

/// Metadata probe binary.
pub const PROBE_BINARY: &str = "pdfinfo";

/// Flag that stacks the input images top to bottom.
pub const APPEND_FLAG: &str = "-append";

/// One argument of a [`ToolCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandArg {
    /// Sub-command, flag, or option value. Shown as-is.
    Token(String),
    /// A file path (or page selector). Shown in double quotes.
    Path(OsString),
}

impl CommandArg {
    pub fn as_os_str(&self) -> &OsStr {
        match self {
            CommandArg::Token(t) => OsStr::new(t),
            CommandArg::Path(p) => p,
        }
    }
}

/// A program and its arguments, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<CommandArg>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Start a `convert` invocation for the given tool family.
    pub fn convert(tool: ToolFamily) -> Self {
        match tool {
            ToolFamily::ImageMagick => Self::new("convert"),
            ToolFamily::GraphicsMagick => Self::new("gm").token("convert"),
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.args.push(CommandArg::Token(token.into()));
        self
    }

    pub fn path(mut self, path: impl Into<OsString>) -> Self {
        self.args.push(CommandArg::Path(path.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[CommandArg] {
        &self.args
    }

    /// Arguments as passed to the OS.
    pub fn argv(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(CommandArg::as_os_str)
    }

    /// The last path argument; for conversions this is the output image.
    pub fn output_path(&self) -> Option<&Path> {
        self.args.iter().rev().find_map(|a| match a {
            CommandArg::Path(p) => Some(Path::new(p)),
            CommandArg::Token(_) => None,
        })
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            match arg {
                CommandArg::Token(t) => write!(f, " {}", t)?,
                CommandArg::Path(p) => write!(f, " \"{}\"", p.to_string_lossy())?,
            }
        }
        Ok(())
    }
}

/// `pdfinfo "<pdf>"`
pub fn probe_command(pdf_path: &Path) -> ToolCommand {
    ToolCommand::new(PROBE_BINARY).path(pdf_path)
}

/// `convert <options> "<pdf>[<page>]" "<output>"`
///
/// Options come first, in flag order; each value is a separate argument.
pub fn page_convert_command(
    tool: ToolFamily,
    pdf_path: &Path,
    page: usize,
    options: &ConvertOptions,
    output_path: &Path,
) -> ToolCommand {
    let mut cmd = ToolCommand::convert(tool);
    for (flag, value) in options.iter() {
        cmd = cmd.token(flag.as_str());
        if let Some(v) = value {
            cmd = cmd.token(v);
        }
    }

    cmd.path(page_selector(pdf_path, page)).path(output_path)
}

/// `convert -append "<img0>" "<img1>" … "<output>"`
///
/// Images are stacked in the order given.
pub fn combine_command(
    tool: ToolFamily,
    image_paths: &[impl AsRef<Path>],
    output_path: &Path,
) -> ToolCommand {
    let mut cmd = ToolCommand::convert(tool).token(APPEND_FLAG);
    for path in image_paths {
        cmd = cmd.path(path.as_ref());
    }
    cmd.path(output_path)
}

/// `<pdf>[<page>]`, the zero-based page selector both toolkits accept.
fn page_selector(pdf_path: &Path, page: usize) -> OsString {
    let mut selector = pdf_path.as_os_str().to_os_string();
    selector.push(format!("[{}]", page));
    selector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertFlag;
    use std::path::PathBuf;

    fn options() -> ConvertOptions {
        let mut o = ConvertOptions::new();
        o.set(ConvertFlag::Quality, "100").set(ConvertFlag::Density, "300");
        o
    }

    #[test]
    fn probe_command_quotes_path() {
        let cmd = probe_command(Path::new("/docs/annual report.pdf"));
        assert_eq!(cmd.to_string(), "pdfinfo \"/docs/annual report.pdf\"");
        let argv: Vec<&OsStr> = cmd.argv().collect();
        assert_eq!(argv, vec![OsStr::new("/docs/annual report.pdf")]);
    }

    #[test]
    fn page_command_with_options() {
        let cmd = page_convert_command(
            ToolFamily::ImageMagick,
            Path::new("/d/a.pdf"),
            4,
            &options(),
            Path::new("/d/a-4.png"),
        );
        assert_eq!(
            cmd.to_string(),
            "convert -density 300 -quality 100 \"/d/a.pdf[4]\" \"/d/a-4.png\""
        );
        assert_eq!(cmd.program(), "convert");
        assert_eq!(cmd.output_path(), Some(Path::new("/d/a-4.png")));
    }

    #[test]
    fn page_command_without_options() {
        let cmd = page_convert_command(
            ToolFamily::ImageMagick,
            Path::new("a.pdf"),
            0,
            &ConvertOptions::new(),
            Path::new("a-0.png"),
        );
        assert_eq!(cmd.to_string(), "convert \"a.pdf[0]\" \"a-0.png\"");
    }

    #[test]
    fn page_command_graphics_magick() {
        let mut o = ConvertOptions::new();
        o.set_flag(ConvertFlag::Strip);
        let cmd = page_convert_command(
            ToolFamily::GraphicsMagick,
            Path::new("a.pdf"),
            1,
            &o,
            Path::new("a-1.png"),
        );
        assert_eq!(cmd.to_string(), "gm convert -strip \"a.pdf[1]\" \"a-1.png\"");
        let argv: Vec<&OsStr> = cmd.argv().collect();
        assert_eq!(argv[0], OsStr::new("convert"));
        assert_eq!(cmd.program(), "gm");
    }

    #[test]
    fn option_value_is_one_argument() {
        let mut o = ConvertOptions::new();
        o.set(ConvertFlag::Background, "rgb(255, 255, 255)");
        let cmd = page_convert_command(
            ToolFamily::ImageMagick,
            Path::new("a.pdf"),
            0,
            &o,
            Path::new("a-0.png"),
        );
        let argv: Vec<&OsStr> = cmd.argv().collect();
        assert_eq!(argv[1], OsStr::new("rgb(255, 255, 255)"));
        assert_eq!(argv.len(), 4);
    }

    #[test]
    fn combine_command_quotes_every_path() {
        let inputs = vec![PathBuf::from("/o/my doc-0.png"), PathBuf::from("/o/my doc-1.png")];
        let cmd = combine_command(ToolFamily::ImageMagick, &inputs, Path::new("/o/my doc.png"));
        assert_eq!(
            cmd.to_string(),
            "convert -append \"/o/my doc-0.png\" \"/o/my doc-1.png\" \"/o/my doc.png\""
        );
        let argv: Vec<&OsStr> = cmd.argv().collect();
        assert_eq!(argv.len(), 4);
        assert_eq!(argv[1], OsStr::new("/o/my doc-0.png"));
    }

    #[test]
    fn combine_command_graphics_magick() {
        let cmd = combine_command(ToolFamily::GraphicsMagick, &["a-0.png"], Path::new("a.png"));
        assert_eq!(cmd.to_string(), "gm convert -append \"a-0.png\" \"a.png\"");
    }
}
