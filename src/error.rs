//! Error types for the edgequake-pdf2img library.
//!
//! Every failure is fatal to the call that produced it and nothing is
//! retried internally:
//!
//! * [`Pdf2ImgError`] — returned from every public operation. Each variant
//!   carries the file or page it concerns and, where an external tool was
//!   involved, the [`ProcessError`] with the exact command line and the
//!   captured output.
//!
//! * [`ProcessError`] — returned by a [`crate::pipeline::runner::CommandRunner`]
//!   when a tool could not be spawned, was killed, timed out, or exited with a
//!   nonzero status. A nonzero exit is an expected outcome, not a bug, so it is
//!   a plain value rather than a panic.
//!
//! * [`PageCountError`] — why the probe output did not yield a page count.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdf2img library.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Probe errors ──────────────────────────────────────────────────────
    /// `pdfinfo` could not be run or exited with an error.
    #[error("Failed to read PDF information for '{path}': {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: ProcessError,
    },

    /// The probe succeeded but its output has no usable page count.
    #[error("Invalid PDF information for '{path}': {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: PageCountError,
    },

    // ── Filesystem errors ─────────────────────────────────────────────────
    /// Stat failed for a reason other than "not found".
    #[error("Failed to stat '{path}': {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// Rasterising a single page failed.
    #[error("Failed to convert page {page} to image: {source}")]
    Conversion {
        page: usize,
        #[source]
        source: ProcessError,
    },

    /// Stacking the per-page images into one failed. Inputs are left on disk.
    #[error("Failed to combine images into '{output}': {source}")]
    Combine {
        output: PathBuf,
        #[source]
        source: ProcessError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2ImgError {
    /// The failed process, for variants that wrap one.
    pub fn process_error(&self) -> Option<&ProcessError> {
        match self {
            Pdf2ImgError::Probe { source, .. }
            | Pdf2ImgError::Conversion { source, .. }
            | Pdf2ImgError::Combine { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// How an external process ended when it did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitInfo {
    /// The process exited with a nonzero status code.
    Exited(i32),
    /// The process was terminated by a signal.
    Terminated,
    /// The process could not be started at all (binary missing, permissions).
    SpawnFailed(String),
    /// The process outlived the configured timeout and was killed.
    TimedOut { secs: u64 },
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitInfo::Exited(code) => write!(f, "exit code {code}"),
            ExitInfo::Terminated => f.write_str("terminated by signal"),
            ExitInfo::SpawnFailed(reason) => write!(f, "failed to spawn: {reason}"),
            ExitInfo::TimedOut { secs } => write!(f, "timed out after {secs}s"),
        }
    }
}

/// A failed external command together with everything it printed.
#[derive(Debug, Clone, Error)]
#[error("`{}` failed ({}){}", .command, .exit, stderr_suffix(.stderr))]
pub struct ProcessError {
    /// Display form of the command, as it would be typed in a shell.
    pub command: String,
    pub exit: ExitInfo,
    pub stdout: String,
    pub stderr: String,
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Why no page count could be read from the probe output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageCountError {
    #[error("no 'Pages' entry in pdfinfo output")]
    Missing,

    #[error("'Pages' value {0:?} is not a page count")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(exit: ExitInfo, stderr: &str) -> ProcessError {
        ProcessError {
            command: "convert \"a.pdf[2]\" \"a-2.png\"".into(),
            exit,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    #[test]
    fn process_error_display_includes_command_and_stderr() {
        let e = failed(ExitInfo::Exited(1), "convert: no images defined\n");
        let msg = e.to_string();
        assert!(msg.contains("convert \"a.pdf[2]\""), "got: {msg}");
        assert!(msg.contains("exit code 1"), "got: {msg}");
        assert!(msg.ends_with("no images defined"), "got: {msg}");
    }

    #[test]
    fn process_error_display_without_stderr() {
        let e = failed(ExitInfo::TimedOut { secs: 30 }, "  ");
        assert!(e.to_string().ends_with("(timed out after 30s)"));
    }

    #[test]
    fn conversion_display_names_page() {
        let e = Pdf2ImgError::Conversion {
            page: 2,
            source: failed(ExitInfo::Terminated, ""),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 2"), "got: {msg}");
        assert!(msg.contains("terminated by signal"), "got: {msg}");
        assert!(e.process_error().is_some());
    }

    #[test]
    fn metadata_display() {
        let e = Pdf2ImgError::Metadata {
            path: PathBuf::from("doc.pdf"),
            source: PageCountError::Invalid("many".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("doc.pdf"));
        assert!(msg.contains("\"many\""));
        assert!(e.process_error().is_none());
    }
}
