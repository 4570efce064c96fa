//! Building blocks for PDF-to-image conversion.
//!
//! Each submodule does one thing and knows nothing about the others; the
//! orchestration lives in [`crate::convert`].
//!
//! ## Data Flow
//!
//! ```text
//! command ──▶ runner ──▶ metadata        (page count)
//! freshness ──▶ command ──▶ runner       (one page)
//! command ──▶ runner ──▶ cleanup         (combine)
//! ```
//!
//! 1. [`command`]   — argument vectors for `pdfinfo`, `convert`, `gm convert`
//! 2. [`runner`]    — spawn a command and capture its output
//! 3. [`metadata`]  — parse `pdfinfo` output, read the page count
//! 4. [`freshness`] — decide whether an existing image can be reused

pub mod command;
pub mod freshness;
pub mod metadata;
pub mod runner;
