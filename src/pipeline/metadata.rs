//! Parsing of `pdfinfo` output.
//!
//! `pdfinfo` prints one `Key:   value` pair per line. Keys are everything up
//! to the first colon; values may be empty. Lines without a colon are ignored
//! and a repeated key keeps its last value.

use crate::error::PageCountError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key holding the page count.
pub const PAGES_KEY: &str = "Pages";

static INFO_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?):[ \t]*(.*)$").unwrap());

/// Key/value metadata reported by the probe tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentInfo(BTreeMap<String, String>);

impl DocumentInfo {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The `Pages` entry as a count.
    pub fn page_count(&self) -> Result<usize, PageCountError> {
        let raw = self.get(PAGES_KEY).ok_or(PageCountError::Missing)?;
        raw.trim()
            .parse::<usize>()
            .map_err(|_| PageCountError::Invalid(raw.to_string()))
    }
}

/// Parse probe output into a [`DocumentInfo`].
pub fn parse_probe_output(output: &str) -> DocumentInfo {
    let mut fields = BTreeMap::new();
    for line in output.lines() {
        if let Some((key, value)) = parse_line(line) {
            fields.insert(key.to_string(), value.to_string());
        }
    }
    DocumentInfo(fields)
}

/// Split one `key: value` line. Returns the captures directly.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let caps = INFO_LINE.captures(line)?;
    let key = caps.get(1)?.as_str();
    let value = caps.get(2).map_or("", |m| m.as_str());
    Some((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDFINFO: &str = "Title:          Quarterly report\n\
Producer:       LibreOffice 7.4\n\
CreationDate:   Tue Mar  5 10:12:44 2024 CET\n\
Tagged:         no\n\
Pages:          12\n\
Page size:      595.3 x 841.89 pts (A4)\n\
PDF version:    1.6\n\n";

    #[test]
    fn parses_simple_output() {
        let info = parse_probe_output("Pages: 3\nTitle: x\n");
        assert_eq!(info.get("Pages"), Some("3"));
        assert_eq!(info.get("Title"), Some("x"));
        assert_eq!(info.page_count(), Ok(3));
    }

    #[test]
    fn parses_real_pdfinfo_layout() {
        let info = parse_probe_output(PDFINFO);
        assert_eq!(info.len(), 7);
        assert_eq!(info.get("Page size"), Some("595.3 x 841.89 pts (A4)"));
        // Only the first colon splits; the rest stays in the value.
        assert_eq!(info.get("CreationDate"), Some("Tue Mar  5 10:12:44 2024 CET"));
        assert_eq!(info.page_count(), Ok(12));
    }

    #[test]
    fn key_with_no_value() {
        let info = parse_probe_output("Author:\nSubject:   \n");
        assert_eq!(info.get("Author"), Some(""));
        assert_eq!(info.get("Subject"), Some(""));
    }

    #[test]
    fn lines_without_colon_are_ignored() {
        let info = parse_probe_output("Syntax Warning something\n\nPages: 2\n");
        assert_eq!(info.len(), 1);
    }

    #[test]
    fn last_duplicate_wins() {
        let info = parse_probe_output("Pages: 1\nPages: 4\n");
        assert_eq!(info.page_count(), Ok(4));
    }

    #[test]
    fn tolerates_crlf() {
        let info = parse_probe_output("Pages: 5\r\nTitle: t\r\n");
        assert_eq!(info.page_count(), Ok(5));
        assert_eq!(info.get("Title"), Some("t"));
    }

    #[test]
    fn page_count_errors() {
        assert_eq!(
            parse_probe_output("Title: x\n").page_count(),
            Err(PageCountError::Missing)
        );
        assert_eq!(
            parse_probe_output("Pages: -1\n").page_count(),
            Err(PageCountError::Invalid("-1".into()))
        );
        assert_eq!(
            parse_probe_output("Pages:\n").page_count(),
            Err(PageCountError::Invalid(String::new()))
        );
    }
}
