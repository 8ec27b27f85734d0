//! Entry path parsing.
//!
//! Turns a discovered entry file such as `src/pages/shop/cart/main.ts` into
//! the page it defines: the page name (`shop/cart`), the output directory
//! the page's HTML lands under, and whether the active filter keeps it.

use crate::filter::FilterSet;
use serde::Serialize;
use tracing::trace;

/// A discovered entry file with its derived page information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEntry {
    /// Entry file path as discovered, relative to the project root.
    pub file: String,

    /// Directories between the scan root and the entry file, `/`-joined.
    pub page_name: String,

    /// Output directory prefix for the generated HTML file.
    pub output_path: String,

    /// Whether the active filter keeps this page.
    pub include: bool,
}

impl ParsedEntry {
    /// Returns the generated HTML filename for this entry.
    #[must_use]
    pub fn filename(&self) -> String {
        output_filename(&self.page_name, &self.output_path)
    }
}

/// Parses raw entry paths relative to a scan root.
#[derive(Debug, Clone)]
pub struct EntryParser {
    scan_dir: String,
    scan_depth: usize,
    output_path: String,
}

impl EntryParser {
    /// Creates a parser for entries under `scan_dir` (e.g. `src/pages`).
    #[must_use]
    pub fn new(scan_dir: &str) -> Self {
        let segments: Vec<&str> = split_segments(scan_dir).collect();
        let scan_dir = segments.join("/");
        // The top-level source directory (`src`) is not part of the output
        // layout; everything below it is.
        let output_path = segments.iter().skip(1).copied().collect::<Vec<_>>().join("/");

        Self {
            scan_depth: segments.len(),
            scan_dir,
            output_path,
        }
    }

    /// Returns the normalized scan root.
    #[must_use]
    pub fn scan_dir(&self) -> &str {
        &self.scan_dir
    }

    /// Parses one raw path and applies the filter.
    ///
    /// Paths with no directory between the scan root and the file name yield
    /// an empty page name rather than an error.
    #[must_use]
    pub fn parse(&self, raw: &str, filters: &FilterSet) -> ParsedEntry {
        let page_name = self.page_name(raw);
        let include = filters.includes(&page_name);

        trace!(file = raw, page = %page_name, include, "Parsed entry");

        ParsedEntry {
            file: raw.to_string(),
            page_name,
            output_path: self.output_path.clone(),
            include,
        }
    }

    fn page_name(&self, raw: &str) -> String {
        let relative: Vec<&str> = match self.relative_to_scan_dir(raw) {
            Some(rest) => split_segments(rest).collect(),
            None => split_segments(raw).skip(self.scan_depth).collect(),
        };

        match relative.split_last() {
            Some((_file, dirs)) => dirs.join("/"),
            None => String::new(),
        }
    }

    fn relative_to_scan_dir<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let raw = raw.trim_start_matches("./");
        if self.scan_dir.is_empty() {
            return Some(raw);
        }
        raw.strip_prefix(self.scan_dir.as_str())?.strip_prefix('/')
    }
}

/// Builds the generated HTML filename for a page.
///
/// `output_path` (when non-empty) is joined in front of `page_name`, and a
/// single leading `pages/` segment is stripped from the result.
#[must_use]
pub fn output_filename(page_name: &str, output_path: &str) -> String {
    let filename = if output_path.is_empty() {
        format!("{page_name}.html")
    } else {
        format!("{output_path}/{page_name}.html")
    };

    match filename.strip_prefix("pages/") {
        Some(stripped) => stripped.to_string(),
        None => filename,
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty() && *segment != ".")
}
