//! Page filtering.
//!
//! Narrows a full-site build down to a few pages. The filter comes from
//! three named argument sources (`--entry`, `--file`, `--page`, first
//! non-empty wins) plus the project's `defaultEntries`, which only applies
//! when one of the argument sources is set.

use serde::Serialize;
use std::collections::BTreeSet;

/// Filter overrides supplied by the caller, usually from the command line.
///
/// The library never reads process arguments itself; callers build this
/// value and pass it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgSources {
    /// Highest priority source (`--entry`).
    pub entry: Option<String>,
    /// Second source (`--file`).
    pub file: Option<String>,
    /// Lowest priority source (`--page`).
    pub page: Option<String>,
}

impl ArgSources {
    /// Creates an empty set of sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `entry` source.
    #[must_use]
    pub fn entry(mut self, value: impl Into<String>) -> Self {
        self.entry = Some(value.into());
        self
    }

    /// Sets the `file` source.
    #[must_use]
    pub fn file(mut self, value: impl Into<String>) -> Self {
        self.file = Some(value.into());
        self
    }

    /// Sets the `page` source.
    #[must_use]
    pub fn page(mut self, value: impl Into<String>) -> Self {
        self.page = Some(value.into());
        self
    }

    /// Returns the first non-empty source, or `""` when none is set.
    #[must_use]
    pub fn effective(&self) -> &str {
        [&self.entry, &self.file, &self.page]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|value| !value.is_empty())
            .unwrap_or("")
    }
}

/// Active set of page names. Empty means every page is included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    names: BTreeSet<String>,
}

impl FilterSet {
    /// Resolves the filter from the argument sources and `default_entries`.
    ///
    /// Both strings are comma-separated. `default_entries` is ignored when no
    /// argument source is set, so a bare build always includes every page.
    #[must_use]
    pub fn resolve(args: &ArgSources, default_entries: &str) -> Self {
        let effective = args.effective();
        let default_entries = if effective.is_empty() {
            ""
        } else {
            default_entries
        };

        let names = effective
            .split(',')
            .chain(default_entries.split(','))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Self { names }
    }

    /// Creates a filter from an explicit list of names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .filter(|name: &String| !name.is_empty())
                .collect(),
        }
    }

    /// Returns true if no filter is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the number of page names in the filter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if a page with this name should be built.
    ///
    /// Membership is literal; no prefix or glob matching.
    #[must_use]
    pub fn includes(&self, page_name: &str) -> bool {
        self.names.is_empty() || self.names.contains(page_name)
    }

    /// Iterates the filter's page names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
