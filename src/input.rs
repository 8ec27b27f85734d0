//! Bundler input mapping.
//!
//! Each page's bundler entry is its HTML template, which sits next to the
//! discovered script: `src/pages/home/main.ts` builds from
//! `src/pages/home/index.html`.

use crate::catalog::PageCatalog;
use crate::error::{Error, Result};
use crate::scanner::compile_glob;
use globset::GlobMatcher;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Replaces an entry script's file name with the HTML template filename.
#[derive(Debug, Clone)]
pub struct EntryTemplate {
    stem: GlobMatcher,
    filename: String,
}

impl EntryTemplate {
    /// Creates a template from the scan file pattern and template filename.
    ///
    /// Only the part of `scan_file` before its first `.` is used, so
    /// `main.{js,ts}` replaces any `main.*` file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the stem is not a valid glob.
    pub fn new(scan_file: &str, filename: &str) -> Result<Self> {
        let stem = scan_file.split('.').next().unwrap_or_default();
        Ok(Self {
            stem: compile_glob(stem)?,
            filename: filename.to_string(),
        })
    }

    /// Returns `entry` with its file name swapped for the template filename.
    ///
    /// Entries whose file name does not start with the stem are returned
    /// unchanged.
    #[must_use]
    pub fn apply(&self, entry: &str) -> String {
        let (dir, file) = match entry.rsplit_once('/') {
            Some((dir, file)) => (Some(dir), file),
            None => (None, entry),
        };

        let matches = file
            .split_once('.')
            .is_some_and(|(stem, _)| self.stem.is_match(stem));
        if !matches {
            trace!("Entry {} does not match the scan file stem", entry);
            return entry.to_string();
        }

        match dir {
            Some(dir) => format!("{dir}/{}", self.filename),
            None => self.filename.clone(),
        }
    }
}

/// Page name to absolute HTML entry path, as handed to the bundler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildInput {
    entries: BTreeMap<String, PathBuf>,
}

impl BuildInput {
    /// Maps every catalog page to its absolute template path under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be made absolute.
    pub fn from_catalog(
        catalog: &PageCatalog,
        root: &Path,
        template: &EntryTemplate,
    ) -> Result<Self> {
        let root = std::path::absolute(root).map_err(|e| Error::io(root, e))?;

        let entries: BTreeMap<String, PathBuf> = catalog
            .iter()
            .map(|(name, page)| {
                let path = normalize(&root.join(template.apply(&page.entry)));
                (name.to_string(), path)
            })
            .collect();

        debug!("Mapped {} build inputs", entries.len());
        Ok(Self { entries })
    }

    /// Returns the absolute path for a page.
    #[must_use]
    pub fn get(&self, page: &str) -> Option<&Path> {
        self.entries.get(page).map(PathBuf::as_path)
    }

    /// Returns the number of inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no inputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates inputs in page-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    /// Returns the URL of the first page, `/<page>/index.html`, under the
    /// base URL when one is given.
    ///
    /// `base` is used as stored in [`MpaConfig::base`](crate::MpaConfig),
    /// already stripped of its outer slashes, so the URL agrees with the
    /// rewrite targets.
    #[must_use]
    pub fn first_page(&self, base: Option<&str>) -> Option<String> {
        let name = self.entries.keys().next()?;
        Some(match base.filter(|base| !base.is_empty()) {
            Some(base) => format!("/{base}/{name}/index.html"),
            None => format!("/{name}/index.html"),
        })
    }
}

/// Lexically resolves `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
