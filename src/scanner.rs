use crate::{
    config::MpaConfig,
    error::{Error, Result},
};
use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Statistics collected during scanning.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanStats {
    /// Files visited under the scan root
    pub visited_files: usize,

    /// Files matching the entry glob
    pub matched_files: usize,

    /// Walk errors skipped
    pub errors: usize,
}

/// Discovers entry files matching `<scanDir>/**/<scanFile>`.
#[derive(Debug, Clone)]
pub(crate) struct Scanner {
    root: PathBuf,
    scan_dir: String,
    glob: String,
    matcher: GlobMatcher,
    respect_gitignore: bool,
}

impl Scanner {
    /// Creates a new scanner from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry glob does not compile.
    pub(crate) fn new(config: &MpaConfig) -> Result<Self> {
        let glob = entry_glob(&config.scan_dir, &config.scan_file);
        let matcher = compile_glob(&glob)?;

        Ok(Self {
            root: config.root.clone(),
            scan_dir: config.scan_dir.clone(),
            glob,
            matcher,
            respect_gitignore: config.respect_gitignore,
        })
    }

    /// Returns the glob the scanner matches against.
    pub(crate) fn glob(&self) -> &str {
        &self.glob
    }

    /// Scans the scan root and returns matching entry paths.
    ///
    /// Paths are relative to the project root, `/`-separated and sorted. A
    /// missing scan directory yields an empty list. Symlinked directories and
    /// entry files are followed and reported under their link path.
    pub(crate) fn scan(&self) -> (Vec<String>, ScanStats) {
        let mut stats = ScanStats::default();
        let scan_root = self.root.join(&self.scan_dir);

        if !scan_root.is_dir() {
            debug!("Scan root {} does not exist, no pages", scan_root.display());
            return (Vec::new(), stats);
        }

        debug!("Scanning {} for {}", scan_root.display(), self.glob);

        let walker = WalkBuilder::new(&scan_root)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .ignore(self.respect_gitignore)
            .parents(self.respect_gitignore)
            .require_git(false)
            .hidden(true)
            .follow_links(true)
            .build();

        let mut files = Vec::new();
        for result in walker {
            match result {
                Ok(entry) if entry.file_type().is_some_and(|ft| ft.is_file()) => {
                    stats.visited_files += 1;
                    let relative = relative_path(entry.path(), &self.root);

                    if self.matcher.is_match(&relative) {
                        trace!("Matched entry: {}", relative);
                        stats.matched_files += 1;
                        files.push(relative);
                    }
                }
                Err(e) => {
                    warn!("Walk error: {}", e);
                    stats.errors += 1;
                }
                _ => {}
            }
        }

        files.sort();

        debug!(
            "Scan complete: {} visited, {} matched, {} errors",
            stats.visited_files, stats.matched_files, stats.errors
        );

        (files, stats)
    }
}

/// Builds the entry glob, collapsing the double slash a trailing `/` on the
/// scan directory would produce.
pub(crate) fn entry_glob(scan_dir: &str, scan_file: &str) -> String {
    if scan_dir.is_empty() {
        return format!("**/{scan_file}");
    }
    format!("{scan_dir}/**/{scan_file}").replace("//", "/")
}

/// Compiles a glob where `*` does not cross `/` and `{a,b}` alternates.
pub(crate) fn compile_glob(glob: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| Error::invalid_glob(glob, &e))
}

fn relative_path(path: &Path, root: &Path) -> String {
    let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
