use crate::error::{Error, Result};
use crate::rewrite::RewriteRule;
use crate::scanner::{compile_glob, entry_glob};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_SCAN_DIR: &str = "src/pages";
const DEFAULT_SCAN_FILE: &str = "main.{js,ts,jsx,tsx}";
const DEFAULT_FILENAME: &str = "index.html";

/// Default config file name looked up in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "mpa.toml";

/// Configuration for page discovery and rewrite generation.
///
/// Use [`MpaConfig::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct MpaConfig {
    /// Project root; entry paths are reported relative to it
    pub root: PathBuf,

    /// Directory scanned for entry files, relative to `root`, no trailing `/`
    pub scan_dir: String,

    /// Glob matching entry file names (supports `{a,b}` alternation)
    pub scan_file: String,

    /// HTML template filename that replaces the entry file name
    pub filename: String,

    /// Comma-separated page names added to any command-line filter
    pub default_entries: String,

    /// Base URL without leading or trailing `/`
    pub base: Option<String>,

    /// Seed rewrite rules, emitted ahead of generated ones
    pub rewrites: Vec<RewriteRule>,

    /// Dev-server open path; defaults to the first page
    pub open: Option<String>,

    /// Honor `.gitignore` files while scanning
    pub respect_gitignore: bool,
}

impl MpaConfig {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpa_pages::MpaConfig;
    ///
    /// let config = MpaConfig::builder()
    ///     .scan_dir("src/views")
    ///     .base("/app/")
    ///     .build()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.base.as_deref(), Some("app"));
    /// ```
    #[must_use]
    pub fn builder() -> MpaConfigBuilder {
        MpaConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The scan file pattern is empty or the entry glob does not compile
    /// - The filename template is empty or contains a `/`
    pub fn validate(&self) -> Result<()> {
        if self.scan_file.is_empty() {
            return Err(Error::config("scan_file must not be empty"));
        }

        compile_glob(&entry_glob(&self.scan_dir, &self.scan_file))?;

        if self.filename.is_empty() {
            return Err(Error::config("filename must not be empty"));
        }

        if self.filename.contains('/') {
            return Err(Error::config(format!(
                "filename must be a bare file name, got '{}'",
                self.filename
            )));
        }

        Ok(())
    }

    /// Returns the URL prefix for rewrite targets: `/<base>/` or `./`.
    #[must_use]
    pub fn target_prefix(&self) -> String {
        match &self.base {
            Some(base) => format!("/{base}/"),
            None => "./".to_string(),
        }
    }
}

impl Default for MpaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            scan_dir: DEFAULT_SCAN_DIR.to_string(),
            scan_file: DEFAULT_SCAN_FILE.to_string(),
            filename: DEFAULT_FILENAME.to_string(),
            default_entries: String::new(),
            base: None,
            rewrites: Vec::new(),
            open: None,
            respect_gitignore: false,
        }
    }
}

/// A seed rewrite rule as written in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedRewrite {
    /// Regular expression matched against the request path
    pub from: String,
    /// Path served when `from` matches
    pub to: String,
}

/// Options read from an `mpa.toml` file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    /// Scan directory
    pub scan_dir: Option<String>,
    /// Entry file glob
    pub scan_file: Option<String>,
    /// HTML template filename
    pub filename: Option<String>,
    /// Comma-separated default page filter
    pub default_entries: Option<String>,
    /// Base URL
    pub base: Option<String>,
    /// Dev-server open path
    pub open: Option<String>,
    /// Honor `.gitignore` while scanning
    pub respect_gitignore: Option<bool>,
    /// Seed rewrite rules
    pub rewrites: Vec<SeedRewrite>,
}

impl FileConfig {
    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content).map_err(|e| Error::config_file(path, &e))
    }

    /// Parses TOML config content.
    ///
    /// # Errors
    ///
    /// Returns the TOML error on invalid content or unknown keys.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Builder for creating an [`MpaConfig`].
#[derive(Debug, Default)]
pub struct MpaConfigBuilder {
    root: Option<PathBuf>,
    scan_dir: Option<String>,
    scan_file: Option<String>,
    filename: Option<String>,
    default_entries: Option<String>,
    base: Option<String>,
    rewrites: Vec<SeedRewrite>,
    open: Option<String>,
    respect_gitignore: Option<bool>,
}

impl MpaConfigBuilder {
    /// Sets the project root.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the directory scanned for entries, relative to the root.
    #[must_use]
    pub fn scan_dir(mut self, dir: impl Into<String>) -> Self {
        self.scan_dir = Some(dir.into());
        self
    }

    /// Sets the entry file glob, e.g. `main.{js,ts}`.
    #[must_use]
    pub fn scan_file(mut self, pattern: impl Into<String>) -> Self {
        self.scan_file = Some(pattern.into());
        self
    }

    /// Sets the HTML template filename.
    #[must_use]
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the comma-separated default page filter.
    #[must_use]
    pub fn default_entries(mut self, entries: impl Into<String>) -> Self {
        self.default_entries = Some(entries.into());
        self
    }

    /// Sets the base URL. Leading and trailing `/` are stripped.
    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Appends a seed rewrite rule. `from` is a regular expression.
    #[must_use]
    pub fn rewrite(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rewrites.push(SeedRewrite {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Sets the dev-server open path.
    #[must_use]
    pub fn open(mut self, path: impl Into<String>) -> Self {
        self.open = Some(path.into());
        self
    }

    /// Enables or disables `.gitignore` handling during scans.
    #[must_use]
    pub fn respect_gitignore(mut self, enabled: bool) -> Self {
        self.respect_gitignore = Some(enabled);
        self
    }

    /// Fills every option not already set from a config file.
    ///
    /// File rewrites are placed ahead of rewrites added on the builder.
    #[must_use]
    pub fn merge_file(mut self, file: FileConfig) -> Self {
        self.scan_dir = self.scan_dir.or(file.scan_dir);
        self.scan_file = self.scan_file.or(file.scan_file);
        self.filename = self.filename.or(file.filename);
        self.default_entries = self.default_entries.or(file.default_entries);
        self.base = self.base.or(file.base);
        self.open = self.open.or(file.open);
        self.respect_gitignore = self.respect_gitignore.or(file.respect_gitignore);

        let mut rewrites = file.rewrites;
        rewrites.append(&mut self.rewrites);
        self.rewrites = rewrites;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or a seed rewrite is not a
    /// valid regular expression.
    pub fn build(self) -> Result<MpaConfig> {
        let rewrites = self
            .rewrites
            .into_iter()
            .map(|seed| RewriteRule::custom(&seed.from, seed.to))
            .collect::<Result<Vec<_>>>()?;

        let config = MpaConfig {
            root: self.root.unwrap_or_else(|| PathBuf::from(".")),
            scan_dir: normalize_scan_dir(
                self.scan_dir.as_deref().unwrap_or(DEFAULT_SCAN_DIR),
            ),
            scan_file: self
                .scan_file
                .unwrap_or_else(|| DEFAULT_SCAN_FILE.to_string()),
            filename: self
                .filename
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            default_entries: self.default_entries.unwrap_or_default(),
            base: self.base.as_deref().and_then(normalize_base),
            rewrites,
            open: self.open.filter(|open| !open.is_empty()),
            respect_gitignore: self.respect_gitignore.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Strips one leading and one trailing `/`. An empty result means no base.
#[must_use]
pub fn normalize_base(base: &str) -> Option<String> {
    let base = base.strip_prefix('/').unwrap_or(base);
    let base = base.strip_suffix('/').unwrap_or(base);
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

fn normalize_scan_dir(dir: &str) -> String {
    let dir = dir.trim_start_matches("./");
    dir.trim_end_matches('/').to_string()
}
