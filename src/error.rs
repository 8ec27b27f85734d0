use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the mpa-pages library.
///
/// Missing scan directories, unknown filter names and duplicate page names
/// are not errors; they degrade to empty or overwritten results.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// Scan glob could not be compiled.
    #[error("Invalid scan glob '{glob}': {message}")]
    InvalidGlob {
        /// The glob as written
        glob: String,
        /// Error message
        message: String,
    },

    /// Rewrite pattern could not be compiled.
    #[error("Invalid rewrite pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The invalid pattern
        pattern: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// Config file could not be parsed.
    #[error("Failed to parse config file '{path}': {message}")]
    ConfigFile {
        /// Config file path
        path: PathBuf,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid glob error.
    #[must_use]
    pub fn invalid_glob(glob: impl Into<String>, source: &globset::Error) -> Self {
        Self::InvalidGlob {
            glob: glob.into(),
            message: source.to_string(),
        }
    }

    /// Creates an invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Creates a config file parse error.
    #[must_use]
    pub fn config_file(path: impl Into<PathBuf>, source: &toml::de::Error) -> Self {
        Self::ConfigFile {
            path: path.into(),
            message: source.message().to_string(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::InvalidGlob { .. }
                | Self::InvalidPattern { .. }
                | Self::ConfigFile { .. }
        )
    }
}
