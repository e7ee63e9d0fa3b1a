//! # Dissolve Error Types
//!
//! Errors only exist on the configuration-loading surface. The per-frame
//! path clamps instead of failing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading effect configuration.
#[derive(Error, Debug)]
pub enum DissolveError {
    /// Configuration file could not be read.
    #[error("failed to read configuration {}: {source}", path.display())]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML for `DissolveConfig`.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Edge color string is neither hex nor a known color name.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),
}

/// Result type for configuration operations.
pub type DissolveResult<T> = Result<T, DissolveError>;
