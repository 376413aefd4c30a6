//! Error types for the rendering pipeline
//!
//! None of these ever escape the feed as a crash:
//! - [`LoadError`]: a renderer loader failed; the event gets the fallback
//! - [`RenderError`]: a renderer rejected or choked on valid data; same
//! - [`ConfigError`]: invalid configuration, surfaced before a feed starts
//!
//! An unknown event type is not an error at all; it resolves straight to the
//! fallback renderer.

use std::path::PathBuf;

/// A renderer loader failed to produce a renderer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The renderer module is not available in this build
    #[error("renderer unavailable for '{0}'")]
    Unavailable(String),

    /// The loader rejected with a message
    #[error("loader for '{type_key}' rejected: {message}")]
    Rejected {
        /// Event type being loaded
        type_key: String,
        /// Loader-provided reason
        message: String,
    },

    /// The loader panicked
    #[error("loader for '{0}' panicked")]
    Panicked(String),
}

impl LoadError {
    /// Create rejected error for a type
    pub fn rejected(type_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            type_key: type_key.into(),
            message: message.into(),
        }
    }
}

/// A renderer could not render an event
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// A required payload field is absent
    #[error("missing field: {0}")]
    MissingField(String),

    /// A payload field has the wrong shape
    #[error("invalid field '{field}': {message}")]
    InvalidField {
        /// Offending field
        field: String,
        /// What was wrong
        message: String,
    },

    /// Synthesis text had no recognizable structure
    #[error("synthesis has no recognizable structure")]
    UnstructuredSynthesis,

    /// The renderer panicked
    #[error("renderer panicked: {0}")]
    Panicked(String),
}

impl RenderError {
    /// Create invalid field error
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Invalid or unreadable configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A value is out of range
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// What was wrong
        message: String,
    },

    /// TOML could not be parsed
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// IO error reading a config file
    #[error("io error reading {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Combined feed error
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Loader failure
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Render failure
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration failure
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Event could not be decoded
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] serde_json::Error),
}

/// Result type alias for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
