//! HUD-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the crate.
pub type Result<T> = std::result::Result<T, HudError>;

/// Top-level error type for the chat HUD.
///
/// An empty history is deliberately *not* represented here: navigating or
/// deleting with no entries is a no-op, not a failure.
#[derive(Debug, Error)]
pub enum HudError {
    #[error("[HUD-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[HUD-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[HUD-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[HUD-1101] settings failure for key {key:?}: {details}")]
    Settings { key: String, details: String },

    #[error("[HUD-2001] resolution failure for event {id:?}: {details}")]
    Resolution { id: String, details: String },

    #[error("[HUD-2101] deletion rejected for event {id:?}: {details}")]
    Deletion { id: String, details: String },

    #[error("[HUD-2201] transport failure: {details}")]
    Transport { details: String },

    #[error("[HUD-2301] roll evaluation failure for {formula:?}: {details}")]
    Evaluation { formula: String, details: String },

    #[error("[HUD-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[HUD-3101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },
}

impl HudError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "HUD-1001",
            Self::MissingConfig { .. } => "HUD-1002",
            Self::ConfigParse { .. } => "HUD-1003",
            Self::Settings { .. } => "HUD-1101",
            Self::Resolution { .. } => "HUD-2001",
            Self::Deletion { .. } => "HUD-2101",
            Self::Transport { .. } => "HUD-2201",
            Self::Evaluation { .. } => "HUD-2301",
            Self::Io { .. } => "HUD-3001",
            Self::Serialization { .. } => "HUD-3101",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Resolution { .. } | Self::Transport { .. } | Self::Io { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for resolution failures.
    #[must_use]
    pub fn resolution(id: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Resolution {
            id: id.into(),
            details: details.into(),
        }
    }

    /// Convenience constructor for rejected deletions.
    #[must_use]
    pub fn deletion(id: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Deletion {
            id: id.into(),
            details: details.into(),
        }
    }

    /// Convenience constructor for settings failures.
    #[must_use]
    pub fn settings(key: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Settings {
            key: key.into(),
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for HudError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for HudError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
