//! Error types shared across the loader and the rule engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// One file failed to parse or validate. Recorded in the model; the batch continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{path}: {message}")]
pub struct DocumentParseError {
    pub path: String,
    pub message: String,
}

impl DocumentParseError {
    pub fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// A rule entry or manifest could not be loaded or instantiated.
#[derive(Debug, Error)]
pub enum RuleDiscoveryError {
    #[error("reading rule directory {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("reading rule manifest {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {path:?}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("invalid rule {rule:?}: {message}")]
    InvalidRule { rule: String, message: String },

    #[error("instantiating rule {rule:?}: {message}")]
    Instantiate { rule: String, message: String },
}

/// A rule failed during `analyze`.
#[derive(Debug, Error)]
pub enum RuleExecutionError {
    #[error("rule {rule:?} failed: {source:#}")]
    Failed {
        rule: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("rule {rule:?} panicked: {message}")]
    Panicked { rule: String, message: String },
}

/// Custom settings a rule could not accept.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown setting {key:?}")]
    UnknownKey { key: String },

    #[error("setting {key:?}: {message}")]
    InvalidValue { key: String, message: String },
}

impl SettingsError {
    pub fn invalid(key: &str, message: impl Into<String>) -> Self {
        SettingsError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// The configuration container itself is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rule configuration must be a map, found {found}")]
    NotAMap { found: &'static str },

    #[error("reading configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Render a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
