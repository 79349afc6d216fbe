//! Error types for the manifest crate

use crate::invocation::InvocationError;
use declarative::ErrorCategory;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during manifest operations
#[derive(Error, Debug)]
pub enum Error {
    /// Registry lookup or catalog defect
    #[error(transparent)]
    Registry(#[from] declarative::Error),

    /// Manifest entry violates a structural invariant
    #[error("resource {index}: {message}")]
    Validation { index: usize, message: String },

    /// Reference attribute cannot be explained by manifest or live state
    #[error(
        "unresolved reference at {path}: no manifest entry or system object of type {type_tag} has ID {id}"
    )]
    UnresolvedReference {
        type_tag: String,
        path: String,
        id: String,
    },

    /// System object referenced by ID has no name to address it by
    #[error("system {type_tag} object {id} has no name")]
    UnnamedSystemObject { type_tag: String, id: String },

    /// Externally stored attribute holds a non-string value
    #[error("attribute {path} is stored in a file but is not a string")]
    ExternalValueNotString { path: String },

    /// Malformed symbolic token
    #[error(transparent)]
    Token(#[from] InvocationError),

    /// IO error with the offending path
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File extension is not one of .json, .yaml, .yml
    #[error("unsupported manifest format: {} (expected .json, .yaml or .yml)", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Failure while processing one attribute of a manifest entry
    #[error("resource {manifest_id}, attribute {path}: {source}")]
    Attribute {
        manifest_id: String,
        path: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Registry(e) => e.category(),
            Error::UnresolvedReference { .. } | Error::UnnamedSystemObject { .. } => {
                ErrorCategory::UnresolvedReference
            }
            Error::Io { .. } => ErrorCategory::Io,
            Error::Validation { .. }
            | Error::ExternalValueNotString { .. }
            | Error::Token(_)
            | Error::Json(_)
            | Error::Yaml(_)
            | Error::UnsupportedFormat(_) => ErrorCategory::Input,
            Error::Attribute { source, .. } => source.category(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap with the manifest ID and attribute path being processed.
    pub fn in_attribute(self, manifest_id: &str, path: &str) -> Self {
        Error::Attribute {
            manifest_id: manifest_id.to_string(),
            path: path.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, Error>;
