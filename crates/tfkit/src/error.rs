//! Error types for Terraform artifact generation

use declarative::ErrorCategory;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating configuration or state
#[derive(Error, Debug)]
pub enum Error {
    /// Registry lookup or catalog defect
    #[error(transparent)]
    Registry(#[from] declarative::Error),

    /// Malformed symbolic token
    #[error(transparent)]
    Token(#[from] manifest::InvocationError),

    /// Function name is not one of the known functions
    #[error("unknown function {0}")]
    UnknownFunction(String),

    /// Function called with the wrong number or kind of arguments
    #[error("{function} {message}")]
    Arguments {
        function: &'static str,
        message: &'static str,
    },

    /// `UC_MANIFEST_ID` names an entry that is not in the manifest
    #[error("no resource with manifest ID {0}")]
    UnknownManifestId(String),

    /// `UC_MANIFEST_ID` used without an attribute path
    #[error("UC_MANIFEST_ID must be followed by an attribute path, e.g. .id")]
    MissingPathSuffix,

    /// `UC_SYSTEM_OBJECT` used with an attribute path
    #[error("UC_SYSTEM_OBJECT returns a string, so path suffixes may not be used")]
    UnexpectedPathSuffix,

    /// Manifest entry has no identifier for the target environment
    #[error("resource {manifest_id} has no identifier for environment {environment}")]
    MissingIdentifier {
        manifest_id: String,
        environment: String,
    },

    /// `UC_SYSTEM_OBJECT` names an object that does not exist
    #[error("no system {type_tag} object named {name}")]
    UnknownSystemObject { type_tag: String, name: String },

    /// `@FILE` could not be read
    #[error("failed to read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact could not be written
    #[error("failed to write {}: {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reference attribute points at no live resource
    #[error("no live {type_tag} resource with ID {id} (referenced at {path})")]
    UnresolvedDependency {
        type_tag: String,
        path: String,
        id: String,
    },

    /// State serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure while processing one attribute of a resource
    #[error("resource {resource}, attribute {path}: {source}")]
    Attribute {
        resource: String,
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
            Error::UnknownManifestId(_)
            | Error::UnknownSystemObject { .. }
            | Error::UnresolvedDependency { .. } => ErrorCategory::UnresolvedReference,
            Error::ReadFile { .. } | Error::WriteFile { .. } | Error::Json(_) => ErrorCategory::Io,
            Error::Token(_)
            | Error::UnknownFunction(_)
            | Error::Arguments { .. }
            | Error::MissingPathSuffix
            | Error::MissingIdentifier { .. }
            | Error::UnexpectedPathSuffix => ErrorCategory::Input,
            Error::Attribute { source, .. } => source.category(),
        }
    }

    /// Wrap with the resource and attribute path being processed.
    pub fn in_attribute(self, resource: &str, path: &str) -> Self {
        Error::Attribute {
            resource: resource.to_string(),
            path: path.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type for Terraform artifact generation
pub type Result<T> = std::result::Result<T, Error>;
