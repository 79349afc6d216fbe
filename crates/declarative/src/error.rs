//! Error types for registry lookups and live resource normalization.

use thiserror::Error;

/// Categories of errors, following how an operator should react to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Defect in the resource type catalog or its integration
    Registry,
    /// A declared reference cannot be explained by current state
    UnresolvedReference,
    /// Reading or writing a file failed
    Io,
    /// Malformed operator input (manifest, token, file format)
    Input,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Registry => "Resource type catalog defect",
            Self::UnresolvedReference => "Unresolved resource reference",
            Self::Io => "File system error",
            Self::Input => "Invalid input",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Registry => "This is a bug in the resource type catalog, please report it",
            Self::UnresolvedReference => {
                "Fix the manifest or re-fetch live state so the reference can be resolved"
            }
            Self::Io => "Check that the path exists and is accessible",
            Self::Input => "Fix the input file and try again",
        }
    }
}

/// Errors raised while describing or normalizing live resources.
#[derive(Debug, Error)]
pub enum Error {
    /// Type tag is not registered
    #[error("unknown resource type: {0}")]
    UnknownType(String),

    /// Raw API model does not have the shape the registry expects
    #[error("malformed {type_tag} model: {message}")]
    MalformedModel {
        /// Type tag of the model being normalized
        type_tag: String,
        /// What is wrong with it
        message: String,
    },

    /// Collaborator failed to list live instances
    #[error("failed to list {type_tag} resources: {source}")]
    Listing {
        /// Type tag that was being listed
        type_tag: String,
        /// Underlying collaborator error
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnknownType(_) | Error::MalformedModel { .. } => ErrorCategory::Registry,
            Error::Listing { .. } => ErrorCategory::Io,
        }
    }

    pub(crate) fn malformed(type_tag: &str, message: impl Into<String>) -> Self {
        Error::MalformedModel {
            type_tag: type_tag.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for declarative operations.
pub type Result<T> = std::result::Result<T, Error>;
