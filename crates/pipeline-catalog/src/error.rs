//! Error types for the pipeline catalog

use thiserror::Error;

/// Result type alias using CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while building or querying the catalog
///
/// Probe-level variants (`ConstructionRejected`, `ProbeFailed`,
/// `SignatureUnparseable`) are produced by hierarchy providers and absorbed
/// by the catalog into derived values. Guard variants (`UnknownType`,
/// `AbstractType`, `NotBuilt`) are returned to callers.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The type could not be instantiated
    #[error("Construction of '{type_name}' rejected: {reason}")]
    ConstructionRejected { type_name: String, reason: String },

    /// A trial invocation signalled a runtime error
    #[error("Probe '{method}' failed: {message}")]
    ProbeFailed { method: String, message: String },

    /// A method signature could not be interpreted
    #[error("Unparseable signature: {0}")]
    SignatureUnparseable(String),

    /// The type is not part of the catalog
    #[error("Unknown node type: {0}")]
    UnknownType(String),

    /// The type is abstract and cannot be instantiated
    #[error("Cannot instantiate abstract node type: {0}")]
    AbstractType(String),

    /// The catalog has not been built yet
    #[error("Catalog has not been built")]
    NotBuilt,

    /// A category path does not exist in the taxonomy
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Create a probe failure for the given method
    pub fn probe(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProbeFailed {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Create a construction rejection for the given type
    pub fn rejected(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConstructionRejected {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a caller-visible contract violation
    pub fn is_guard_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownType(_) | Self::AbstractType(_) | Self::NotBuilt
        )
    }
}
