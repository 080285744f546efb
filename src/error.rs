//! Error types for efti-datatools
//!
//! Every public operation is all-or-nothing: it either returns a complete
//! tree or one of these errors, never a partially filtered or populated
//! document.

use thiserror::Error;

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for schema, filter and populate operations
#[derive(Error, Debug)]
pub enum Error {
    /// A document node or override path is absent from the schema
    #[error("not in schema: {path}")]
    NotInSchema {
        /// Structural path that failed to resolve
        path: String,
    },

    /// Document or schema exceeds the configured size limits
    #[error("tree too large: {0}")]
    TreeTooLarge(String),

    /// Malformed subset identifier
    #[error("invalid subset id: {0:?}")]
    InvalidSubsetId(String),

    /// Malformed schema definition
    #[error("schema error: {0}")]
    Schema(String),

    /// Malformed location path expression
    #[error("path error: {0}")]
    Path(String),

    /// Malformed text content override
    #[error("override error: {0}")]
    Override(String),

    /// Document has no usable root element
    #[error("document error: {0}")]
    Document(String),

    /// XML parsing or writing error
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON schema definition error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a [`Error::NotInSchema`] for the given path
    pub fn not_in_schema(path: impl Into<String>) -> Self {
        Self::NotInSchema { path: path.into() }
    }

    /// Whether this error signals a schema/document mismatch
    pub fn is_not_in_schema(&self) -> bool {
        matches!(self, Self::NotInSchema { .. })
    }
}
