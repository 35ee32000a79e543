//! Typed failures raised by the structure-reconstruction core.
//!
//! Classification misses and field lookup misses are not errors: the former
//! is recovered as an `UNKNOWN` section title and the latter becomes an absent
//! field value. Everything here is fatal for the document being processed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdsError {
    /// An element sits left of every indentation level still open on the stack.
    #[error("structural parse error on page {page}: element at x0={x0} has no enclosing indentation level ({text:?})")]
    StructuralParse { page: u32, x0: f64, text: String },

    /// Boxes or nodes were compared across coordinate spaces, or a box was malformed.
    #[error("injection coordinate error: {0}")]
    InjectionCoordinate(String),

    /// The overwrite mode is declared but has no implementation.
    #[error("overwrite mode {0} is not supported")]
    UnsupportedOverwriteMode(String),

    /// The layout collaborator handed over something unusable.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// A rule or field pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, SdsError>;
