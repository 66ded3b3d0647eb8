//! Error types for schema validation
//!
//! Inference itself is total: collection, analysis and prediction handle
//! every value kind and cannot fail. The only caller-visible failure is a
//! document not conforming to a synthesized schema, and that is an
//! expected, structured outcome rather than a fault.

use thiserror::Error;

/// A document did not conform to a synthesized schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Value kind differs from what the schema expects
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// A required key of a fixed shape is absent
    #[error("missing required key `{key}` at {path}")]
    MissingKey { path: String, key: String },

    /// A key not declared by a fixed shape is present
    #[error("unexpected key `{key}` at {path}")]
    UnexpectedKey { path: String, key: String },

    /// A dictionary key does not follow the detected naming convention
    #[error("key `{key}` at {path} does not match the {pattern} convention")]
    KeyPatternMismatch {
        path: String,
        key: String,
        pattern: String,
    },

    /// A string is outside a closed enumeration
    #[error("value `{value}` at {path} is not one of the allowed values")]
    NotInEnum { path: String, value: String },
}
