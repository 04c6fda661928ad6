//! Validation errors for template set documents.

use thiserror::Error;

/// Structural problems that make a template set unusable as a whole.
///
/// Malformed rule blobs inside an individual template are deliberately
/// not represented here; those degrade per template at compile time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("template at index {index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate template id '{id}'")]
    DuplicateId { id: String },
}
