//! Error types for the validation engine.

use crate::message_bag::MessageBag;
use thiserror::Error;

/// Errors surfaced by a [`Validator`](crate::Validator).
///
/// The two variants are deliberately different in kind: `UnknownRule` is a
/// configuration mistake that aborts the whole validation call, while
/// `Invalid` is the expected data-quality outcome, raised only when the
/// validated-data view is requested under failing conditions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A rule spec referenced a name with no extension or built-in behind
    /// it. Never recorded as a per-field pass or failure.
    #[error("unknown validation rule `{rule}` for field `{field}`")]
    UnknownRule { field: String, rule: String },

    /// The data failed validation; carries the per-field messages.
    #[error("the given data was invalid")]
    Invalid(MessageBag),
}

impl ValidationError {
    /// The error bag, when this is an [`Invalid`](Self::Invalid) error.
    pub fn errors(&self) -> Option<&MessageBag> {
        match self {
            ValidationError::Invalid(bag) => Some(bag),
            ValidationError::UnknownRule { .. } => None,
        }
    }
}
