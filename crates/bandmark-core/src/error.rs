//! Answer key error types.
//!
//! Structural problems that make an answer key unusable. Softer authoring
//! mistakes are reported as [`ValidationWarning`](crate::parser::ValidationWarning)s
//! instead and degrade to unsatisfiable questions at scoring time.

use thiserror::Error;

/// Errors raised while building an answer key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Two entries share the same question id.
    #[error("duplicate question id: {0}")]
    DuplicateId(String),

    /// A question id is blank.
    #[error("question id must not be empty")]
    EmptyId,

    /// A question declares no answer at all.
    #[error("question {0}: one of `answer`, `alternatives`, `pair` or `select` is required")]
    MissingAnswer(String),

    /// A question declares more than one answer shape.
    #[error("question {id}: conflicting answer fields ({fields})")]
    ConflictingAnswer { id: String, fields: String },

    /// A paired question has no partner id.
    #[error("question {0}: `pair` requires a `partner` question id")]
    MissingPartner(String),

    /// A paired question names itself as partner.
    #[error("question {0}: a pair cannot partner with itself")]
    SelfPartner(String),
}
