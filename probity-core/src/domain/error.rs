// probity-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Missing input: {0}")]
    #[diagnostic(
        code(probity::domain::missing_input),
        help("A validation run requires a non-empty metadata catalog and a non-empty dataset.")
    )]
    MissingInput(&'static str),

    #[error("Unknown column '{column}' referenced by {context}")]
    #[diagnostic(
        code(probity::domain::unknown_column),
        help("Composite and Expression rules may only reference columns present in the dataset.")
    )]
    UnknownColumn { column: String, context: String },

    #[error("Invalid Format regex '{pattern}' on attribute '{attribute}': {message}")]
    #[diagnostic(code(probity::domain::invalid_regex))]
    InvalidRegex {
        attribute: String,
        pattern: String,
        message: String,
    },

    #[error("Metadata catalog error: {0}")]
    #[diagnostic(code(probity::domain::metadata))]
    MetadataError(String),

    #[error("Validation run cancelled")]
    #[diagnostic(code(probity::domain::cancelled))]
    Cancelled,
}
