pub mod dataset;
pub mod error;
pub mod expression;
pub mod measurement;
pub mod metadata;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use error::DomainError;
