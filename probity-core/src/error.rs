// probity-core/src/error.rs

use crate::domain::error::DomainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbityError {
    // --- ERREURS DU DOMAINE (Configuration, colonnes manquantes, regex) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- ERREURS GÉNÉRIQUES / APPLICATIVES ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}
