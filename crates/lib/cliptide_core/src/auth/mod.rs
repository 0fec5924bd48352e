//! Authentication and session logic.
//!
//! Provides password hashing, JWT minting and verification, and the
//! user/session queries shared by the API layer.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod token_hash;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
