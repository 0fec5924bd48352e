//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API wire DTOs
//! (which have `#[serde(rename)]` for camelCase etc.).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Stored lowercase; globally unique.
    pub username: String,
    /// Globally unique.
    pub email: String,
    /// Display name shown on the channel page.
    pub full_name: String,
    /// Opaque media reference managed by the upload service.
    pub avatar_url: Option<String>,
    /// Opaque media reference managed by the upload service.
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject — user ID (standard JWT `sub` claim).
    pub sub: String,
    /// User email.
    pub email: String,
    /// Username.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

/// Claims embedded in refresh tokens — subject only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject — user ID.
    pub sub: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}
