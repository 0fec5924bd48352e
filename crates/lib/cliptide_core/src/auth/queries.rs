//! User and session queries.
//!
//! The `refresh_token_hash` column on `users` is the single shared mutable
//! resource of the session lifecycle: issuance overwrites it, rotation
//! swaps it conditionally, logout clears it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::User;

type UserRow = (
    Uuid,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
);

fn user_from_row(row: UserRow) -> User {
    let (id, username, email, full_name, avatar_url, cover_url, created_at) = row;
    User {
        id,
        username,
        email,
        full_name,
        avatar_url,
        cover_url,
        created_at,
    }
}

/// Fetch a user plus password hash by username or email, for login.
pub async fn find_user_for_login(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<(User, String)>, AuthError> {
    let row = sqlx::query_as::<
        _,
        (
            Uuid,
            String,
            String,
            String,
            Option<String>,
            Option<String>,
            DateTime<Utc>,
            String,
        ),
    >(
        "SELECT id, username, email, full_name, avatar_url, cover_url, created_at, password_hash \
         FROM users WHERE username = lower($1) OR email = lower($1)",
    )
    .bind(identifier)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(
        |(id, username, email, full_name, avatar_url, cover_url, created_at, password_hash)| {
            (
                User {
                    id,
                    username,
                    email,
                    full_name,
                    avatar_url,
                    cover_url,
                    created_at,
                },
                password_hash,
            )
        },
    ))
}

/// Fetch a user by ID.
pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, email, full_name, avatar_url, cover_url, created_at \
         FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(user_from_row))
}

/// Create a new user, returning the created record.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    full_name: &str,
    password_hash: &str,
) -> Result<User, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (username, email, full_name, password_hash) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, username, email, full_name, avatar_url, cover_url, created_at",
    )
    .bind(username)
    .bind(email)
    .bind(full_name)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    Ok(user_from_row(row))
}

/// Check whether a username is already taken.
pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, AuthError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Check whether an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AuthError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Overwrite the stored refresh token hash. A new login supersedes any
/// prior session for the same user.
///
/// Returns `false` if the user row no longer exists.
pub async fn store_refresh_token_hash(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
) -> Result<bool, AuthError> {
    let result =
        sqlx::query("UPDATE users SET refresh_token_hash = $2, updated_at = now() WHERE id = $1")
            .bind(user_id)
            .bind(token_hash)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Swap the stored refresh token hash, but only if it still equals the
/// presented one. A single conditional write, so two racing rotations with
/// the same token resolve to exactly one winner.
///
/// Returns `false` when the stored value no longer matches (superseded,
/// revoked, or never issued).
pub async fn rotate_refresh_token_hash(
    pool: &PgPool,
    user_id: Uuid,
    presented_hash: &str,
    new_hash: &str,
) -> Result<bool, AuthError> {
    let result = sqlx::query(
        "UPDATE users SET refresh_token_hash = $3, updated_at = now() \
         WHERE id = $1 AND refresh_token_hash = $2",
    )
    .bind(user_id)
    .bind(presented_hash)
    .bind(new_hash)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Clear the stored refresh token hash (logout).
pub async fn clear_refresh_token_hash(pool: &PgPool, user_id: Uuid) -> Result<(), AuthError> {
    sqlx::query("UPDATE users SET refresh_token_hash = NULL, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
