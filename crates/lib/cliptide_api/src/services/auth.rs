//! Authentication service — the session lifecycle behind the auth routes.
//!
//! Login and registration end in `issue_session`, which signs both tokens
//! and persists the refresh token hash before anything is returned.
//! Rotation swaps the stored hash with a single conditional write, so a
//! replayed refresh token fails even while its signature is still valid.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use cliptide_core::auth::{jwt, password, queries, token_hash};
use cliptide_core::models::auth::User;

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, LogoutResponse, RegisterRequest, TokenResponse, UserResponse};

fn build_token_response(
    user: &User,
    access_token: String,
    refresh_token: String,
    expires_in: i64,
) -> TokenResponse {
    TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in,
        user: UserResponse::from(user),
    }
}

/// Mint an access/refresh pair for an already-authenticated user and
/// persist the refresh token hash on the user record.
///
/// Both tokens are signed before the write; the pair is returned only
/// once the write confirms a row was touched, so no half-issued session
/// is ever observable.
async fn issue_session(
    pool: &PgPool,
    config: &ApiConfig,
    user: &User,
) -> AppResult<TokenResponse> {
    let access_token = jwt::generate_access_token(
        user,
        config.access_token_secret.as_bytes(),
        config.access_token_expiry_secs,
    )?;
    let refresh_token = jwt::generate_refresh_token(
        user.id,
        config.refresh_token_secret.as_bytes(),
        config.refresh_token_expiry_secs,
    )?;

    let hash = token_hash::hash_token(&refresh_token);
    if !queries::store_refresh_token_hash(pool, user.id, &hash).await? {
        // The account vanished between authentication and issuance.
        return Err(AppError::Internal("refresh token persistence failed".into()));
    }

    Ok(build_token_response(
        user,
        access_token,
        refresh_token,
        config.access_token_expiry_secs,
    ))
}

/// Authenticate with username-or-email + password.
pub async fn login(
    pool: &PgPool,
    config: &ApiConfig,
    body: LoginRequest,
) -> AppResult<TokenResponse> {
    let identifier = body
        .username
        .or(body.email)
        .ok_or_else(|| AppError::Validation("username or email is required".into()))?;

    let row = queries::find_user_for_login(pool, identifier.trim()).await?;

    // Unknown identifier and wrong password surface identically.
    let (user, pw_hash) = match row {
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
        Some(r) => r,
    };

    if !password::verify_password(&body.password, &pw_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    info!(username = %user.username, "user logged in");
    issue_session(pool, config, &user).await
}

/// Register a new user account and open its first session.
pub async fn register(
    pool: &PgPool,
    config: &ApiConfig,
    body: RegisterRequest,
) -> AppResult<TokenResponse> {
    let username = body.username.trim().to_lowercase();
    let email = body.email.trim().to_lowercase();
    let full_name = body.full_name.trim();

    if username.is_empty() || email.is_empty() || full_name.is_empty() {
        return Err(AppError::Validation(
            "username, email and fullName are required".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username may only contain letters, digits and underscores".into(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    if body.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    if queries::username_exists(pool, &username).await? {
        return Err(AppError::Validation("Username already taken".into()));
    }
    if queries::email_exists(pool, &email).await? {
        return Err(AppError::Validation("Email already registered".into()));
    }

    let pw_hash = password::hash_password(&body.password)?;
    let user = queries::create_user(pool, &username, &email, full_name, &pw_hash).await?;

    info!(username = %user.username, "registered new user");
    issue_session(pool, config, &user).await
}

/// Exchange a refresh token for a new token pair (single-use rotation).
pub async fn refresh(
    pool: &PgPool,
    config: &ApiConfig,
    presented: &str,
) -> AppResult<TokenResponse> {
    let claims = jwt::verify_refresh_token(presented, config.refresh_token_secret.as_bytes())
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

    // A token referencing a deleted account is indistinguishable from an
    // invalid one.
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".into()))?;
    let user = queries::get_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

    let access_token = jwt::generate_access_token(
        &user,
        config.access_token_secret.as_bytes(),
        config.access_token_expiry_secs,
    )?;
    let new_refresh = jwt::generate_refresh_token(
        user.id,
        config.refresh_token_secret.as_bytes(),
        config.refresh_token_expiry_secs,
    )?;

    // The swap only succeeds while the presented token is still the live
    // one; a superseded or revoked token loses here regardless of its
    // signature window.
    let presented_hash = token_hash::hash_token(presented);
    let new_hash = token_hash::hash_token(&new_refresh);
    if !queries::rotate_refresh_token_hash(pool, user.id, &presented_hash, &new_hash).await? {
        return Err(AppError::StaleRefreshToken);
    }

    info!(username = %user.username, "session rotated");
    Ok(build_token_response(
        &user,
        access_token,
        new_refresh,
        config.access_token_expiry_secs,
    ))
}

/// Logout — clear the stored refresh token for the authenticated user.
pub async fn logout(pool: &PgPool, user_id: Uuid) -> AppResult<LogoutResponse> {
    queries::clear_refresh_token_hash(pool, user_id).await?;
    Ok(LogoutResponse { success: true })
}
