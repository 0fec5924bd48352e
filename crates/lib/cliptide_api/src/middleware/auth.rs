//! Authentication middleware — token extraction, JWT verification, and
//! identity resolution.
//!
//! The token may arrive as the access cookie or as an
//! `Authorization: Bearer <token>` header. Once the gate passes, handlers
//! can rely on a present, valid, non-deleted user in request extensions.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use cliptide_core::auth::{jwt, queries};
use cliptide_core::models::auth::User;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies::ACCESS_COOKIE;

/// Resolved identity stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Every failure branch collapses into the same response so callers
/// cannot tell which check rejected them.
fn unauthorized() -> AppError {
    AppError::Unauthorized("Invalid access token".into())
}

/// Axum middleware: extracts the access token from cookie or header,
/// verifies the JWT, resolves the subject against the database, and
/// injects `CurrentUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| bearer_token(&request))
        .ok_or_else(unauthorized)?;

    let claims = jwt::verify_access_token(&token, state.config.access_token_secret.as_bytes())
        .ok_or_else(unauthorized)?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| unauthorized())?;
    let user = queries::get_user_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(unauthorized)?;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.to_string())
}
