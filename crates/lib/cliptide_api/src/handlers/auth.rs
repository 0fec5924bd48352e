//! Authentication request handlers.

use axum::extract::State;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::models::{LoginRequest, LogoutResponse, RefreshRequest, RegisterRequest, TokenResponse};
use crate::services::{auth, cookies};

/// `POST /api/v1/auth/register` — create a new user account.
///
/// Returns the token pair and sets both session cookies.
pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(CookieJar, Json<TokenResponse>)> {
    let resp = auth::register(&state.pool, &state.config, body).await?;
    let jar = cookies::session_cookies(jar, &resp.access_token, &resp.refresh_token, &state.config);
    Ok((jar, Json(resp)))
}

/// `POST /api/v1/auth/login` — authenticate with username-or-email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<TokenResponse>)> {
    let resp = auth::login(&state.pool, &state.config, body).await?;
    let jar = cookies::session_cookies(jar, &resp.access_token, &resp.refresh_token, &state.config);
    Ok((jar, Json(resp)))
}

/// `POST /api/v1/auth/refresh` — exchange a refresh token for a new pair.
///
/// The token is taken from the refresh cookie, falling back to the
/// request body.
pub async fn refresh_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> AppResult<(CookieJar, Json<TokenResponse>)> {
    let presented = jar
        .get(cookies::REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| body.and_then(|Json(b)| b.refresh_token))
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".into()))?;

    let resp = auth::refresh(&state.pool, &state.config, &presented).await?;
    let jar = cookies::session_cookies(jar, &resp.access_token, &resp.refresh_token, &state.config);
    Ok((jar, Json(resp)))
}

/// `POST /api/v1/auth/logout` — revoke the current session. Requires auth.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<LogoutResponse>)> {
    let resp = auth::logout(&state.pool, user.id).await?;
    Ok((cookies::clear_session_cookies(jar), Json(resp)))
}
