//! User request handlers.

use axum::{Extension, Json};

use crate::error::AppResult;
use crate::middleware::auth::CurrentUser;
use crate::models::UserResponse;

/// `GET /api/v1/users/me` — the identity resolved by the auth gate.
pub async fn me_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    Ok(Json(UserResponse::from(&user)))
}
