//! Cookie service — set/get/clear httpOnly auth cookies.
//!
//! Both tokens also travel as cookies so the SPA never has to touch them
//! from script: http-only, secure, SameSite=Lax.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::config::ApiConfig;

/// Cookie name for the access token.
pub const ACCESS_COOKIE: &str = "cliptide_access";
/// Cookie name for the refresh token.
pub const REFRESH_COOKIE: &str = "cliptide_refresh";

/// Build a httpOnly cookie for the access token.
pub fn access_cookie(token: &str, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((ACCESS_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

/// Build a httpOnly cookie for the refresh token.
pub fn refresh_cookie(token: &str, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

/// Build an expired cookie to clear the access token.
pub fn clear_access_cookie() -> Cookie<'static> {
    Cookie::build((ACCESS_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Build an expired cookie to clear the refresh token.
pub fn clear_refresh_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Add both session cookies to the jar.
pub fn session_cookies(
    jar: CookieJar,
    access_token: &str,
    refresh_token: &str,
    config: &ApiConfig,
) -> CookieJar {
    jar.add(access_cookie(access_token, config.access_token_expiry_secs))
        .add(refresh_cookie(
            refresh_token,
            config.refresh_token_expiry_secs,
        ))
}

/// Expire both session cookies.
pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    jar.add(clear_access_cookie()).add(clear_refresh_cookie())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_cookies_are_locked_down() {
        for cookie in [
            access_cookie("token", 900),
            refresh_cookie("token", 2_592_000),
        ] {
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::Lax));
            assert_eq!(cookie.path(), Some("/"));
        }
    }

    #[test]
    fn clear_cookies_expire_immediately() {
        assert_eq!(clear_access_cookie().max_age(), Some(Duration::ZERO));
        assert_eq!(clear_refresh_cookie().max_age(), Some(Duration::ZERO));
    }
}
