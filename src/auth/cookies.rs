use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{time::Duration as CookieDuration, Cookie, SameSite};

pub const AUTH_COOKIE: &str = "auth-token";
pub const OAUTH_STATE_COOKIE: &str = "oauth-state";
const OAUTH_STATE_TTL_MINUTES: i64 = 10;

pub fn auth_cookie(token: &str, ttl_days: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::days(ttl_days))
        .path("/")
        .build()
}

pub fn clear_auth_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(0))
        .path("/")
        .build()
}

pub fn oauth_state_cookie(state: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, state.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::minutes(OAUTH_STATE_TTL_MINUTES))
        .path("/api/auth/google")
        .build()
}

pub fn clear_oauth_state_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(0))
        .path("/api/auth/google")
        .build()
}

/// Append a `Set-Cookie` header.
pub fn set_cookie(headers: &mut HeaderMap, cookie: Cookie<'_>) -> anyhow::Result<()> {
    let value = HeaderValue::from_str(&cookie.to_string())?;
    headers.append(header::SET_COOKIE, value);
    Ok(())
}

/// Value of the named cookie from the request `Cookie` header(s).
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|part| Cookie::parse(part.trim().to_string()).ok())
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}
