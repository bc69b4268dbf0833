//! # Authentication
//!
//! Extractor for admin-only routes and the session cookie helpers.
//!
//! The token is read from the `session_token` cookie first, then from an
//! `Authorization: Bearer` header.

use crate::handlers::{shop_error_to_response, ApiError};
use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use cookie::{time, Cookie, SameSite};
use shop_core::{TokenSource, User, SESSION_COOKIE, SESSION_TTL_DAYS};

/// Extractor that requires a live session.
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let source = token_source(&parts.headers);
        let user = state
            .sessions
            .require_auth(&source)
            .await
            .map_err(shop_error_to_response)?;
        Ok(Self(user))
    }
}

/// Value of the session cookie, if the request carries one
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Everything a request may authenticate with
pub fn token_source(headers: &HeaderMap) -> TokenSource {
    TokenSource {
        cookie: session_cookie(headers),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(String::from),
    }
}

/// `Set-Cookie` value for a freshly issued session
pub fn session_set_cookie(token: &str) -> String {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .path("/")
        .build()
        .to_string()
}

/// `Set-Cookie` value that clears the session cookie
pub fn session_clear_cookie() -> String {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .build();
    cookie.make_removal();
    cookie.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_token=abc123; lang=en"),
        );
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc123"));

        let empty = HeaderMap::new();
        assert_eq!(session_cookie(&empty), None);
    }

    #[test]
    fn test_token_source_prefers_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session_token=from-cookie"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(token_source(&headers).token(), Some("from-cookie"));

        headers.remove(header::COOKIE);
        assert_eq!(token_source(&headers).token(), Some("from-header"));
    }

    #[test]
    fn test_session_set_cookie_attributes() {
        let value = session_set_cookie("tok");
        assert!(value.starts_with("session_token=tok"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=None"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=604800"));
    }

    #[test]
    fn test_session_clear_cookie() {
        let value = session_clear_cookie();
        assert!(value.starts_with("session_token=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("Path=/"));
    }
}
