//! Cookie building utilities for session management
//!
//! Centralizes cookie formatting to avoid duplication across the auth
//! endpoints (register, login, refresh, logout).

use axum::http::{HeaderValue, StatusCode};

/// Cookie configuration constants
pub mod config {
    /// Access token cookie name
    pub const ACCESS_TOKEN_NAME: &str = "accessToken";
    /// Refresh token cookie name
    pub const REFRESH_TOKEN_NAME: &str = "refreshToken";
    /// Access token max-age in seconds (15 minutes)
    pub const ACCESS_TOKEN_MAX_AGE_SECS: u32 = 15 * 60;
    /// Refresh token max-age in seconds (10 days)
    pub const REFRESH_TOKEN_MAX_AGE_SECS: u32 = 10 * 24 * 60 * 60;
    /// Both cookies are sent on every route
    pub const COOKIE_PATH: &str = "/";
}

fn is_dev() -> bool {
    std::env::var("ENV").as_deref() != Ok("prod")
}

fn cookie_same_site() -> &'static str {
    match std::env::var("COOKIE_SAMESITE")
        .unwrap_or_else(|_| "Lax".to_string())
        .to_lowercase()
        .as_str()
    {
        "none" => "None",
        "strict" => "Strict",
        _ => "Lax",
    }
}

fn format_cookie(name: &str, token: &str, max_age: u32) -> String {
    let same_site = cookie_same_site();
    let secure = if is_dev() { "" } else { " Secure;" };
    format!(
        "{}={}; HttpOnly;{} SameSite={}; Path={}; Max-Age={}",
        name,
        token,
        secure,
        same_site,
        config::COOKIE_PATH,
        max_age
    )
}

fn build_cookie(name: &str, token: &str, max_age: u32) -> Result<HeaderValue, StatusCode> {
    format_cookie(name, token, max_age).parse().map_err(|_| {
        eprintln!("Failed to parse {} cookie header", name);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Build an access token Set-Cookie header value
pub fn build_access_cookie(token: &str) -> Result<HeaderValue, StatusCode> {
    build_cookie(
        config::ACCESS_TOKEN_NAME,
        token,
        config::ACCESS_TOKEN_MAX_AGE_SECS,
    )
}

/// Build a refresh token Set-Cookie header value
pub fn build_refresh_cookie(token: &str) -> Result<HeaderValue, StatusCode> {
    build_cookie(
        config::REFRESH_TOKEN_NAME,
        token,
        config::REFRESH_TOKEN_MAX_AGE_SECS,
    )
}

/// Build a Set-Cookie header to clear the access token. Clears carry the
/// same Secure/SameSite attributes as the cookies they replace.
pub fn build_clear_access_cookie() -> HeaderValue {
    format_cookie(config::ACCESS_TOKEN_NAME, "", 0)
        .parse()
        .expect("static cookie string should always parse")
}

/// Build a Set-Cookie header to clear the refresh token
pub fn build_clear_refresh_cookie() -> HeaderValue {
    format_cookie(config::REFRESH_TOKEN_NAME, "", 0)
        .parse()
        .expect("static cookie string should always parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_cookie_attributes() {
        let value = build_access_cookie("tok123").unwrap();
        let s = value.to_str().unwrap();
        assert!(s.starts_with("accessToken=tok123;"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("Path=/"));
        assert!(s.contains("Max-Age=900"));
    }

    #[test]
    fn test_refresh_cookie_attributes() {
        let value = build_refresh_cookie("tok456").unwrap();
        let s = value.to_str().unwrap();
        assert!(s.starts_with("refreshToken=tok456;"));
        assert!(s.contains("Max-Age=864000"));
    }

    #[test]
    fn test_clear_cookies_expire_immediately() {
        let s = build_clear_access_cookie();
        assert!(s.to_str().unwrap().contains("Max-Age=0"));
        let s = build_clear_refresh_cookie();
        assert!(s.to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn test_clear_cookie_attributes_match_set() {
        // A clear must carry the same attributes as the cookie it
        // replaces, or the browser treats it as a different cookie.
        fn attrs(s: &str) -> Vec<&str> {
            s.split(';')
                .map(str::trim)
                .filter(|a| !a.contains('=') || a.starts_with("SameSite") || a.starts_with("Path"))
                .collect::<Vec<_>>()
        }
        let set = build_access_cookie("tok").unwrap();
        let clear = build_clear_access_cookie();
        assert_eq!(
            attrs(set.to_str().unwrap()),
            attrs(clear.to_str().unwrap())
        );
    }
}
