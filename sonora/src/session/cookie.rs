use chrono::{DateTime, Utc};
use http::header::{COOKIE, HeaderMap, HeaderValue, SET_COOKIE};

use crate::session::{config::SESSION_COOKIE_NAME, errors::SessionError};
use crate::utils::http_date;

/// `Set-Cookie` value carrying the bearer token until `expires_at`.
pub fn session_cookie(token: &str, expires_at: DateTime<Utc>, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; HttpOnly; SameSite=Lax; Path=/; Expires={}",
        http_date(expires_at)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn set_session_cookie(
    headers: &mut HeaderMap,
    token: &str,
    expires_at: DateTime<Utc>,
    secure: bool,
) -> Result<(), SessionError> {
    append_set_cookie(headers, session_cookie(token, expires_at, secure))
}

pub fn clear_session_cookie_header(
    headers: &mut HeaderMap,
    secure: bool,
) -> Result<(), SessionError> {
    append_set_cookie(headers, clear_session_cookie(secure))
}

fn append_set_cookie(headers: &mut HeaderMap, cookie: String) -> Result<(), SessionError> {
    let value = HeaderValue::try_from(cookie)
        .map_err(|_| SessionError::Cookie("Invalid session cookie value".to_string()))?;
    headers.append(SET_COOKIE, value);
    Ok(())
}

/// Bearer token from the request's `Cookie` headers, if any. An empty value counts as absent.
pub fn get_session_token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .map(str::trim)
        .find_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            (name.trim() == SESSION_COOKIE_NAME).then(|| value.trim())
        })
        .filter(|token| !token.is_empty())
}
