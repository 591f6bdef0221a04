//! Fixed page locations used by the handlers

use axum::response::{IntoResponse, Response};
use http::{HeaderMap, StatusCode, header::LOCATION};

/// Where a signed-in browser lands
pub const REDIRECT_USER: &str = "/";

/// The login page
pub const REDIRECT_ANON: &str = "/login";

/// Where every Google sign-in failure ends up
pub const OAUTH_ERROR_REDIRECT: &str = "/login?error=oauth_error";

/// `302 Found` to `location`, carrying any cookies already placed in `headers`.
pub(crate) fn found(location: &str, headers: HeaderMap) -> Response {
    (
        StatusCode::FOUND,
        headers,
        [(LOCATION, location.to_string())],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::SET_COOKIE;

    #[test]
    fn test_found_keeps_headers() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, "a=1".parse().unwrap());
        headers.append(SET_COOKIE, "b=2".parse().unwrap());

        let response = found(REDIRECT_ANON, headers);

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/login");
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
    }
}
