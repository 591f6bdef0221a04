use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use http::{HeaderValue, header::USER_AGENT};

use sonora::{
    SESSION_COOKIE_NAME, SessionValidation, get_session_token_from_headers, set_session_cookie,
};

use crate::error::HandlerFailure;
use crate::session::RequestContext;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Resolves the caller from the session cookie and attaches a [`RequestContext`].
///
/// Never rejects: a missing or unknown cookie, an expired session, a store failure and a
/// validation timeout all leave the request anonymous.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let token = get_session_token_from_headers(req.headers()).map(str::to_string);

    let mut renewed = None;
    let context = match token {
        None => RequestContext::anonymous(request_id),
        Some(token) => {
            let validation = tokio::time::timeout(
                state.config.validation_timeout,
                state.sessions.validate_token(&token),
            )
            .await;

            match validation {
                Ok(Ok(SessionValidation::Valid {
                    session,
                    user,
                    renewed: was_renewed,
                })) => {
                    tracing::debug!(
                        component = "auth",
                        %request_id,
                        user_id = %user.id,
                        session_id = %session.id,
                        "Session validated"
                    );
                    if was_renewed {
                        renewed = Some((token, session.expires_at));
                    }
                    RequestContext::authenticated(request_id, user, session)
                }
                Ok(Ok(SessionValidation::Expired)) => {
                    tracing::debug!(component = "auth", %request_id, "Session expired");
                    RequestContext::anonymous(request_id)
                }
                Ok(Ok(SessionValidation::NotFound)) => {
                    tracing::debug!(component = "auth", %request_id, "Unknown session token");
                    RequestContext::anonymous(request_id)
                }
                Ok(Err(e)) => {
                    tracing::error!(
                        component = "auth",
                        %request_id,
                        error = %e,
                        "Session validation failed, continuing as anonymous"
                    );
                    RequestContext::anonymous(request_id)
                }
                Err(_) => {
                    tracing::warn!(
                        component = "auth",
                        %request_id,
                        timeout_ms = state.config.validation_timeout.as_millis() as u64,
                        "Session validation timed out, continuing as anonymous"
                    );
                    RequestContext::anonymous(request_id)
                }
            }
        }
    };

    req.extensions_mut().insert(context);
    let mut response = next.run(req).await;

    // Refresh the cookie's Expires to match, unless the handler already set or cleared it.
    if let Some((token, expires_at)) = renewed {
        if !sets_session_cookie(&response) {
            if let Err(e) = set_session_cookie(
                response.headers_mut(),
                &token,
                expires_at,
                state.secure_cookies(),
            ) {
                tracing::warn!(component = "auth", error = %e, "Failed to refresh session cookie");
            }
        }
    }
    response
}

fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{SESSION_COOKIE_NAME}=");
    response
        .headers()
        .get_all(http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&prefix))
}

/// Logs each request and records the HTTP metrics. Runs inside [`resolve_identity`].
pub async fn log_and_measure(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let route = route_label(&path);

    let (request_id, user_id) = match req.extensions().get::<RequestContext>() {
        Some(context) => (
            context.request_id.clone(),
            context.user_id().map(str::to_string),
        ),
        None => (uuid::Uuid::new_v4().to_string(), None),
    };
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let ip = client_ip(&req);

    tracing::info!(
        component = "http",
        %request_id,
        %method,
        %path,
        %user_agent,
        %ip,
        user_id = user_id.as_deref().unwrap_or("anonymous"),
        "Incoming request: {method} {path}"
    );

    let mut response = next.run(req).await;
    let duration = start.elapsed();
    let duration_ms = duration.as_millis() as u64;

    match response.extensions().get::<HandlerFailure>() {
        Some(failure) => {
            state
                .metrics
                .record_http_request(method.as_str(), &route, 500, duration);
            state.metrics.record_error("http_error", "server");
            tracing::error!(
                component = "http",
                %request_id,
                %method,
                %path,
                error_id = %failure.error_id,
                error = %failure.message,
                duration_ms,
                "Request failed"
            );
        }
        None => {
            let status = response.status().as_u16();
            state
                .metrics
                .record_http_request(method.as_str(), &route, status, duration);
            tracing::info!(
                component = "http",
                %request_id,
                status_code = status,
                duration_ms,
                "Request completed: {method} {path} - {status} ({duration_ms}ms)"
            );
        }
    }

    match HeaderValue::from_str(&request_id) {
        Ok(value) => {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        Err(_) => tracing::warn!(%request_id, "Request id is not a valid header value"),
    }
    response
}

/// Metrics label for a path: its first two segments.
///
/// `/api/users/profile` becomes `/api/users` and `/` stays `/`.
pub fn route_label(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).take(2).collect();
    format!("/{}", segments.join("/"))
}

fn client_ip(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
