use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

use sonora::{
    AuthOutcome, CoordinationError, LoginForm, MIN_PASSWORD_LENGTH, RegisterForm,
    clear_session_cookie_header, login_with_password, register_with_password, set_session_cookie,
};

use crate::config::{REDIRECT_ANON, REDIRECT_USER, found};
use crate::error::internal_failure;
use crate::session::RequestContext;
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
}

#[derive(Template)]
#[template(path = "login.j2", escape = "html")]
struct LoginTemplate<'a> {
    error: Option<String>,
    email: &'a str,
    min_password_length: usize,
    google_enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct LoginQuery {
    error: Option<String>,
}

fn query_error_message(code: &str) -> &'static str {
    match code {
        "oauth_error" => "Google sign-in failed. Please try again.",
        _ => "Sign-in failed. Please try again.",
    }
}

/// Renders the login page with `status`. A template failure becomes a 500.
fn login_page_response(
    state: &AppState,
    status: StatusCode,
    error: Option<String>,
    email: &str,
) -> Response {
    let template = LoginTemplate {
        error,
        email,
        min_password_length: MIN_PASSWORD_LENGTH,
        google_enabled: state.identity_provider.is_some(),
    };
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => internal_failure(&format!("Failed to render login page: {e}"), |_| {
            "Internal server error".into_response()
        }),
    }
}

fn error_page(state: &AppState, message: &str, detail: &str) -> Response {
    let page = login_page_response(
        state,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(message.to_string()),
        "",
    );
    internal_failure(detail, move |_| page)
}

async fn login_page(
    State(state): State<AppState>,
    context: RequestContext,
    Query(query): Query<LoginQuery>,
) -> Response {
    if let Some(user_id) = context.user_id() {
        tracing::info!(
            component = "auth",
            request_id = %context.request_id,
            %user_id,
            "Already authenticated user redirected from login"
        );
        return found(REDIRECT_USER, HeaderMap::new());
    }

    let error = query
        .error
        .as_deref()
        .map(|code| query_error_message(code).to_string());
    login_page_response(&state, StatusCode::OK, error, "")
}

/// Answers a successful sign-in with the session cookie and a redirect home.
fn signed_in(state: &AppState, outcome: &AuthOutcome) -> Response {
    let mut headers = HeaderMap::new();
    match set_session_cookie(
        &mut headers,
        &outcome.token,
        outcome.session.expires_at,
        state.secure_cookies(),
    ) {
        Ok(()) => found(REDIRECT_USER, headers),
        Err(e) => error_page(state, "Internal server error", &e.to_string()),
    }
}

/// Maps a coordination failure to the page the browser sees.
fn auth_failure(
    state: &AppState,
    request_id: &str,
    action: &str,
    email: &str,
    err: CoordinationError,
) -> Response {
    match err {
        CoordinationError::Validation(_) | CoordinationError::InvalidCredentials => {
            login_page_response(state, StatusCode::BAD_REQUEST, Some(err.to_string()), email)
        }
        CoordinationError::Persistence(_) => {
            tracing::error!(component = "auth", %request_id, error = %err, "{action} error");
            error_page(state, "Internal server error", &err.to_string())
        }
    }
}

async fn login(
    State(state): State<AppState>,
    context: RequestContext,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.clone().unwrap_or_default();
    match login_with_password(&state.users, &state.hasher, &state.sessions, form).await {
        Ok(outcome) => {
            tracing::info!(
                component = "auth",
                request_id = %context.request_id,
                user_id = %outcome.user.id,
                "User logged in successfully"
            );
            signed_in(&state, &outcome)
        }
        Err(e) => auth_failure(&state, &context.request_id, "Login", &email, e),
    }
}

async fn register(
    State(state): State<AppState>,
    context: RequestContext,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = form.email.clone().unwrap_or_default();
    match register_with_password(&state.users, &state.hasher, &state.sessions, form).await {
        Ok(outcome) => {
            tracing::info!(
                component = "auth",
                request_id = %context.request_id,
                user_id = %outcome.user.id,
                session_id = %outcome.session.id,
                "User automatically logged in after registration"
            );
            signed_in(&state, &outcome)
        }
        Err(e) => auth_failure(&state, &context.request_id, "Registration", &email, e),
    }
}

async fn logout(State(state): State<AppState>, context: RequestContext) -> Response {
    let request_id = context.request_id.as_str();
    let Some(session) = context.session.as_ref() else {
        tracing::warn!(component = "auth", %request_id, "Logout attempt without active session");
        return login_page_response(
            &state,
            StatusCode::UNAUTHORIZED,
            Some("No active session".to_string()),
            "",
        );
    };

    if let Err(e) = state.sessions.invalidate_session(&session.id).await {
        tracing::error!(
            component = "auth",
            %request_id,
            session_id = %session.id,
            error = %e,
            "Logout error"
        );
        return error_page(&state, "Logout error", &e.to_string());
    }

    let mut headers = HeaderMap::new();
    if let Err(e) = clear_session_cookie_header(&mut headers, state.secure_cookies()) {
        return error_page(&state, "Logout error", &e.to_string());
    }

    tracing::info!(
        component = "auth",
        %request_id,
        user_id = context.user_id().unwrap_or_default(),
        session_id = %session.id,
        "User logged out successfully"
    );
    found(REDIRECT_ANON, headers)
}
