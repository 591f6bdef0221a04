use std::fmt;

use axum::{
    Router,
    extract::{Query, State},
    response::Response,
    routing::get,
};
use axum_extra::{TypedHeader, headers};
use http::HeaderMap;
use serde::Deserialize;
use subtle::ConstantTimeEq;

use sonora::{
    AuthOutcome, CoordinationError, GOOGLE_CODE_VERIFIER_COOKIE, GOOGLE_SCOPES,
    GOOGLE_STATE_COOKIE, GoogleIdentity, IdentityProvider, OAUTH_COOKIE_MAX_AGE, OAuth2Error,
    SessionError, UtilError, complete_google_login, generate_code_verifier, generate_state,
    header_set_cookie, set_session_cookie,
};

use crate::config::{OAUTH_ERROR_REDIRECT, REDIRECT_USER, found};
use crate::session::RequestContext;
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/login/google", get(google_auth))
        .route("/login/google/callback", get(google_callback))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct AuthResponse {
    code: Option<String>,
    state: Option<String>,
}

/// Why a callback was turned away. Every variant ends at the login error page.
#[derive(Debug)]
enum CallbackError {
    NotConfigured,
    MissingParameters,
    StateMismatch,
    Exchange(OAuth2Error),
    IdToken(OAuth2Error),
    MissingClaims,
    Account(CoordinationError),
    Cookie(String),
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "Google sign-in is not configured"),
            Self::MissingParameters => write!(f, "OAuth callback missing required parameters"),
            Self::StateMismatch => write!(f, "OAuth state mismatch"),
            Self::Exchange(e) => write!(f, "Failed to validate authorization code: {e}"),
            Self::IdToken(e) => write!(f, "Failed to decode ID token: {e}"),
            Self::MissingClaims => write!(f, "Missing required claims from Google ID token"),
            Self::Account(e) => write!(f, "Error during Google OAuth callback processing: {e}"),
            Self::Cookie(e) => write!(f, "Failed to set cookies: {e}"),
        }
    }
}

impl CallbackError {
    /// Protocol failures, as opposed to configuration or storage trouble on our side.
    fn is_security_event(&self) -> bool {
        matches!(
            self,
            Self::MissingParameters
                | Self::StateMismatch
                | Self::Exchange(_)
                | Self::IdToken(_)
                | Self::MissingClaims
        )
    }
}

impl From<UtilError> for CallbackError {
    fn from(e: UtilError) -> Self {
        Self::Cookie(e.to_string())
    }
}

impl From<SessionError> for CallbackError {
    fn from(e: SessionError) -> Self {
        Self::Cookie(e.to_string())
    }
}

/// Builds the provider URL plus the state and verifier cookies bound to it.
fn prepare_authorization(
    provider: &dyn IdentityProvider,
    secure: bool,
) -> Result<(String, HeaderMap), OAuth2Error> {
    let state = generate_state()?;
    let code_verifier = generate_code_verifier()?;
    let auth_url = provider.authorization_url(&state, &code_verifier, &GOOGLE_SCOPES)?;

    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        GOOGLE_STATE_COOKIE,
        &state,
        OAUTH_COOKIE_MAX_AGE,
        secure,
    )?;
    header_set_cookie(
        &mut headers,
        GOOGLE_CODE_VERIFIER_COOKIE,
        &code_verifier,
        OAUTH_COOKIE_MAX_AGE,
        secure,
    )?;
    Ok((auth_url, headers))
}

async fn google_auth(State(state): State<AppState>, context: RequestContext) -> Response {
    let request_id = context.request_id.as_str();
    let Some(provider) = state.identity_provider.as_deref() else {
        tracing::warn!(component = "auth", %request_id, "Google sign-in is not configured");
        return found(OAUTH_ERROR_REDIRECT, HeaderMap::new());
    };

    match prepare_authorization(provider, state.secure_cookies()) {
        Ok((auth_url, headers)) => {
            tracing::info!(component = "auth", %request_id, "Google OAuth flow initiated");
            found(&auth_url, headers)
        }
        Err(e) => {
            tracing::error!(
                component = "auth",
                %request_id,
                error = %e,
                "Failed to initiate Google OAuth flow"
            );
            found(OAUTH_ERROR_REDIRECT, HeaderMap::new())
        }
    }
}

async fn google_callback(
    State(state): State<AppState>,
    context: RequestContext,
    Query(query): Query<AuthResponse>,
    cookies: Option<TypedHeader<headers::Cookie>>,
) -> Response {
    let request_id = context.request_id.as_str();
    let secure = state.secure_cookies();
    let cookies = cookies.map(|TypedHeader(c)| c);

    let result = async {
        let outcome = authorize(&state, &query, cookies.as_ref()).await?;
        let headers = signed_in_headers(&state, &outcome)?;
        Ok::<_, CallbackError>((outcome, headers))
    }
    .await;

    match result {
        Ok((outcome, headers)) => {
            tracing::info!(
                component = "auth",
                %request_id,
                user_id = %outcome.user.id,
                session_id = %outcome.session.id,
                login_method = "google_oauth",
                "User successfully authenticated via Google OAuth"
            );
            found(REDIRECT_USER, headers)
        }
        Err(e) => {
            if e.is_security_event() {
                tracing::warn!(target: "security", %request_id, "{e}");
            } else {
                tracing::error!(
                    component = "auth",
                    %request_id,
                    error = %e,
                    "Google sign-in failed"
                );
            }
            let headers = cleared_flow_cookies(secure).unwrap_or_else(|e| {
                tracing::warn!(
                    component = "auth",
                    %request_id,
                    error = %e,
                    "Failed to clear OAuth cookies"
                );
                HeaderMap::new()
            });
            found(OAUTH_ERROR_REDIRECT, headers)
        }
    }
}

/// Checks the callback against the cookies, redeems the code and signs the account in.
async fn authorize(
    state: &AppState,
    query: &AuthResponse,
    cookies: Option<&headers::Cookie>,
) -> Result<AuthOutcome, CallbackError> {
    let provider = state
        .identity_provider
        .as_deref()
        .ok_or(CallbackError::NotConfigured)?;

    let stored_state = cookies.and_then(|c| c.get(GOOGLE_STATE_COOKIE));
    let code_verifier = cookies.and_then(|c| c.get(GOOGLE_CODE_VERIFIER_COOKIE));
    let (Some(code), Some(returned_state), Some(stored_state), Some(code_verifier)) = (
        query.code.as_deref(),
        query.state.as_deref(),
        stored_state,
        code_verifier,
    ) else {
        return Err(CallbackError::MissingParameters);
    };

    if !bool::from(returned_state.as_bytes().ct_eq(stored_state.as_bytes())) {
        return Err(CallbackError::StateMismatch);
    }

    let tokens = provider
        .exchange_code(code, code_verifier)
        .await
        .map_err(CallbackError::Exchange)?;
    tracing::debug!("Successfully exchanged authorization code for tokens");

    let claims = provider
        .decode_id_token(&tokens.id_token)
        .map_err(CallbackError::IdToken)?;

    let (Some(google_id), Some(email)) = (claims.sub, claims.email) else {
        return Err(CallbackError::MissingClaims);
    };

    complete_google_login(
        &state.users,
        &state.sessions,
        GoogleIdentity {
            google_id,
            email,
            name: claims.name,
            picture: claims.picture,
        },
    )
    .await
    .map_err(CallbackError::Account)
}

/// Expires the state and verifier cookies; a callback consumes them either way.
fn cleared_flow_cookies(secure: bool) -> Result<HeaderMap, UtilError> {
    let mut headers = HeaderMap::new();
    header_set_cookie(&mut headers, GOOGLE_STATE_COOKIE, "", 0, secure)?;
    header_set_cookie(&mut headers, GOOGLE_CODE_VERIFIER_COOKIE, "", 0, secure)?;
    Ok(headers)
}

/// Session cookie plus removal of the short-lived OAuth cookies.
fn signed_in_headers(state: &AppState, outcome: &AuthOutcome) -> Result<HeaderMap, CallbackError> {
    let mut headers = cleared_flow_cookies(state.secure_cookies())?;
    set_session_cookie(
        &mut headers,
        &outcome.token,
        outcome.session.expires_at,
        state.secure_cookies(),
    )?;
    Ok(headers)
}
