//! Shared fixtures for the handler and middleware tests
//!
//! Each fixture gets its own in-memory database and metrics registry, so tests can run in
//! parallel without seeing each other's rows or counters.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{Router, body::Body, response::Response};
use http::{
    Request,
    header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
};
use tower::ServiceExt;

use sonora::{
    AppConfig, Database, IdTokenClaims, IdentityProvider, Metrics, OAuth2Error, OidcTokens,
    code_challenge,
};

use crate::router::app_router;
use crate::state::AppState;

/// Identity provider double that hands back canned tokens and claims.
pub(crate) struct FakeProvider {
    pub(crate) exchange: Result<OidcTokens, OAuth2Error>,
    pub(crate) claims: Result<IdTokenClaims, OAuth2Error>,
}

impl FakeProvider {
    pub(crate) fn signing_in(sub: &str, email: &str) -> Self {
        Self {
            exchange: Ok(OidcTokens {
                access_token: "access".to_string(),
                id_token: "id-token".to_string(),
                expires_in: Some(3600),
                refresh_token: None,
            }),
            claims: Ok(IdTokenClaims {
                sub: Some(sub.to_string()),
                email: Some(email.to_string()),
                email_verified: true,
                name: Some("Google Person".to_string()),
                picture: Some("https://lh3.example/photo.png".to_string()),
                exp: chrono::Utc::now().timestamp() + 3600,
            }),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorization_url(
        &self,
        state: &str,
        code_verifier: &str,
        scopes: &[&str],
    ) -> Result<String, OAuth2Error> {
        Ok(format!(
            "https://idp.test/auth?state={state}&code_challenge={}&scope={}",
            code_challenge(code_verifier),
            scopes.join("+")
        ))
    }

    async fn exchange_code(
        &self,
        code: &str,
        _code_verifier: &str,
    ) -> Result<OidcTokens, OAuth2Error> {
        if code != "good-code" {
            return Err(OAuth2Error::TokenExchange("invalid_grant".to_string()));
        }
        self.exchange.clone()
    }

    fn decode_id_token(&self, _id_token: &str) -> Result<IdTokenClaims, OAuth2Error> {
        self.claims.clone()
    }
}

pub(crate) struct TestApp {
    pub(crate) state: AppState,
    pub(crate) db: Database,
}

impl TestApp {
    pub(crate) async fn new() -> Self {
        Self::with_config(AppConfig {
            dev_mode: true,
            ..AppConfig::default()
        })
        .await
    }

    pub(crate) async fn with_config(config: AppConfig) -> Self {
        let metrics = Metrics::new().unwrap();
        let db = Database::in_memory(metrics).unwrap();
        sonora::init(&db).await.unwrap();
        let state = AppState::new(config, db.clone()).unwrap();
        Self { state, db }
    }

    pub(crate) fn with_provider(mut self, provider: FakeProvider) -> Self {
        self.state = self.state.with_identity_provider(Arc::new(provider));
        self
    }

    pub(crate) fn router(&self) -> Router {
        app_router(self.state.clone())
    }

    pub(crate) async fn send(&self, request: Request<Body>) -> Response {
        self.router().oneshot(request).await.unwrap()
    }

    /// Registers an account through the HTTP surface and returns its bearer token.
    pub(crate) async fn register(&self, email: &str, password: &str) -> String {
        let body = format!(
            "email={email}&password={password}&confirmPassword={password}",
            email = email.replace('@', "%40")
        );
        let response = self.send(form_post("/register", &body, None)).await;
        assert_eq!(response.status(), http::StatusCode::FOUND);
        session_token_from(&response).unwrap()
    }
}

pub(crate) fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(COOKIE, format!("session={token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub(crate) fn form_post(uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(COOKIE, format!("session={token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub(crate) fn json_put(uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(COOKIE, format!("session={token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// All `Set-Cookie` values on the response.
pub(crate) fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Value of the named cookie set by the response, if any.
pub(crate) fn cookie_value(response: &Response, name: &str) -> Option<String> {
    set_cookies(response).into_iter().find_map(|cookie| {
        let pair = cookie.split(';').next()?;
        let (n, v) = pair.split_once('=')?;
        (n == name).then(|| v.to_string())
    })
}

pub(crate) fn session_token_from(response: &Response) -> Option<String> {
    cookie_value(response, "session").filter(|v| !v.is_empty())
}

pub(crate) async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub(crate) async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

/// Sample value for `name` on the line carrying every fragment in `labels`.
pub(crate) fn sample_value(rendered: &str, name: &str, labels: &[&str]) -> Option<f64> {
    rendered
        .lines()
        .filter(|line| line.starts_with(&format!("{name}{{")))
        .find(|line| labels.iter().all(|l| line.contains(l)))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|v| v.parse().ok())
}

/// Rows in the sessions table.
pub(crate) async fn count_sessions(db: &Database) -> i64 {
    let pool = db.store().as_sqlite().unwrap();
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", db.table("sessions")))
        .fetch_one(pool)
        .await
        .unwrap()
}
