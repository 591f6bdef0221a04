//! Application router with the identity and logging layers applied

use axum::{Json, Router, middleware::from_fn_with_state, routing::get};
use serde_json::json;

use crate::middleware::{log_and_measure, resolve_identity};
use crate::session::RequestContext;
use crate::state::AppState;

/// Every route of the application.
///
/// Identity resolution is the outer layer so the logging layer sees the resolved caller
/// and reuses its request id.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .merge(super::auth::router())
        .merge(super::oauth2::router())
        .merge(super::profile::router())
        .merge(super::health::router())
        .layer(from_fn_with_state(state.clone(), log_and_measure))
        .layer(from_fn_with_state(state.clone(), resolve_identity))
        .with_state(state)
}

async fn index(context: RequestContext) -> Json<serde_json::Value> {
    match context.user {
        Some(user) => Json(json!({
            "message": format!(
                "Welcome back, {}!",
                user.display_name.as_deref().unwrap_or(&user.email)
            ),
            "authenticated": true,
            "user": user,
        })),
        None => Json(json!({
            "message": "Welcome to Sonora",
            "authenticated": false,
            "user": null,
        })),
    }
}
