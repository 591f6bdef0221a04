use axum::{Json, Router, extract::State, routing::get};

use sonora::{ProfileUpdate, User, update_profile};

use crate::error::AppError;
use crate::session::AuthUser;
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/api/users/profile", get(get_profile).put(put_profile))
}

fn record_user_action(state: &AppState, auth: &AuthUser, action: &str) {
    state.metrics.record_user_action(action, "standard");
    tracing::info!(
        component = "user",
        request_id = %auth.request_id,
        user_id = %auth.user.id,
        %action,
        "User action: {action}"
    );
}

async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<User>, AppError> {
    record_user_action(&state, &auth, "view_profile");

    match state.users.get_user(&auth.user.id).await? {
        Some(user) => Ok(Json(user)),
        None => {
            tracing::warn!(
                component = "api",
                request_id = %auth.request_id,
                user_id = %auth.user.id,
                "User profile not found"
            );
            Err(AppError::NotFound("User not found".to_string()))
        }
    }
}

async fn put_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    record_user_action(&state, &auth, "update_profile");

    match update_profile(&state.users, &auth.user.id, update).await? {
        Some(user) => Ok(Json(user)),
        None => {
            tracing::error!(
                component = "api",
                request_id = %auth.request_id,
                user_id = %auth.user.id,
                "Failed to update user profile - user not found"
            );
            Err(AppError::NotFound("User not found".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use serde_json::json;

    use sonora::USER_ACTIONS_TOTAL;

    use crate::test_utils::{TestApp, body_json, get, json_put, sample_value};

    #[tokio::test]
    async fn test_profile_requires_session() {
        let app = TestApp::new().await;

        let read = app.send(get("/api/users/profile", None)).await;
        assert_eq!(read.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(read).await,
            json!({ "error": "Authentication required" })
        );

        let write = app
            .send(json_put("/api/users/profile", json!({ "bio": "x" }), None))
            .await;
        assert_eq!(write.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let app = TestApp::new().await;
        let token = app.register("a@x.com", "longenough1").await;

        let response = app
            .send(json_put(
                "/api/users/profile",
                json!({
                    "bio": "Modular synths",
                    "avatar": "https://img/a.png",
                    "isVerified": true,
                }),
                Some(&token),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let user = body_json(response).await;
        assert_eq!(user["bio"], "Modular synths");
        assert_eq!(user["avatarUrl"], "https://img/a.png");
        assert_eq!(user["isVerified"], false);
    }

    #[tokio::test]
    async fn test_update_without_allowed_fields() {
        let app = TestApp::new().await;
        let token = app.register("a@x.com", "longenough1").await;

        let response = app
            .send(json_put(
                "/api/users/profile",
                json!({ "walletAddress": "0xabc" }),
                Some(&token),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "No valid fields provided" })
        );
    }

    #[tokio::test]
    async fn test_deleted_account_loses_session() {
        let app = TestApp::new().await;
        let token = app.register("a@x.com", "longenough1").await;
        let profile = body_json(app.send(get("/api/users/profile", Some(&token))).await).await;

        app.state
            .users
            .delete_user(profile["id"].as_str().unwrap())
            .await
            .unwrap();

        // the session row went with the user, so the cookie no longer resolves
        let response = app.send(get("/api/users/profile", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_actions_are_counted() {
        let app = TestApp::new().await;
        let token = app.register("a@x.com", "longenough1").await;

        app.send(get("/api/users/profile", Some(&token))).await;
        app.send(get("/api/users/profile", Some(&token))).await;
        app.send(json_put(
            "/api/users/profile",
            json!({ "bio": "hi" }),
            Some(&token),
        ))
        .await;

        let rendered = app.state.metrics.render();
        assert_eq!(
            sample_value(
                &rendered,
                USER_ACTIONS_TOTAL,
                &["action=\"view_profile\"", "user_type=\"standard\""]
            ),
            Some(2.0)
        );
        assert_eq!(
            sample_value(&rendered, USER_ACTIONS_TOTAL, &["action=\"update_profile\""]),
            Some(1.0)
        );
    }
}
