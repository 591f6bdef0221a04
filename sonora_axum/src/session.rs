use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::request::Parts;

use sonora::{Session, User};

use crate::error::AppError;

/// Who is making the request, resolved once by the auth middleware.
///
/// Handlers read it; nothing downstream mutates it.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
    pub user: Option<User>,
    pub session: Option<Session>,
}

impl RequestContext {
    pub fn anonymous(request_id: String) -> Self {
        Self {
            request_id,
            user: None,
            session: None,
        }
    }

    pub(crate) fn authenticated(request_id: String, user: User, session: Session) -> Self {
        Self {
            request_id,
            user: Some(user),
            session: Some(session),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        Ok(match parts.extensions.get::<RequestContext>() {
            Some(context) => context.clone(),
            None => {
                tracing::debug!("No request context, treating request as anonymous");
                RequestContext::anonymous(uuid::Uuid::new_v4().to_string())
            }
        })
    }
}

/// A signed-in caller. Extracting it from an anonymous request rejects with 401.
///
/// ```no_run
/// use axum::{Json, Router, routing::get};
/// use sonora_axum::AuthUser;
///
/// async fn me(auth: AuthUser) -> Json<sonora::User> {
///     Json(auth.user)
/// }
///
/// let app: Router = Router::new().route("/me", get(me));
/// ```
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub request_id: String,
    pub user: User,
    pub session: Session,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(context) = RequestContext::from_request_parts(parts, state).await;

        match context {
            RequestContext {
                request_id,
                user: Some(user),
                session: Some(session),
            } => Ok(AuthUser {
                request_id,
                user,
                session,
            }),
            RequestContext { request_id, .. } => {
                tracing::warn!(
                    target: "security",
                    %request_id,
                    method = %parts.method,
                    path = %parts.uri.path(),
                    "Unauthorized access attempt"
                );
                Err(AppError::Unauthorized)
            }
        }
    }
}
