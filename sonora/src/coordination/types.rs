use serde::Deserialize;

use crate::session::Session;
use crate::userdb::User;

/// Login form fields as submitted; blank values count as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub display_name: Option<String>,
}

/// What the identity provider told us about the account.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleIdentity {
    pub google_id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Profile edit request body. Fields outside this set are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    /// Stored as `avatar_url`.
    pub avatar: Option<String>,
}

/// A signed-in user with the bearer token to hand back and its session record.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: User,
    pub token: String,
    pub session: Session,
}

pub(super) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
