use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An account as every caller outside the credential path sees it.
///
/// Carries no password hash; see [`StoredUser`] for the credential path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Always stored lowercased.
    pub email: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub wallet_address: Option<String>,
    pub is_verified: bool,
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with its password hash, only produced for password verification.
#[derive(Debug, Clone, FromRow)]
pub struct StoredUser {
    #[sqlx(flatten)]
    pub user: User,
    pub hashed_password: Option<String>,
}

/// Input for [`UserStore::create_user`](super::UserStore::create_user).
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub google_id: Option<String>,
    pub avatar_url: Option<String>,
    pub hashed_password: Option<String>,
}

impl NewUser {
    /// The part of the email before `@`.
    pub fn email_prefix(&self) -> &str {
        self.email.split('@').next().unwrap_or_default()
    }

    /// Fills in the username and display name defaults.
    ///
    /// Username defaults to `{email_prefix}_{unix_millis}`; display name to the email prefix.
    pub(crate) fn with_defaults(mut self, now: DateTime<Utc>) -> Self {
        let prefix = self.email_prefix().to_string();
        if self.username.as_deref().is_none_or(str::is_empty) {
            self.username = Some(format!("{}_{}", prefix, now.timestamp_millis()));
        }
        if self.display_name.as_deref().is_none_or(str::is_empty) {
            self.display_name = Some(prefix);
        }
        self
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.display_name.is_none()
            && self.avatar_url.is_none()
            && self.bio.is_none()
    }

    /// Names of the fields this update touches, for logging.
    pub fn field_names(&self) -> Vec<&'static str> {
        [
            ("username", self.username.is_some()),
            ("email", self.email.is_some()),
            ("display_name", self.display_name.is_some()),
            ("avatar_url", self.avatar_url.is_some()),
            ("bio", self.bio.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

#[derive(Debug, Clone)]
pub enum UserSearchField {
    Id(String),
    Email(String),
    GoogleId(String),
    Username(String),
}

impl std::fmt::Display for UserSearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserSearchField::Id(id) => write!(f, "id={id}"),
            UserSearchField::Email(email) => write!(f, "email={email}"),
            UserSearchField::GoogleId(google_id) => write!(f, "google_id={google_id}"),
            UserSearchField::Username(username) => write!(f, "username={username}"),
        }
    }
}

impl UserSearchField {
    pub(super) fn column(&self) -> &'static str {
        match self {
            UserSearchField::Id(_) => "id",
            UserSearchField::Email(_) => "email",
            UserSearchField::GoogleId(_) => "google_id",
            UserSearchField::Username(_) => "username",
        }
    }

    pub(super) fn value(&self) -> &str {
        match self {
            UserSearchField::Id(v)
            | UserSearchField::Email(v)
            | UserSearchField::GoogleId(v)
            | UserSearchField::Username(v) => v,
        }
    }
}
