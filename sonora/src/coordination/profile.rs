use crate::coordination::{errors::CoordinationError, types::ProfileUpdate};
use crate::userdb::{User, UserStore, UserUpdate};

use super::validation::validate_email;

/// Applies a self-service profile edit. Returns `None` if the user no longer exists.
pub async fn update_profile(
    users: &UserStore,
    user_id: &str,
    update: ProfileUpdate,
) -> Result<Option<User>, CoordinationError> {
    let update = UserUpdate {
        username: update.username,
        email: update.email,
        bio: update.bio,
        avatar_url: update.avatar,
        display_name: None,
    };

    if update.is_empty() {
        tracing::warn!(
            component = "api",
            %user_id,
            "No valid fields provided for profile update"
        );
        return Err(CoordinationError::Validation(
            "No valid fields provided".to_string(),
        ));
    }
    if let Some(email) = update.email.as_deref() {
        validate_email(email)?;
    }

    let fields = update.field_names();
    let updated = users.update_user(user_id, update).await?;

    if updated.is_some() {
        tracing::info!(component = "api", %user_id, ?fields, "User profile updated");
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::test_support::harness;
    use crate::userdb::NewUser;

    #[tokio::test]
    async fn test_update_allowed_fields() {
        let h = harness().await;
        let user = h
            .users
            .create_user(NewUser {
                email: "me@x.com".to_string(),
                ..NewUser::default()
            })
            .await
            .unwrap();

        let updated = update_profile(
            &h.users,
            &user.id,
            ProfileUpdate {
                bio: Some("Synth nerd".to_string()),
                avatar: Some("https://img/me.png".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.bio.as_deref(), Some("Synth nerd"));
        assert_eq!(updated.avatar_url.as_deref(), Some("https://img/me.png"));
        assert_eq!(updated.email, "me@x.com");
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let h = harness().await;
        let err = update_profile(&h.users, "any", ProfileUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CoordinationError::Validation("No valid fields provided".to_string())
        );
    }

    #[tokio::test]
    async fn test_bad_email_rejected() {
        let h = harness().await;
        let err = update_profile(
            &h.users,
            "any",
            ProfileUpdate {
                email: Some("not-an-email".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            err,
            CoordinationError::Validation("Invalid email format".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let h = harness().await;
        let result = update_profile(
            &h.users,
            "ghost",
            ProfileUpdate {
                bio: Some("x".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();
        assert!(result.is_none());
    }
}
