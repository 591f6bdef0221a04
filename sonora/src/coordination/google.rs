use crate::coordination::{
    errors::CoordinationError,
    types::{AuthOutcome, GoogleIdentity},
};
use crate::session::SessionManager;
use crate::userdb::{NewUser, UserSearchField, UserStore, UserUpdate};

/// Finds or creates the account for a verified Google identity and opens a session.
///
/// An existing account without an avatar picks up the Google picture (and name, when
/// given) on sign-in.
pub async fn complete_google_login(
    users: &UserStore,
    sessions: &SessionManager,
    identity: GoogleIdentity,
) -> Result<AuthOutcome, CoordinationError> {
    let existing = users
        .get_user_by(UserSearchField::GoogleId(identity.google_id.clone()))
        .await?;

    let user = match existing {
        Some(user) => {
            if user.avatar_url.is_none() && identity.picture.is_some() {
                let update = UserUpdate {
                    avatar_url: identity.picture.clone(),
                    display_name: identity.name.clone().or_else(|| user.display_name.clone()),
                    ..UserUpdate::default()
                };
                match users.update_user(&user.id, update).await? {
                    Some(updated) => {
                        tracing::info!(
                            component = "auth",
                            user_id = %updated.id,
                            "Updated user avatar from Google"
                        );
                        updated
                    }
                    None => user,
                }
            } else {
                user
            }
        }
        None => {
            let created = users
                .create_user(NewUser {
                    email: identity.email.to_lowercase(),
                    display_name: identity.name.clone(),
                    google_id: Some(identity.google_id.clone()),
                    avatar_url: identity.picture.clone(),
                    ..NewUser::default()
                })
                .await?;
            tracing::info!(
                component = "auth",
                user_id = %created.id,
                login_method = "google_oauth",
                "New user created via Google"
            );
            created
        }
    };

    let (token, session) = sessions.start_session(&user.id).await?;

    tracing::info!(
        component = "auth",
        user_id = %user.id,
        session_id = %session.id,
        login_method = "google_oauth",
        "User authenticated via Google"
    );
    Ok(AuthOutcome {
        user,
        token,
        session,
    })
}
