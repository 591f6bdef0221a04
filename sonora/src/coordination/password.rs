use crate::coordination::{
    errors::CoordinationError,
    types::{AuthOutcome, LoginForm, RegisterForm, non_blank},
    validation::{MIN_PASSWORD_LENGTH, validate_email},
};
use crate::credential::CredentialHasher;
use crate::session::SessionManager;
use crate::userdb::{NewUser, UserSearchField, UserStore};

/// Verifies an email/password pair and opens a session.
///
/// Unknown accounts, accounts without a password and wrong passwords all fail with the same
/// [`CoordinationError::InvalidCredentials`], and all of them run one Argon2 verification.
pub async fn login_with_password(
    users: &UserStore,
    hasher: &CredentialHasher,
    sessions: &SessionManager,
    form: LoginForm,
) -> Result<AuthOutcome, CoordinationError> {
    let (Some(email), Some(password)) = (non_blank(form.email), non_blank(form.password)) else {
        tracing::warn!(component = "auth", "Login attempt with missing credentials");
        return Err(CoordinationError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    if let Err(e) = validate_email(&email) {
        tracing::warn!(component = "auth", "Login attempt with invalid email format");
        return Err(e);
    }

    let stored = users.get_stored_user_by_email(&email).await?;
    let digest = stored.as_ref().and_then(|s| s.hashed_password.as_deref());
    let verified = hasher.verify_stored(&password, digest).await?;

    let Some(stored) = stored else {
        tracing::warn!(target: "security", %email, "Login attempt for unknown account");
        return Err(CoordinationError::InvalidCredentials);
    };
    if stored.hashed_password.is_none() {
        tracing::warn!(
            target: "security",
            user_id = %stored.user.id,
            "Password login attempt on OAuth-only account"
        );
        return Err(CoordinationError::InvalidCredentials);
    }
    if !verified {
        tracing::warn!(target: "security", user_id = %stored.user.id, "Failed login attempt");
        return Err(CoordinationError::InvalidCredentials);
    }

    let user = stored.user;
    let (token, session) = sessions.start_session(&user.id).await?;

    tracing::info!(
        component = "auth",
        user_id = %user.id,
        session_id = %session.id,
        login_method = "password",
        "User logged in"
    );
    Ok(AuthOutcome {
        user,
        token,
        session,
    })
}

/// Creates a password account and signs it in.
pub async fn register_with_password(
    users: &UserStore,
    hasher: &CredentialHasher,
    sessions: &SessionManager,
    form: RegisterForm,
) -> Result<AuthOutcome, CoordinationError> {
    let (Some(email), Some(password), Some(confirm_password)) = (
        non_blank(form.email),
        non_blank(form.password),
        non_blank(form.confirm_password),
    ) else {
        tracing::warn!(component = "auth", "Register attempt with missing credentials");
        return Err(CoordinationError::Validation(
            "Email, password and confirm password are required".to_string(),
        ));
    };

    validate_email(&email)?;

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoordinationError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    if password != confirm_password {
        return Err(CoordinationError::Validation(
            "Passwords do not match".to_string(),
        ));
    }

    let email = email.to_lowercase();
    if users
        .get_user_by(UserSearchField::Email(email.clone()))
        .await?
        .is_some()
    {
        tracing::warn!(component = "auth", "Register attempt with existing email");
        return Err(CoordinationError::Validation(
            "A user with this email already exists".to_string(),
        ));
    }

    let hashed_password = hasher.hash(&password).await?;
    let user = users
        .create_user(NewUser {
            email,
            display_name: non_blank(form.display_name),
            hashed_password: Some(hashed_password),
            ..NewUser::default()
        })
        .await?;

    let (token, session) = sessions.start_session(&user.id).await?;

    tracing::info!(
        component = "auth",
        user_id = %user.id,
        session_id = %session.id,
        login_method = "password",
        "New user registered and signed in"
    );
    Ok(AuthOutcome {
        user,
        token,
        session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::test_support::{Harness, harness};

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn register(email: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            confirm_password: Some(confirm.to_string()),
            display_name: None,
        }
    }

    async fn registered(h: &Harness, email: &str, password: &str) -> AuthOutcome {
        register_with_password(
            &h.users,
            &h.hasher,
            &h.sessions,
            register(email, password, password),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_register_creates_user_and_session() {
        let h = harness().await;

        let outcome = registered(&h, "A@x.com", "longenough1").await;

        assert_eq!(outcome.user.email, "a@x.com");
        assert_eq!(outcome.user.display_name.as_deref(), Some("a"));
        assert!(h.sessions.validate_token(&outcome.token).await.unwrap().is_valid());
        let stored = h
            .users
            .get_stored_user_by_email("a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.hashed_password.unwrap().starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_validation_messages() {
        let h = harness().await;
        registered(&h, "taken@x.com", "longenough1").await;

        let cases = [
            (
                RegisterForm::default(),
                "Email, password and confirm password are required",
            ),
            (register("nope", "longenough1", "longenough1"), "Invalid email format"),
            (
                register("b@x.com", "short", "short"),
                "Password must be at least 8 characters long",
            ),
            (
                register("b@x.com", "longenough1", "longenough2"),
                "Passwords do not match",
            ),
            (
                register("TAKEN@x.com", "longenough1", "longenough1"),
                "A user with this email already exists",
            ),
        ];

        for (form, message) in cases {
            let err = register_with_password(&h.users, &h.hasher, &h.sessions, form)
                .await
                .unwrap_err();
            assert_eq!(err, CoordinationError::Validation(message.to_string()));
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let h = harness().await;
        let registered = registered(&h, "a@x.com", "longenough1").await;

        let outcome = login_with_password(
            &h.users,
            &h.hasher,
            &h.sessions,
            login("A@X.com", "longenough1"),
        )
        .await
        .unwrap();

        assert_eq!(outcome.user.id, registered.user.id);
        assert_ne!(outcome.token, registered.token);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let h = harness().await;
        registered(&h, "a@x.com", "longenough1").await;
        h.users
            .create_user(NewUser {
                email: "oauth@x.com".to_string(),
                google_id: Some("g-1".to_string()),
                ..NewUser::default()
            })
            .await
            .unwrap();

        for form in [
            login("a@x.com", "wrong-password"),
            login("ghost@x.com", "longenough1"),
            login("oauth@x.com", "longenough1"),
        ] {
            let err = login_with_password(&h.users, &h.hasher, &h.sessions, form)
                .await
                .unwrap_err();
            assert_eq!(err, CoordinationError::InvalidCredentials);
        }
    }

    #[tokio::test]
    async fn test_unknown_account_costs_a_full_verification() {
        // Given one real account
        let h = harness().await;
        registered(&h, "known@x.com", "longenough1").await;

        // When a wrong password and an unknown account are each tried
        let start = std::time::Instant::now();
        let wrong = login_with_password(
            &h.users,
            &h.hasher,
            &h.sessions,
            login("known@x.com", "not-it-at-all"),
        )
        .await;
        let wrong_elapsed = start.elapsed();

        let start = std::time::Instant::now();
        let unknown = login_with_password(
            &h.users,
            &h.hasher,
            &h.sessions,
            login("ghost@x.com", "not-it-at-all"),
        )
        .await;
        let unknown_elapsed = start.elapsed();

        // Then both fail the same way and both paid for Argon2
        assert_eq!(wrong.unwrap_err(), CoordinationError::InvalidCredentials);
        assert_eq!(unknown.unwrap_err(), CoordinationError::InvalidCredentials);
        assert!(
            unknown_elapsed * 4 >= wrong_elapsed,
            "unknown account answered in {unknown_elapsed:?}, wrong password in {wrong_elapsed:?}"
        );
    }

    #[tokio::test]
    async fn test_login_input_validation() {
        let h = harness().await;

        let missing = login_with_password(&h.users, &h.hasher, &h.sessions, login("a@x.com", ""))
            .await
            .unwrap_err();
        assert_eq!(
            missing,
            CoordinationError::Validation("Email and password are required".to_string())
        );

        let malformed =
            login_with_password(&h.users, &h.hasher, &h.sessions, login("a-at-x", "longenough1"))
                .await
                .unwrap_err();
        assert_eq!(
            malformed,
            CoordinationError::Validation("Invalid email format".to_string())
        );
    }
}
