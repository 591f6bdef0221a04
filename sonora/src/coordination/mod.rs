//! Account flows that span the user store, the credential hasher and the session manager:
//! password login and registration, Google sign-in completion and profile edits.

mod errors;
mod google;
mod password;
mod profile;
mod types;
mod validation;

pub use errors::CoordinationError;
pub use google::complete_google_login;
pub use password::{login_with_password, register_with_password};
pub use profile::update_profile;
pub use types::{AuthOutcome, GoogleIdentity, LoginForm, ProfileUpdate, RegisterForm};
pub use validation::{MIN_PASSWORD_LENGTH, validate_email};

#[cfg(test)]
mod test_support;
