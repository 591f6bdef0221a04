use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::credential::errors::CredentialError;
use crate::utils::random_bytes;

const MEMORY_COST_KIB: u32 = 19_456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;
const SALT_LEN: usize = 16;

/// Well-formed digest with the pinned parameters that no password matches. Verifying against
/// it costs the same as a real check.
const ABSENT_DIGEST: &str = "$argon2id$v=19$m=19456,t=2,p=1$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Argon2id password hashing with fixed parameters.
///
/// Both operations run on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialHasher;

fn argon2() -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| CredentialError::Hash(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

impl CredentialHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hashes `password` into a PHC string (`$argon2id$v=19$m=19456,t=2,p=1$...`).
    pub async fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|e| CredentialError::Task(e.to_string()))?
    }

    /// Checks `password` against a stored PHC string. A digest that does not parse yields
    /// `Ok(false)`.
    pub async fn verify(&self, password: &str, digest: &str) -> Result<bool, CredentialError> {
        let password = password.to_owned();
        let digest = digest.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &digest))
            .await
            .map_err(|e| CredentialError::Task(e.to_string()))?
    }

    /// Like [`verify`](Self::verify), but an account with no stored digest still pays for a
    /// full Argon2 run and then fails.
    pub async fn verify_stored(
        &self,
        password: &str,
        digest: Option<&str>,
    ) -> Result<bool, CredentialError> {
        match digest {
            Some(digest) => self.verify(password, digest).await,
            None => {
                self.verify(password, ABSENT_DIGEST).await?;
                Ok(false)
            }
        }
    }
}

fn hash_blocking(password: &str) -> Result<String, CredentialError> {
    let salt_bytes = random_bytes(SALT_LEN).map_err(|e| CredentialError::Crypto(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Hash(e.to_string()))?;

    Ok(argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredentialError::Hash(e.to_string()))?
        .to_string())
}

fn verify_blocking(password: &str, digest: &str) -> Result<bool, CredentialError> {
    let Ok(parsed) = PasswordHash::new(digest) else {
        tracing::debug!("Stored password digest is not a valid PHC string");
        return Ok(false);
    };
    Ok(argon2()?
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_uses_pinned_parameters() {
        let digest = CredentialHasher::new().hash("longenough1").await.unwrap();

        assert!(digest.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        let parsed = PasswordHash::new(&digest).unwrap();
        assert_eq!(parsed.hash.unwrap().len(), OUTPUT_LEN);
        assert_eq!(parsed.salt.unwrap().decode_b64(&mut [0u8; 64]).unwrap().len(), SALT_LEN);
    }

    #[tokio::test]
    async fn test_verify_round_trip() {
        let hasher = CredentialHasher::new();
        let digest = hasher.hash("correct horse").await.unwrap();

        assert!(hasher.verify("correct horse", &digest).await.unwrap());
        assert!(!hasher.verify("wrong horse", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_password_gets_distinct_salts() {
        let hasher = CredentialHasher::new();
        let a = hasher.hash("repeat").await.unwrap();
        let b = hasher.hash("repeat").await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_absent_digest_carries_pinned_parameters() {
        let parsed = PasswordHash::new(ABSENT_DIGEST).unwrap();
        let params = Params::try_from(&parsed).unwrap();

        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert_eq!(params.m_cost(), MEMORY_COST_KIB);
        assert_eq!(params.t_cost(), TIME_COST);
        assert_eq!(params.p_cost(), PARALLELISM);
        assert_eq!(parsed.hash.unwrap().len(), OUTPUT_LEN);
    }

    #[tokio::test]
    async fn test_verify_stored_without_digest_fails() {
        let hasher = CredentialHasher::new();
        let digest = hasher.hash("longenough1").await.unwrap();

        assert!(hasher.verify_stored("longenough1", Some(&digest)).await.unwrap());
        assert!(!hasher.verify_stored("longenough1", None).await.unwrap());
        assert!(!hasher.verify_stored("", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_digest_is_false_not_error() {
        let hasher = CredentialHasher::new();
        assert!(!hasher.verify("anything", "not-a-phc-string").await.unwrap());
        assert!(!hasher.verify("anything", "").await.unwrap());
    }
}
