//! Password hashing and verification

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use thiserror::Error;

/// Credential store failures
#[derive(Error, Debug)]
pub enum CredentialError {
    /// The hashing library or its RNG failed
    #[error("failed to hash password: {0}")]
    Hashing(String),

    /// The password does not match the stored digest
    #[error("password does not match")]
    Mismatch,
}

/// Hash a password into a salted PHC-format Argon2 digest
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hashing(e.to_string()))
}

/// Verify a password against a stored digest.
///
/// An unparsable digest can never match, so it is reported as a mismatch.
pub fn verify_password(digest: &str, password: &str) -> Result<(), CredentialError> {
    let parsed_hash = PasswordHash::new(digest).map_err(|_| CredentialError::Mismatch)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| CredentialError::Mismatch)
}

/// [`hash_password`] on the blocking thread pool
pub async fn hash_off_thread(password: String) -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CredentialError::Hashing(e.to_string()))?
}

/// [`verify_password`] on the blocking thread pool
pub async fn verify_off_thread(digest: String, password: String) -> Result<(), CredentialError> {
    tokio::task::spawn_blocking(move || verify_password(&digest, &password))
        .await
        .map_err(|e| CredentialError::Hashing(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let password = "MySecurePass123";
        let digest = hash_password(password).unwrap();

        assert!(digest.starts_with("$argon2"));
        assert!(!digest.contains(password));
        assert!(verify_password(&digest, password).is_ok());
    }

    #[test]
    fn test_verify_rejects_other_passwords() {
        let digest = hash_password("correct horse").unwrap();

        for wrong in ["", "correct horse ", "Correct horse", "battery staple"] {
            assert!(matches!(
                verify_password(&digest, wrong),
                Err(CredentialError::Mismatch)
            ));
        }
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let first = hash_password("repeat-me").unwrap();
        let second = hash_password("repeat-me").unwrap();

        assert_ne!(first, second);
        assert!(verify_password(&first, "repeat-me").is_ok());
        assert!(verify_password(&second, "repeat-me").is_ok());
    }

    #[test]
    fn test_garbage_digest_is_mismatch() {
        assert!(matches!(
            verify_password("not-a-phc-string", "anything"),
            Err(CredentialError::Mismatch)
        ));
    }

    #[tokio::test]
    async fn test_off_thread_round_trip() {
        let digest = hash_off_thread("off-thread-pass".to_string()).await.unwrap();

        assert!(
            verify_off_thread(digest.clone(), "off-thread-pass".to_string())
                .await
                .is_ok()
        );
        assert!(matches!(
            verify_off_thread(digest, "other-pass".to_string()).await,
            Err(CredentialError::Mismatch)
        ));
    }
}
