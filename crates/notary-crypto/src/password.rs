//! Argon2id password digests for the user table.
//!
//! Digests are stored in PHC string format (`$argon2id$v=19$...`), which
//! embeds the salt and parameters, so verification needs only the digest.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::CryptoError;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CryptoError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CryptoError::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC digest.
///
/// Returns `Ok(false)` on a wrong password and `Err` only when the stored
/// digest itself cannot be parsed.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, CryptoError> {
    let parsed = PasswordHash::new(digest).map_err(|e| CryptoError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let digest = hash_password("correct horse").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &digest).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let digest = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &digest).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
    }

    #[test]
    fn garbage_digest_is_an_error() {
        assert!(matches!(
            verify_password("pw", "not-a-phc-string"),
            Err(CryptoError::PasswordHash(_))
        ));
    }
}
