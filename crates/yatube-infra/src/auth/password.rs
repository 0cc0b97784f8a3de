//! Argon2 password hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use yatube_core::ports::{AuthError, PasswordService};

/// Stores passwords as Argon2id PHC strings.
#[derive(Default)]
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// A stored value that is not a PHC string never matches, so accounts
    /// without a usable password cannot log in.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let Ok(parsed) = PasswordHash::new(hash) else {
            tracing::debug!("Stored password is not a usable hash");
            return Ok(false);
        };

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_round_trip() {
        let service = Argon2PasswordService::new();

        let hash = service.hash("war-and-peace").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify("war-and-peace", &hash).unwrap());
        assert!(!service.verify("anna-karenina", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let service = Argon2PasswordService::new();
        assert_ne!(service.hash("same").unwrap(), service.hash("same").unwrap());
    }

    #[test]
    fn test_unusable_hash_never_matches() {
        let service = Argon2PasswordService::new();
        assert!(!service.verify("anything", "!unusable").unwrap());
    }
}
