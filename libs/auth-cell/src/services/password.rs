use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use tracing::instrument;

pub struct PasswordService;

impl PasswordService {
    #[instrument(skip(password))]
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// `Ok(false)` for a wrong password; `Err` only for a malformed hash.
    #[instrument(skip(password, hash))]
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = PasswordService::hash_password("s3cret-pass").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(PasswordService::verify_password("s3cret-pass", &hash).unwrap());
        assert!(!PasswordService::verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_fresh_salt() {
        let a = PasswordService::hash_password("s3cret-pass").unwrap();
        let b = PasswordService::hash_password("s3cret-pass").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn plaintext_stored_value_is_rejected() {
        assert!(PasswordService::verify_password("s3cret-pass", "s3cret-pass").is_err());
    }
}
