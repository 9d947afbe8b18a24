//! Argon2id password hashes in PHC string form.

use std::sync::OnceLock;

use argon2::password_hash::{self, PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, Version};

use warden_core::error::AppError;
use warden_core::result::AppResult;

/// Argon2id v19 hasher. Verification reads the cost parameters from the
/// stored hash, so hashes made with older parameters keep verifying.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    /// Hasher with the library's recommended cost parameters.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// PHC string (`$argon2id$v=19$...`) with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        use argon2::password_hash::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::internal(format!("Cannot hash password: {e}")))
    }

    /// `Ok(false)` on a wrong password. `Err` only when `stored` is not a
    /// readable hash.
    pub fn verify_password(&self, password: &str, stored: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| AppError::internal(format!("Stored password hash is unreadable: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!("Cannot verify password: {e}"))),
        }
    }

    /// Burns one verification and returns `false`. Sign-in calls this for
    /// unknown usernames so timing does not reveal which ones exist.
    pub fn verify_against_dummy(&self, password: &str) -> bool {
        static DUMMY: OnceLock<Option<String>> = OnceLock::new();
        let dummy = DUMMY.get_or_init(|| Self::new().hash_password("dummy-password").ok());
        if let Some(hash) = dummy {
            let _ = self.verify_password(password, hash);
        }
        false
    }
}
