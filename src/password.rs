//! Admin password storage: argon2id PHC strings.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks login attempts against stored admin hashes.
///
/// Attempts for unknown usernames are verified against a throwaway hash, so a miss costs the
/// same argon2 run as a wrong password.
#[derive(Clone)]
pub struct AdminCredentials {
    unknown_admin_hash: String,
}

impl AdminCredentials {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            unknown_admin_hash: hash_password("mindcheck-unknown-admin")?,
        })
    }

    /// `stored_hash` is `None` when no admin has the submitted username.
    pub fn check(&self, stored_hash: Option<&str>, password: &str) -> Result<bool, AppError> {
        let hash = stored_hash.unwrap_or(&self.unknown_admin_hash);
        let parsed = PasswordHash::new(hash)?;
        let matches = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();

        Ok(matches && stored_hash.is_some())
    }
}
