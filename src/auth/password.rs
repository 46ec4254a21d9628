//! Argon2id password hashing. Hashing is CPU-bound, so both directions run
//! under `spawn_blocking` to keep the request executor free.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed")]
    Hash,
    #[error("Hashing task failed")]
    Join,
}

pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| PasswordError::Hash)
    })
    .await
    .map_err(|_| PasswordError::Join)?
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash).map_err(|_| PasswordError::Hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|_| PasswordError::Join)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_verifies_own_password() {
        let hash = hash_password("Sup3r$ecret").await.expect("hash");
        assert!(verify_password("Sup3r$ecret", &hash).await.expect("verify"));
        assert!(!verify_password("wrong-password", &hash).await.expect("verify"));
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let first = hash_password("Sup3r$ecret").await.expect("hash");
        let second = hash_password("Sup3r$ecret").await.expect("hash");
        assert_ne!(first, second);
    }
}
