use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::{error, warn};

lazy_static! {
    // Verified against when the account does not exist, so an unknown email
    // costs the same Argon2 work as a wrong password.
    static ref DUMMY_HASH: String =
        hash_password("dummy-password-for-unknown-accounts").unwrap_or_default();
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Returns `false` for a wrong password and for a hash that does not parse.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Verifies against the stored hash, or against a throwaway hash when there is
/// no account. The latter always returns `false`.
pub fn verify_or_dummy(plain: &str, hash: Option<&str>) -> bool {
    match hash {
        Some(hash) => verify_password(plain, hash),
        None => {
            let _ = verify_password(plain, &DUMMY_HASH);
            false
        }
    }
}

/// `hash_password` on the blocking pool.
pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

/// `verify_or_dummy` on the blocking pool.
pub async fn verify_blocking(plain: String, hash: Option<String>) -> anyhow::Result<bool> {
    let ok = tokio::task::spawn_blocking(move || verify_or_dummy(&plain, hash.as_deref())).await?;
    Ok(ok)
}
