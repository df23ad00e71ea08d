// ABOUTME: Salted password hashing with Argon2id, stored as PHC strings.
// ABOUTME: Verification always performs a full hash comparison, even for unusable stored hashes.

use std::sync::LazyLock;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;

const SALT_LENGTH: usize = 16;

// Compared against when the stored hash is unusable, so a failed lookup costs
// the same as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("lintulista-dummy-password").ok());

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let mut salt_bytes = [0u8; SALT_LENGTH];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)?;

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check `password` against a stored PHC string. CPU-bound; run it on the
/// blocking pool from async code.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(stored_hash) {
        return Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
    }

    tracing::warn!("stored password hash is unparsable; comparing against dummy hash");
    if let Some(parsed) = DUMMY_HASH
        .as_deref()
        .and_then(|dummy| PasswordHash::new(dummy).ok())
    {
        let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
    }
    false
}
