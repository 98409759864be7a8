//! Password hashing
//!
//! PBKDF2-HMAC-SHA256 with a random salt, stored as
//! `pbkdf2-sha256$<rounds>$<salt b64>$<hash b64>`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use sha2::Sha256;

use crate::core::constants::{PASSWORD_HASH_ROUNDS, PASSWORD_SALT_LEN};
use crate::utils::crypto;

const SCHEME: &str = "pbkdf2-sha256";
const HASH_LEN: usize = 32;

/// Hash a password with the default work factor
pub fn hash_password(password: &str) -> String {
    hash_password_with_rounds(password, PASSWORD_HASH_ROUNDS)
}

/// Hash a password with an explicit work factor
pub fn hash_password_with_rounds(password: &str, rounds: u32) -> String {
    let salt = crypto::generate_key(PASSWORD_SALT_LEN);
    let hash = derive(password, &salt, rounds);
    format!(
        "{}${}${}${}",
        SCHEME,
        rounds,
        STANDARD_NO_PAD.encode(&salt),
        STANDARD_NO_PAD.encode(hash)
    )
}

/// Check a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(rounds), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (STANDARD_NO_PAD.decode(salt), STANDARD_NO_PAD.decode(expected))
    else {
        return false;
    };
    if rounds == 0 || expected.len() != HASH_LEN {
        return false;
    }

    crypto::constant_time_eq(&derive(password, &salt, rounds), &expected)
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut out);
    out
}
