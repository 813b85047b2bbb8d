use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

const SCHEME: &str = "pbkdf2-sha256";
const KEY_LEN: usize = 32;
const SALT_LEN: usize = 32;

pub const DEFAULT_ROUNDS: u32 = 60_000;
pub const MIN_ROUNDS: u32 = 1_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must not be empty")]
    Empty,
    #[error("malformed password hash")]
    Malformed,
}

/// Two v4 UUIDs; each carries 122 random bits.
fn fresh_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    salt[..16].copy_from_slice(Uuid::new_v4().as_bytes());
    salt[16..].copy_from_slice(Uuid::new_v4().as_bytes());
    salt
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut key);
    key
}

/// Hashes with a fresh random salt. The encoded form carries its own
/// round count so stored hashes survive a change of configuration.
pub fn hash_password(password: &str, rounds: u32) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }
    let rounds = rounds.max(MIN_ROUNDS);
    let salt = fresh_salt();
    let key = derive(password, &salt, rounds);
    Ok(format!(
        "{SCHEME}${rounds}${}${}",
        hex::encode(salt),
        hex::encode(key)
    ))
}

pub fn verify_password(candidate: &str, encoded: &str) -> Result<bool, PasswordError> {
    let mut parts = encoded.split('$');
    let (Some(scheme), Some(rounds), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(PasswordError::Malformed);
    };
    if scheme != SCHEME {
        return Err(PasswordError::Malformed);
    }
    let rounds: u32 = rounds.parse().map_err(|_| PasswordError::Malformed)?;
    let salt = hex::decode(salt).map_err(|_| PasswordError::Malformed)?;
    let expected = hex::decode(expected).map_err(|_| PasswordError::Malformed)?;
    if expected.len() != KEY_LEN {
        return Err(PasswordError::Malformed);
    }

    let actual = derive(candidate, &salt, rounds);
    let diff = actual
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));
    Ok(diff == 0)
}
