//! Credential generators used for default proxy settings

use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use uuid::Uuid;

/// Number of random bytes behind a generated password.
const PASSWORD_BYTES: usize = 16;

/// Generate a random URL-safe password
///
/// # Returns
///
/// A non-empty printable string made of `[A-Za-z0-9_-]`, encoding
/// 16 bytes from the thread-local CSPRNG
pub fn random_password() -> String {
    let mut buf = [0u8; PASSWORD_BYTES];
    rand::rng().fill_bytes(&mut buf);
    general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

/// Generate a random (version 4) UUID
pub fn random_uuid() -> Uuid {
    Uuid::new_v4()
}
