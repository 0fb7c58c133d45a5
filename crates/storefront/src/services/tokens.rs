//! Random token generation and session digests.
//!
//! Tokens come from the thread-local CSPRNG. The database stores only a
//! keyed digest of each session token, never the token itself.

use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use kicks_core::{ConfirmationCode, SessionToken};

type HmacSha256 = Hmac<Sha256>;

/// Generate a fresh session token (16 random bytes, 32 hex characters).
#[must_use]
pub fn generate_session_token() -> SessionToken {
    let mut bytes = [0u8; SessionToken::BYTES];
    rand::rng().fill_bytes(&mut bytes);
    SessionToken::from_bytes(&bytes)
}

/// Generate a fresh checkout confirmation code (32 random bytes, 64 hex characters).
#[must_use]
pub fn generate_confirmation_code() -> ConfirmationCode {
    let mut bytes = [0u8; ConfirmationCode::BYTES];
    rand::rng().fill_bytes(&mut bytes);
    ConfirmationCode::from_bytes(&bytes)
}

/// HMAC-SHA256 of a session token under the server's session secret, hex-encoded.
///
/// # Panics
///
/// Never in practice: HMAC accepts keys of any length.
#[must_use]
#[allow(clippy::expect_used)]
pub fn session_digest(secret: &SecretString, token: &SessionToken) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(token.expose().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
