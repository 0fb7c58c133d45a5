//! Random bearer tokens: session tokens and checkout confirmation codes.
//!
//! Both are fixed-length lowercase hex strings. The random bytes come from the
//! caller (the storefront draws them from a CSPRNG); this module owns the shape
//! and the parsing of untrusted input.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a token.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Wrong number of characters.
    #[error("token must be {expected} characters long (got {got})")]
    Length {
        /// Required length.
        expected: usize,
        /// Actual length.
        got: usize,
    },
    /// Characters outside `[0-9a-f]`.
    #[error("token must contain only lowercase hex characters")]
    NotHex,
}

fn parse_hex(s: &str, expected: usize) -> Result<String, TokenError> {
    if s.len() != expected {
        return Err(TokenError::Length {
            expected,
            got: s.len(),
        });
    }
    if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(TokenError::NotHex);
    }
    Ok(s.to_owned())
}

/// Bearer token identifying a logged-in session.
///
/// 16 random bytes, hex-encoded (32 characters). Whoever presents it acts as
/// the session's user, so `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Number of random bytes behind a token.
    pub const BYTES: usize = 16;
    /// Length of the hex encoding.
    pub const LEN: usize = Self::BYTES * 2;

    /// Build a token from freshly generated random bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; Self::BYTES]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Parse a token presented by a client.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if the input is not exactly 32 lowercase hex characters.
    pub fn parse(s: &str) -> Result<Self, TokenError> {
        parse_hex(s, Self::LEN).map(Self)
    }

    /// The token string, for returning to the client or hashing.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Identifier shared by every order line of one checkout.
///
/// 32 random bytes, hex-encoded (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    /// Number of random bytes behind a code.
    pub const BYTES: usize = 32;
    /// Length of the hex encoding.
    pub const LEN: usize = Self::BYTES * 2;

    /// Build a code from freshly generated random bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; Self::BYTES]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Parse a stored or client-supplied code.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if the input is not exactly 64 lowercase hex characters.
    pub fn parse(s: &str) -> Result<Self, TokenError> {
        parse_hex(s, Self::LEN).map(Self)
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ConfirmationCode {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ConfirmationCode> for String {
    fn from(code: ConfirmationCode) -> Self {
        code.0
    }
}

#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for ConfirmationCode {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for ConfirmationCode {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for ConfirmationCode {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_from_bytes() {
        let token = SessionToken::from_bytes(&[0xab; SessionToken::BYTES]);
        assert_eq!(token.expose().len(), 32);
        assert_eq!(token.expose(), "ab".repeat(16));
    }

    #[test]
    fn test_session_token_parse() {
        let raw = "0123456789abcdef0123456789abcdef";
        assert_eq!(SessionToken::parse(raw).unwrap().expose(), raw);

        assert_eq!(
            SessionToken::parse("abc"),
            Err(TokenError::Length {
                expected: 32,
                got: 3
            })
        );
        assert_eq!(
            SessionToken::parse("0123456789ABCDEF0123456789ABCDEF"),
            Err(TokenError::NotHex)
        );
        assert_eq!(
            SessionToken::parse("' OR 1=1 --xxxxxxxxxxxxxxxxxxxxx"),
            Err(TokenError::NotHex)
        );
    }

    #[test]
    fn test_session_token_debug_is_redacted() {
        let token = SessionToken::from_bytes(&[7; SessionToken::BYTES]);
        let debug = format!("{token:?}");
        assert!(!debug.contains("0707"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_confirmation_code_shape() {
        let code = ConfirmationCode::from_bytes(&[0x1f; ConfirmationCode::BYTES]);
        assert_eq!(code.as_str().len(), 64);
        assert_eq!(ConfirmationCode::parse(code.as_str()).unwrap(), code);
    }

    #[test]
    fn test_confirmation_code_deserialize_validates() {
        let good = format!("\"{}\"", "c".repeat(64));
        assert!(serde_json::from_str::<ConfirmationCode>(&good).is_ok());
        assert!(serde_json::from_str::<ConfirmationCode>("\"short\"").is_err());
    }
}
