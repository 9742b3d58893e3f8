//! Cryptographic signing for CSRF protection tokens.
//!
//! - [`Signer`]: signs and verifies strings using HMAC-SHA256.
//! - [`random_token`]: generates an unguessable URL-safe token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::error::{FormBuilderError, FormBuilderResult};

type HmacSha256 = Hmac<Sha256>;

/// The separator used between value and signature.
const DEFAULT_SEP: &str = ":";

/// Number of random bytes in a token generated by [`random_token`].
const TOKEN_BYTES: usize = 24;

/// Signs and verifies strings using HMAC-SHA256.
///
/// # Examples
///
/// ```
/// use formbuilder_core::signing::Signer;
///
/// let signer = Signer::new("my-secret-key");
/// let signed = signer.sign("hello");
/// assert_eq!(signer.unsign(&signed).unwrap(), "hello");
/// ```
#[derive(Debug, Clone)]
pub struct Signer {
    key: String,
    salt: String,
}

impl Signer {
    /// Creates a new `Signer` with the given secret key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            salt: "formbuilder.signing.Signer".to_string(),
        }
    }

    /// Sets the salt for the HMAC.
    #[must_use]
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    fn make_signature(&self, value: &str) -> String {
        let salted_key = format!("{}:{}", self.salt, self.key);
        let mut mac =
            HmacSha256::new_from_slice(salted_key.as_bytes()).expect("HMAC accepts any key size");
        mac.update(value.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    /// Signs a value, returning `"value:signature"`.
    pub fn sign(&self, value: &str) -> String {
        format!("{value}{DEFAULT_SEP}{}", self.make_signature(value))
    }

    /// Verifies and returns the original value from a signed string.
    pub fn unsign(&self, signed_value: &str) -> FormBuilderResult<String> {
        let (value, sig) = signed_value.rsplit_once(DEFAULT_SEP).ok_or_else(|| {
            FormBuilderError::InvalidValue("No separator found in signed value".to_string())
        })?;

        if constant_time_eq(sig, &self.make_signature(value)) {
            Ok(value.to_string())
        } else {
            Err(FormBuilderError::InvalidValue(
                "Signature verification failed".to_string(),
            ))
        }
    }
}

/// Generates a random URL-safe token.
pub fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compares two strings in constant time.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
