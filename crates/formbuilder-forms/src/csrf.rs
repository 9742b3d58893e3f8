//! CSRF protection for forms.
//!
//! A protected form carries a hidden `_token_` control holding a signed
//! random token. On submission the token must come back with a valid
//! signature under the same secret key.

use formbuilder_core::signing::{random_token, Signer};

/// Name of the protection control.
pub const PROTECTOR_ID: &str = "_token_";

/// Name of the hidden field identifying which form was submitted.
pub const TRACKER_ID: &str = "_form_";

/// Error reported when the token is missing or forged.
pub const PROTECTION_MESSAGE: &str =
    "Your session has expired. Please return to the home page and try again.";

const SALT: &str = "formbuilder.forms.csrf";

/// Issues and verifies protection tokens.
#[derive(Debug, Clone)]
pub struct Protection {
    signer: Signer,
}

impl Protection {
    /// Creates a protection keyed by `secret_key`.
    pub fn new(secret_key: &str) -> Self {
        Self {
            signer: Signer::new(secret_key).with_salt(SALT),
        }
    }

    /// Issues a fresh signed token.
    pub fn generate_token(&self) -> String {
        self.signer.sign(&random_token())
    }

    /// Returns `true` if `token` was issued under this key.
    pub fn verify(&self, token: &str) -> bool {
        !token.is_empty() && self.signer.unsign(token).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_verifies() {
        let p = Protection::new("secret");
        let token = p.generate_token();
        assert!(p.verify(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let p = Protection::new("secret");
        assert_ne!(p.generate_token(), p.generate_token());
    }

    #[test]
    fn test_rejects_forged_and_foreign_tokens() {
        let p = Protection::new("secret");
        assert!(!p.verify(""));
        assert!(!p.verify("abc"));
        assert!(!p.verify("abc:def"));

        let other = Protection::new("other-secret");
        assert!(!p.verify(&other.generate_token()));
    }
}
