use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::TokenError;

const RECOMMENDED_SECRET_LEN: usize = 32;

/// Signing key material. `Debug` output is redacted.
#[derive(Debug)]
pub struct TokenSecret(SecretString);

impl TokenSecret {
    pub fn new(raw: impl Into<String>) -> Result<Self, TokenError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        if raw.len() < RECOMMENDED_SECRET_LEN {
            warn!(
                len = raw.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "token secret is shorter than recommended"
            );
        }
        Ok(Self(SecretString::new(raw)))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = TokenSecret::new("correct horse battery staple").unwrap();
        let printed = format!("{:?}", secret);
        assert!(!printed.contains("horse"));
    }

    #[test]
    fn empty_secret_is_missing() {
        assert_eq!(TokenSecret::new("").unwrap_err(), TokenError::MissingSecret);
    }
}
