use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use ring::hmac;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppConfig, ConfigError, TokenError};
use super::clock::{Clock, SystemClock};
use super::secret::TokenSecret;

#[derive(Serialize, Deserialize)]
struct Claims<P> {
    payload: P,
    iat: i64,
    exp: i64,
}

/// A verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential<P> {
    pub payload: P,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies tokens with a process-wide HMAC-SHA256 key.
#[derive(Clone)]
pub struct TokenAuthority {
    key: hmac::Key,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenAuthority {
    pub fn new(secret: TokenSecret, default_ttl: Duration) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.expose()),
            default_ttl,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.token_secret()?, config.token_ttl()))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Signs `payload` with an expiry of now + `ttl` (or the default ttl).
    ///
    /// `iat` and `exp` are whole seconds. A positive ttl is rounded up to the
    /// next second boundary, so a token never lives shorter than asked; a
    /// zero or negative ttl yields a token that is already expired.
    pub fn issue<P: Serialize>(&self, payload: &P, ttl: Option<Duration>) -> Result<String, TokenError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let now = self.clock.now();
        let iat = now.timestamp();
        let exp = if ttl <= Duration::zero() {
            Some(iat)
        } else {
            now.timestamp_millis()
                .checked_add(ttl.num_milliseconds())
                .map(|millis| millis.div_euclid(1000) + i64::from(millis.rem_euclid(1000) > 0))
        }
        .filter(|exp| DateTime::from_timestamp(*exp, 0).is_some())
        .ok_or_else(|| TokenError::Encoding("token lifetime out of range".to_string()))?;

        let claims = Claims { payload, iat, exp };
        let json = serde_json::to_vec(&claims).map_err(|e| TokenError::Encoding(e.to_string()))?;

        let encoded_claims = URL_SAFE_NO_PAD.encode(json);
        let tag = hmac::sign(&self.key, encoded_claims.as_bytes());

        debug!(exp, "token issued");
        Ok(format!("{}.{}", encoded_claims, URL_SAFE_NO_PAD.encode(tag.as_ref())))
    }

    pub fn verify<P: DeserializeOwned>(&self, token: &str) -> Result<P, TokenError> {
        self.verify_credential(token).map(|credential| credential.payload)
    }

    pub fn verify_credential<P: DeserializeOwned>(&self, token: &str) -> Result<Credential<P>, TokenError> {
        let credential = self.decode(token);
        if credential.is_none() {
            debug!("token rejected");
        }
        credential.ok_or(TokenError::InvalidOrExpired)
    }

    // Every failure collapses into `None` so callers cannot tell which check failed.
    fn decode<P: DeserializeOwned>(&self, token: &str) -> Option<Credential<P>> {
        let (encoded_claims, encoded_tag) = token.split_once('.')?;
        let tag = URL_SAFE_NO_PAD.decode(encoded_tag).ok()?;
        hmac::verify(&self.key, encoded_claims.as_bytes(), &tag).ok()?;

        let json = URL_SAFE_NO_PAD.decode(encoded_claims).ok()?;
        let claims: Claims<P> = serde_json::from_slice(&json).ok()?;

        if self.clock.now().timestamp() >= claims.exp {
            return None;
        }

        Some(Credential {
            payload: claims.payload,
            issued_at: DateTime::from_timestamp(claims.iat, 0)?,
            expires_at: DateTime::from_timestamp(claims.exp, 0)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ManualClock;
    use serde_json::{json, Value};

    fn authority(clock: Arc<ManualClock>) -> TokenAuthority {
        let secret = TokenSecret::new("unit-test-secret-unit-test-secret").unwrap();
        TokenAuthority::new(secret, Duration::hours(1)).with_clock(clock)
    }

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn credential_carries_issue_and_expiry() {
        let clock = Arc::new(ManualClock::new(start()));
        let authority = authority(clock.clone());

        let token = authority.issue(&json!({"userId": "42"}), Some(Duration::seconds(90))).unwrap();
        let credential: Credential<Value> = authority.verify_credential(&token).unwrap();

        assert_eq!(credential.issued_at, start());
        assert_eq!(credential.expires_at, start() + Duration::seconds(90));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let clock = Arc::new(ManualClock::new(start()));
        let authority = authority(clock.clone());
        let token = authority.issue(&"x", Some(Duration::seconds(10))).unwrap();

        clock.advance(Duration::milliseconds(9_999));
        assert_eq!(authority.verify::<String>(&token).unwrap(), "x");

        clock.advance(Duration::milliseconds(1));
        assert_eq!(authority.verify::<String>(&token), Err(TokenError::InvalidOrExpired));
    }

    #[test]
    fn sub_second_ttl_is_rounded_up() {
        let clock = Arc::new(ManualClock::new(start()));
        let authority = authority(clock.clone());
        let token = authority.issue(&"x", Some(Duration::milliseconds(300))).unwrap();

        assert!(authority.verify::<String>(&token).is_ok());
        clock.advance(Duration::seconds(1));
        assert!(authority.verify::<String>(&token).is_err());
    }

    #[test]
    fn lifetime_is_never_shorter_than_ttl() {
        let clock = Arc::new(ManualClock::new(start()));
        let authority = authority(clock.clone());

        clock.set(start() + Duration::milliseconds(600));
        let token = authority.issue(&"x", Some(Duration::seconds(1))).unwrap();
        let credential: Credential<String> = authority.verify_credential(&token).unwrap();
        assert_eq!(credential.expires_at, start() + Duration::seconds(2));

        clock.advance(Duration::milliseconds(999));
        assert!(authority.verify::<String>(&token).is_ok());
    }

    #[test]
    fn default_ttl_applies_when_unspecified() {
        let clock = Arc::new(ManualClock::new(start()));
        let authority = authority(clock.clone());
        let token = authority.issue(&1u32, None).unwrap();

        clock.advance(Duration::minutes(59));
        assert!(authority.verify::<u32>(&token).is_ok());
        clock.advance(Duration::minutes(1));
        assert!(authority.verify::<u32>(&token).is_err());
    }

    #[test]
    fn payload_of_wrong_shape_is_rejected_like_any_other_failure() {
        let authority = authority(Arc::new(ManualClock::new(start())));
        let token = authority.issue(&json!({"userId": "42"}), None).unwrap();
        assert_eq!(authority.verify::<u64>(&token), Err(TokenError::InvalidOrExpired));
    }

    #[test]
    fn overflowing_ttl_is_an_encoding_error() {
        let authority = authority(Arc::new(ManualClock::new(start())));
        let result = authority.issue(&1u8, Some(Duration::MAX));
        assert!(matches!(result, Err(TokenError::Encoding(_))));
    }
}
