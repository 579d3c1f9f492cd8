use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;

use greencart::token::TokenAuthority;
use greencart::TokenError;

/// Request guard carrying the verified payload of an `Authorization: Bearer` token.
pub struct Authenticated<P = Value>(pub P);

#[rocket::async_trait]
impl<'r, P: DeserializeOwned + Send> FromRequest<'r> for Authenticated<P> {
    type Error = TokenError;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(authority) = req.rocket().state::<TokenAuthority>() else {
            return Outcome::Error((Status::InternalServerError, TokenError::MissingSecret));
        };

        let token = req
            .headers()
            .get_one("Authorization")
            .and_then(|value| value.trim().split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
            .map(|(_, token)| token.trim());

        match token.map(|token| authority.verify::<P>(token)) {
            Some(Ok(payload)) => Outcome::Success(Authenticated(payload)),
            Some(Err(e)) => Outcome::Error((Status::Unauthorized, e)),
            None => Outcome::Error((Status::Unauthorized, TokenError::InvalidOrExpired)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ServerSettings {
    pub require_auth: bool,
}

/// Passes through unless uploads are configured to require a bearer token.
pub struct UploadAuthorization(pub Option<Value>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UploadAuthorization {
    type Error = TokenError;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let require_auth = req
            .rocket()
            .state::<ServerSettings>()
            .map(|settings| settings.require_auth)
            .unwrap_or(true);

        if !require_auth {
            return Outcome::Success(UploadAuthorization(None));
        }

        Authenticated::<Value>::from_request(req)
            .await
            .map(|Authenticated(payload)| UploadAuthorization(Some(payload)))
    }
}
