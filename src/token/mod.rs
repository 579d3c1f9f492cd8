//! Signed, time-bound credentials over an opaque payload.
//!
//! A token is two base64url segments joined by a dot: the JSON claims
//! (`payload`, `iat`, `exp`) and an HMAC-SHA256 tag over the first segment.

mod authority;
mod clock;
mod secret;

pub use authority::{Credential, TokenAuthority};
pub use clock::{Clock, ManualClock, SystemClock};
pub use secret::TokenSecret;
