//! Cookie core types.
//!
//! The [`Cookie`] struct is the record kept by client-side transports such as
//! [`JsonCookieTransport`](crate::cookies::JsonCookieTransport). It can be
//! (de)serialized via `serde` to JSON or other formats.
//!
//! ```rust
//! use persistent_cart::cookies::{Cookie, SameSite};
//!
//! let c = Cookie {
//!     name: "shopping_cart_cookie".into(),
//!     value: "{\"quote_id\":42,\"items\":[]}".into(),
//!     path: Some("/".into()),
//!     domain: Some("shop.example.com".into()),
//!     secure: false,
//!     expires: Some(1_900_000_000),
//!     same_site: Some(SameSite::Lax),
//!     http_only: false,
//! };
//! assert!(!c.is_expired(1_800_000_000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// SameSite policy of a cookie.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// A cookie as stored/serialized by a client-side transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Cookie value, already decoded.
    pub value: String,

    /// Path scoping (e.g., `"/"`).
    pub path: Option<String>,

    /// Domain scoping (host-only if `None`).
    pub domain: Option<String>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// Expiration as unix seconds. Session cookies have `None`.
    pub expires: Option<i64>,

    pub same_site: Option<SameSite>,

    /// If `true`, cookie is hidden from client-side scripts.
    pub http_only: bool,
}

impl Cookie {
    /// Returns `true` when the cookie has an expiry at or before `now` (unix seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires, Some(at) if at <= now)
    }
}

/// Current wall-clock time as unix seconds.
pub(crate) fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(expires: Option<i64>) -> Cookie {
        Cookie {
            name: "c".into(),
            value: "v".into(),
            path: None,
            domain: None,
            secure: false,
            expires,
            same_site: None,
            http_only: false,
        }
    }

    #[test]
    fn session_cookie_never_expires() {
        assert!(!cookie(None).is_expired(i64::MAX));
    }

    #[test]
    fn expiry_is_inclusive() {
        let c = cookie(Some(100));
        assert!(!c.is_expired(99));
        assert!(c.is_expired(100));
        assert!(c.is_expired(101));
    }

    #[test]
    fn same_site_serializes_by_name() {
        let json = serde_json::to_string(&cookie(None)).unwrap();
        assert!(json.contains("\"same_site\":null"));

        let mut c = cookie(None);
        c.same_site = Some(SameSite::Strict);
        let back: Cookie = serde_json::from_str(&serde_json::to_string(&c).unwrap()).unwrap();
        assert_eq!(back.same_site, Some(SameSite::Strict));
        assert_eq!(SameSite::Lax.to_string(), "Lax");
    }
}
