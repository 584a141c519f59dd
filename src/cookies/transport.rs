//! Cookie transport abstraction.
//!
//! A **cookie transport** is whatever actually carries cookies between the
//! server and the client: the request/response headers of a single HTTP
//! exchange ([`HeaderCookieTransport`](crate::cookies::HeaderCookieTransport)),
//! a client-side jar on disk ([`JsonCookieTransport`](crate::cookies::JsonCookieTransport)),
//! or a plain map ([`InMemoryCookieTransport`](crate::cookies::InMemoryCookieTransport)).
//!
//! All implementations share the same validation rules through
//! [`validate_cookie`]: names must be RFC 6265 tokens, and a single encoded
//! `name=value` pair may not exceed [`MAX_COOKIE_SIZE`] bytes.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::cookies::CookieMetadata;
use crate::errors::CookieError;

/// Maximum size in bytes of an encoded `name=value` pair.
pub const MAX_COOKIE_SIZE: usize = 4096;

/// Number of cookies above which a warning is logged.
pub const MAX_NUM_COOKIES: usize = 50;

/// Bytes that cannot appear raw in a cookie value.
const COOKIE_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b',')
    .add(b';')
    .add(b'\\')
    .add(b'%');

/// Gets, sets and deletes cookies by name.
///
/// Writes are fallible: invalid input, oversized cookies and transports that
/// can no longer send are reported to the caller and never retried.
pub trait CookieTransport {
    /// Returns the decoded value of cookie `name`, if present.
    fn get_cookie(&self, name: &str) -> Option<String>;

    /// Sets a public cookie `name=value` with the given attributes.
    fn set_public_cookie(
        &mut self,
        name: &str,
        value: &str,
        metadata: &CookieMetadata,
    ) -> Result<(), CookieError>;

    /// Deletes cookie `name`. `metadata` scopes the deletion (path/domain) when given.
    fn delete_cookie(
        &mut self,
        name: &str,
        metadata: Option<&CookieMetadata>,
    ) -> Result<(), CookieError>;
}

impl<T: CookieTransport + ?Sized> CookieTransport for &mut T {
    fn get_cookie(&self, name: &str) -> Option<String> {
        (**self).get_cookie(name)
    }

    fn set_public_cookie(
        &mut self,
        name: &str,
        value: &str,
        metadata: &CookieMetadata,
    ) -> Result<(), CookieError> {
        (**self).set_public_cookie(name, value, metadata)
    }

    fn delete_cookie(
        &mut self,
        name: &str,
        metadata: Option<&CookieMetadata>,
    ) -> Result<(), CookieError> {
        (**self).delete_cookie(name, metadata)
    }
}

/// Percent-encodes a cookie value for the wire.
pub fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, COOKIE_VALUE).to_string()
}

/// Checks that `name` is a valid cookie name (an RFC 6265 token).
pub fn validate_name(name: &str) -> Result<(), CookieError> {
    if name.is_empty() {
        return Err(CookieError::InvalidInput("cookie name is empty".to_string()));
    }
    if let Some(c) = name.chars().find(|c| !is_token_char(*c)) {
        return Err(CookieError::InvalidInput(format!(
            "cookie name '{name}' contains invalid character {c:?}"
        )));
    }
    Ok(())
}

/// Validates a cookie about to be written.
pub fn validate_cookie(
    name: &str,
    value: &str,
    metadata: &CookieMetadata,
) -> Result<(), CookieError> {
    validate_name(name)?;
    metadata.validate()?;

    let size = name.len() + 1 + encode_value(value).len();
    if size > MAX_COOKIE_SIZE {
        return Err(CookieError::SizeLimitReached {
            name: name.to_string(),
            size,
            limit: MAX_COOKIE_SIZE,
        });
    }
    Ok(())
}

/// Logs a warning once a transport holds more cookies than browsers reliably keep.
pub(crate) fn warn_on_cookie_count(count: usize) {
    if count > MAX_NUM_COOKIES {
        log::warn!(
            "{count} cookies set, exceeding the limit of {MAX_NUM_COOKIES}; some may be dropped by the client"
        );
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?={}".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_must_be_tokens() {
        assert!(validate_name("shopping_cart_cookie").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a b").is_err());
        assert!(validate_name("a=b").is_err());
        assert!(validate_name("caf\u{e9}").is_err());
    }

    #[test]
    fn encoding_escapes_separators() {
        assert_eq!(encode_value("plain-value_1"), "plain-value_1");
        assert_eq!(encode_value("a b;c"), "a%20b%3Bc");
        assert_eq!(encode_value("{\"x\":1,\"y\":2}"), "{%22x%22:1%2C%22y%22:2}");
    }

    #[test]
    fn size_limit_counts_encoded_pair() {
        let meta = CookieMetadata::public();
        let name = "c";

        let fits = "x".repeat(MAX_COOKIE_SIZE - name.len() - 1);
        assert!(validate_cookie(name, &fits, &meta).is_ok());

        let too_big = format!("{fits}x");
        match validate_cookie(name, &too_big, &meta) {
            Err(CookieError::SizeLimitReached { size, limit, .. }) => {
                assert_eq!(size, MAX_COOKIE_SIZE + 1);
                assert_eq!(limit, MAX_COOKIE_SIZE);
            }
            other => panic!("expected size limit error, got {other:?}"),
        }

        // Three encoded bytes per space
        let spaces = " ".repeat(MAX_COOKIE_SIZE / 3);
        assert!(matches!(
            validate_cookie(name, &spaces, &meta),
            Err(CookieError::SizeLimitReached { .. })
        ));
    }

    #[test]
    fn invalid_metadata_is_rejected() {
        let meta = CookieMetadata::public().path("no-slash");
        assert!(matches!(
            validate_cookie("c", "v", &meta),
            Err(CookieError::InvalidInput(_))
        ));
    }
}
