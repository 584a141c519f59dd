//! Request-scoped cookie transport over HTTP headers.
//!
//! [`HeaderCookieTransport`] reads the `Cookie` request header(s) once, and
//! queues a `Set-Cookie` header for every write. Writes are reflected in later
//! reads of the same request, so a handler always observes its own changes.
//!
//! ## Notes & limitations
//! - Values are percent-encoded on the wire and decoded when the request is
//!   parsed.
//! - Only the last write per cookie name is sent ("last write wins").
//! - Once [`commit`](HeaderCookieTransport::commit) has moved the queued headers
//!   into the response, further writes fail with
//!   [`CookieError::FailureToSend`].
//!
//! ```rust
//! use http::{header, HeaderMap, HeaderValue};
//! use persistent_cart::cookies::{CookieMetadata, CookieTransport, HeaderCookieTransport};
//!
//! let mut request = HeaderMap::new();
//! request.insert(header::COOKIE, HeaderValue::from_static("a=1; b=2"));
//!
//! let mut cookies = HeaderCookieTransport::from_request(&request);
//! assert_eq!(cookies.get_cookie("b").as_deref(), Some("2"));
//!
//! cookies.set_public_cookie("a", "3", &CookieMetadata::public().path("/")).unwrap();
//!
//! let mut response = HeaderMap::new();
//! cookies.commit(&mut response);
//! assert_eq!(response.get(header::SET_COOKIE).unwrap(), "a=3; Path=/");
//! ```

use std::collections::HashMap;
use std::fmt::Write;

use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use percent_encoding::percent_decode_str;

use crate::cookies::transport::warn_on_cookie_count;
use crate::cookies::{encode_value, validate_cookie, validate_name, CookieMetadata, CookieTransport};
use crate::errors::CookieError;

const EXPIRED_DATE: &str = "Thu, 01 Jan 1970 00:00:01 GMT";

#[derive(Debug, Default)]
pub struct HeaderCookieTransport {
    /// Cookies as seen by this request, including its own writes.
    cookies: HashMap<String, String>,
    /// `Set-Cookie` values waiting for the response, in write order.
    pending: Vec<(String, HeaderValue)>,
    /// Set once the response headers have been produced.
    committed: bool,
}

impl HeaderCookieTransport {
    /// Creates a transport with no incoming cookies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport from the request headers.
    ///
    /// Accepts multiple `Cookie` headers. A value wrapped in double quotes is
    /// unwrapped. Pairs without `=` and headers that
    /// are not valid UTF-8 are skipped. When a name repeats, the first
    /// occurrence wins, like browsers send the most specific cookie first.
    pub fn from_request(headers: &HeaderMap) -> Self {
        let mut cookies = HashMap::new();

        for header in headers.get_all(COOKIE) {
            let Ok(header_str) = header.to_str() else {
                continue;
            };

            for pair in header_str.split(';') {
                if let Some((name, value)) = pair.trim().split_once('=') {
                    let name = name.trim();
                    if name.is_empty() {
                        continue;
                    }
                    let value = value.trim();
                    let value = value
                        .strip_prefix('"')
                        .and_then(|v| v.strip_suffix('"'))
                        .unwrap_or(value);
                    let value = percent_decode_str(value).decode_utf8_lossy();
                    cookies
                        .entry(name.to_string())
                        .or_insert_with(|| value.into_owned());
                }
            }
        }

        Self {
            cookies,
            pending: Vec::new(),
            committed: false,
        }
    }

    /// Returns the queued `Set-Cookie` values, in write order.
    pub fn pending(&self) -> impl Iterator<Item = &HeaderValue> {
        self.pending.iter().map(|(_, value)| value)
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Appends all queued `Set-Cookie` headers to `response`.
    ///
    /// After this the transport is read-only.
    pub fn commit(&mut self, response: &mut HeaderMap) {
        for (_, value) in self.pending.drain(..) {
            response.append(SET_COOKIE, value);
        }
        self.committed = true;
    }

    fn ensure_sendable(&self, name: &str) -> Result<(), CookieError> {
        if self.committed {
            return Err(CookieError::FailureToSend(format!(
                "response headers already sent, cannot write cookie '{name}'"
            )));
        }
        Ok(())
    }

    fn queue(&mut self, name: &str, header: String) -> Result<(), CookieError> {
        let value = HeaderValue::from_str(&header)
            .map_err(|e| CookieError::InvalidInput(format!("cookie '{name}': {e}")))?;

        // Replace an earlier write for the same cookie
        if let Some(existing) = self.pending.iter_mut().find(|(n, _)| n == name) {
            existing.1 = value;
        } else {
            self.pending.push((name.to_string(), value));
        }
        Ok(())
    }
}

impl CookieTransport for HeaderCookieTransport {
    fn get_cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    fn set_public_cookie(
        &mut self,
        name: &str,
        value: &str,
        metadata: &CookieMetadata,
    ) -> Result<(), CookieError> {
        self.ensure_sendable(name)?;
        validate_cookie(name, value, metadata)?;

        let header = render_set_cookie(name, &encode_value(value), metadata, false);
        self.queue(name, header)?;

        self.cookies.insert(name.to_string(), value.to_string());
        warn_on_cookie_count(self.cookies.len());
        Ok(())
    }

    fn delete_cookie(
        &mut self,
        name: &str,
        metadata: Option<&CookieMetadata>,
    ) -> Result<(), CookieError> {
        self.ensure_sendable(name)?;
        validate_name(name)?;

        let default_meta = CookieMetadata::public();
        let metadata = metadata.unwrap_or(&default_meta);
        metadata.validate()?;

        let header = render_set_cookie(name, "", metadata, true);
        self.queue(name, header)?;

        self.cookies.remove(name);
        Ok(())
    }
}

/// Renders a `Set-Cookie` header value. `expire` renders a deletion.
fn render_set_cookie(name: &str, encoded_value: &str, meta: &CookieMetadata, expire: bool) -> String {
    let mut out = format!("{name}={encoded_value}");

    // Writing to a String cannot fail
    if expire {
        let _ = write!(out, "; Max-Age=0; Expires={EXPIRED_DATE}");
    } else if let Some(max_age) = meta.max_age() {
        let _ = write!(out, "; Max-Age={max_age}");
    }
    if let Some(path) = meta.get_path() {
        let _ = write!(out, "; Path={path}");
    }
    if let Some(domain) = meta.get_domain() {
        let _ = write!(out, "; Domain={domain}");
    }
    if meta.is_secure() {
        out.push_str("; Secure");
    }
    if meta.is_http_only() {
        out.push_str("; HttpOnly");
    }
    if let Some(same_site) = meta.get_same_site() {
        let _ = write!(out, "; SameSite={same_site}");
    }
    out
}
