//! Attributes a cookie is written with.
//!
//! [`CookieMetadata`] is built fluently, starting from [`CookieMetadata::public()`]
//! (a cookie readable by page scripts). Most callers want
//! [`CookieMetadata::from_policy`], which copies the lifetime, path and domain of
//! a [`SessionPolicy`].
//!
//! ```rust
//! use persistent_cart::cookies::CookieMetadata;
//!
//! let meta = CookieMetadata::public()
//!     .duration(time::Duration::hours(1))
//!     .path("/")
//!     .domain("shop.example.com");
//! assert_eq!(meta.max_age(), Some(3600));
//! ```

use crate::config::SessionPolicy;
use crate::cookies::{Cookie, SameSite};
use crate::errors::CookieError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookieMetadata {
    /// Lifetime of the cookie. `None` is a session cookie.
    duration: Option<time::Duration>,
    path: Option<String>,
    domain: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl CookieMetadata {
    /// Metadata for a public cookie: visible to client-side scripts, no scoping.
    pub fn public() -> Self {
        Self::default()
    }

    /// Public metadata carrying the lifetime, path and domain of `policy`.
    pub fn from_policy<P: SessionPolicy + ?Sized>(policy: &P) -> Self {
        let meta = Self::public()
            .duration(policy.cookie_lifetime())
            .path(policy.cookie_path());

        match policy.cookie_domain() {
            Some(domain) => meta.domain(domain),
            None => meta,
        }
    }

    /// Sets the lifetime. Zero or negative durations make a session cookie.
    pub fn duration(mut self, duration: time::Duration) -> Self {
        self.duration = duration.is_positive().then_some(duration);
        self
    }

    pub fn path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the domain. An empty string clears it (host-only cookie).
    ///
    /// Valid domains are stored in serialized host form (lowercase, punycode).
    /// Invalid ones are kept as given and rejected by [`validate`](Self::validate).
    pub fn domain<S: Into<String>>(mut self, domain: S) -> Self {
        let domain = domain.into();
        self.domain = if domain.is_empty() {
            None
        } else {
            Some(normalize_domain(&domain).unwrap_or(domain))
        };
        self
    }

    pub fn secure(mut self, on: bool) -> Self {
        self.secure = on;
        self
    }

    pub fn http_only(mut self, on: bool) -> Self {
        self.http_only = on;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Lifetime in whole seconds, or `None` for a session cookie.
    pub fn max_age(&self) -> Option<i64> {
        self.duration.map(|d| d.whole_seconds())
    }

    pub fn get_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn get_domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn get_same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    /// Checks the path and domain attributes.
    pub fn validate(&self) -> Result<(), CookieError> {
        if let Some(path) = &self.path {
            validate_path(path)?;
        }
        if let Some(domain) = &self.domain {
            validate_domain(domain)?;
        }
        Ok(())
    }

    /// Builds the stored record for `name=value` written at `now` (unix seconds).
    pub fn to_cookie(&self, name: &str, value: &str, now: i64) -> Cookie {
        Cookie {
            name: name.to_string(),
            value: value.to_string(),
            path: self.path.clone(),
            domain: self.domain.as_ref().map(|d| d.trim_start_matches('.').to_string()),
            secure: self.secure,
            expires: self.max_age().map(|secs| now.saturating_add(secs)),
            same_site: self.same_site,
            http_only: self.http_only,
        }
    }
}

pub(crate) fn validate_path(path: &str) -> Result<(), CookieError> {
    if !path.starts_with('/') {
        return Err(CookieError::InvalidInput(format!(
            "cookie path '{path}' must start with '/'"
        )));
    }
    if path.chars().any(|c| c.is_control() || c == ';') {
        return Err(CookieError::InvalidInput(format!(
            "cookie path '{path}' contains invalid characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_domain(domain: &str) -> Result<(), CookieError> {
    normalize_domain(domain).map(|_| ())
}

/// Parses `domain` and returns its serialized host, keeping one leading dot.
///
/// Only letters, digits, `-` and `.` are accepted; non-ASCII letters are
/// converted to punycode.
pub(crate) fn normalize_domain(domain: &str) -> Result<String, CookieError> {
    let host = domain.trim_start_matches('.');
    if host.is_empty() {
        return Err(CookieError::InvalidInput("cookie domain is empty".to_string()));
    }
    if let Some(c) = host.chars().find(|c| !is_domain_char(*c)) {
        return Err(CookieError::InvalidInput(format!(
            "cookie domain '{domain}' contains invalid character {c:?}"
        )));
    }

    let host = url::Host::parse(host)
        .map_err(|e| CookieError::InvalidInput(format!("cookie domain '{domain}': {e}")))?;

    let prefix = if domain.starts_with('.') { "." } else { "" };
    Ok(format!("{prefix}{host}"))
}

fn is_domain_char(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_alphanumeric() || c == '-' || c == '.'
    } else {
        c.is_alphanumeric()
    }
}
