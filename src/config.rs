//! Session cookie configuration.
//!
//! [`SessionPolicy`] is what the cookie store consults for the lifetime, path
//! and domain of the cookies it writes. [`SessionConfig`] is the stock
//! implementation: it provides sensible defaults via [`Default`], a fluent
//! [`SessionConfig::builder()`] with validation, and JSON loading.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use persistent_cart::config::{SessionConfig, SessionPolicy};
//! let cfg = SessionConfig::default();
//! assert_eq!(cfg.cookie_lifetime(), time::Duration::hours(1));
//! assert_eq!(cfg.cookie_path(), "/");
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use persistent_cart::config::SessionConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = SessionConfig::builder()
//!     .cookie_lifetime(86_400)
//!     .cookie_path("/")
//!     .cookie_domain("shop.example.com")
//!     .cookie_name("cart")
//!     .build()?; // returns Result<SessionConfig, SessionConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `cookie_lifetime`: Lifetime in seconds (default: 3600). `0` writes session cookies.
//! - `cookie_path`: Path attribute (default: `/`).
//! - `cookie_domain`: Optional domain attribute; host-only when absent.
//! - `cookie_name`: Name of the cart cookie (default: `shopping_cart_cookie`).
//!
//! # Errors
//!
//! Builder validation returns [`SessionConfigError`] if values are invalid
//! (a path not starting with `/`, an unparsable domain, or a cookie name that
//! is not a valid token).

use std::fmt;

use serde::Deserialize;

use crate::cookies::{validate_domain, validate_name, validate_path};

pub const DEFAULT_COOKIE_NAME: &str = "shopping_cart_cookie";
const DEFAULT_COOKIE_LIFETIME: u64 = 3600;

/// Where and for how long session cookies live.
pub trait SessionPolicy {
    fn cookie_lifetime(&self) -> time::Duration;

    fn cookie_path(&self) -> &str;

    /// Domain attribute, or `None` for host-only cookies.
    fn cookie_domain(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_lifetime: u64,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_lifetime: DEFAULT_COOKIE_LIFETIME,
            cookie_path: "/".to_string(),
            cookie_domain: None,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Loads a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SessionConfigError> {
        let cfg: SessionConfig =
            serde_json::from_str(json).map_err(|e| SessionConfigError::Parse(e.to_string()))?;
        validate(&cfg)?;
        Ok(cfg)
    }
}

impl SessionPolicy for SessionConfig {
    fn cookie_lifetime(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.cookie_lifetime).unwrap_or(i64::MAX))
    }

    fn cookie_path(&self) -> &str {
        &self.cookie_path
    }

    fn cookie_domain(&self) -> Option<&str> {
        self.cookie_domain.as_deref().filter(|d| !d.is_empty())
    }
}

/// Builder for [`SessionConfig`].
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    inner: SessionConfig,
}

impl SessionConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut SessionConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn cookie_lifetime(self, secs: u64) -> Self { self.map(|c| c.cookie_lifetime = secs) }
    pub fn cookie_path<S: Into<String>>(self, path: S) -> Self { self.map(|c| c.cookie_path = path.into()) }
    pub fn cookie_domain<S: Into<String>>(self, domain: S) -> Self { self.map(|c| c.cookie_domain = Some(domain.into())) }
    pub fn cookie_name<S: Into<String>>(self, name: S) -> Self { self.map(|c| c.cookie_name = name.into()) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<SessionConfig, SessionConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum SessionConfigError {
    InvalidPath(String),
    InvalidDomain(String),
    InvalidCookieName(String),
    Parse(String),
}

impl fmt::Display for SessionConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionConfigError::InvalidPath(p) =>
                write!(f, "cookie_path '{p}' must start with '/' and contain no control characters"),
            SessionConfigError::InvalidDomain(d) =>
                write!(f, "cookie_domain '{d}' is not a valid host"),
            SessionConfigError::InvalidCookieName(n) =>
                write!(f, "cookie_name '{n}' is not a valid cookie name"),
            SessionConfigError::Parse(e) =>
                write!(f, "cannot parse session config: {e}"),
        }
    }
}
impl std::error::Error for SessionConfigError {}

fn validate(c: &SessionConfig) -> Result<(), SessionConfigError> {
    if validate_path(&c.cookie_path).is_err() {
        return Err(SessionConfigError::InvalidPath(c.cookie_path.clone()));
    }
    if let Some(domain) = c.cookie_domain.as_deref().filter(|d| !d.is_empty()) {
        if validate_domain(domain).is_err() {
            return Err(SessionConfigError::InvalidDomain(domain.to_string()));
        }
    }
    if validate_name(&c.cookie_name).is_err() {
        return Err(SessionConfigError::InvalidCookieName(c.cookie_name.clone()));
    }
    Ok(())
}
