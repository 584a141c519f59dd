//! Cookie restriction (consent) policy.
//!
//! When cookie restriction mode is enabled, nothing may be written to the
//! client until the visitor has allowed it. Consent itself is recorded in the
//! [`CONSENT_COOKIE_NAME`] cookie by the storefront's consent banner.

use crate::cookies::CookieTransport;

/// Cookie set by the consent banner once the visitor allows cookies.
pub const CONSENT_COOKIE_NAME: &str = "user_allowed_save_cookie";

/// Decides whether cookie writes are currently suppressed.
pub trait RestrictionPolicy {
    fn is_cookie_restricted(&self) -> bool;
}

/// Restriction mode plus the visitor's consent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CookieRestriction {
    /// Whether cookie restriction mode is switched on for the store.
    pub restriction_enabled: bool,
    /// Whether the visitor allowed cookies.
    pub consent_given: bool,
}

impl CookieRestriction {
    pub fn new(restriction_enabled: bool, consent_given: bool) -> Self {
        Self {
            restriction_enabled,
            consent_given,
        }
    }

    /// Never restricted.
    pub fn unrestricted() -> Self {
        Self::new(false, true)
    }

    /// Always restricted.
    pub fn restricted() -> Self {
        Self::new(true, false)
    }

    /// Reads consent from the [`CONSENT_COOKIE_NAME`] cookie of `transport`.
    ///
    /// Any non-empty value counts as consent.
    pub fn from_transport<T: CookieTransport + ?Sized>(restriction_enabled: bool, transport: &T) -> Self {
        let consent_given = transport
            .get_cookie(CONSENT_COOKIE_NAME)
            .is_some_and(|v| !v.is_empty());

        Self::new(restriction_enabled, consent_given)
    }
}

impl RestrictionPolicy for CookieRestriction {
    fn is_cookie_restricted(&self) -> bool {
        self.restriction_enabled && !self.consent_given
    }
}
