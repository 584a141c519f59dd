//! Cookie-backed value store.
//!
//! [`CookieValueStore`] mirrors one opaque string into one named cookie. It
//! owns its three collaborators:
//! - a [`CookieTransport`] that actually reads and writes cookies,
//! - a [`SessionPolicy`] for the lifetime, path and domain of writes,
//! - a [`RestrictionPolicy`] that can suppress writes (e.g. missing consent).
//!
//! Models that give the cookie a meaning implement [`CookieModel`]; see
//! [`CartCookie`](crate::cart::CartCookie).
//!
//! ```rust
//! use persistent_cart::config::SessionConfig;
//! use persistent_cart::cookies::InMemoryCookieTransport;
//! use persistent_cart::restriction::CookieRestriction;
//! use persistent_cart::store::CookieValueStore;
//!
//! # fn main() -> Result<(), persistent_cart::CookieError> {
//! let mut store = CookieValueStore::from_config(
//!     InMemoryCookieTransport::new(),
//!     SessionConfig::default(),
//!     CookieRestriction::unrestricted(),
//! );
//!
//! store.update(Some("42"))?;
//! assert_eq!(store.read().as_deref(), Some("42"));
//!
//! store.update(None)?;
//! assert_eq!(store.read(), None);
//! # Ok(()) }
//! ```

use crate::config::{SessionConfig, SessionPolicy, DEFAULT_COOKIE_NAME};
use crate::cookies::{CookieMetadata, CookieTransport};
use crate::errors::CookieError;
use crate::restriction::RestrictionPolicy;

/// Read/update/remove over a single named cookie.
pub trait CookieSlot {
    /// Current value, or `None` when the cookie is not set.
    fn read(&self) -> Option<String>;

    /// Writes `value`, or deletes the cookie for `None`.
    fn update(&mut self, value: Option<&str>) -> Result<(), CookieError>;

    /// Deletes the cookie if it is set.
    fn remove(&mut self) -> Result<(), CookieError>;
}

/// A model whose state lives in a cookie.
pub trait CookieModel {
    /// The cookie backing this model.
    fn slot(&mut self) -> &mut dyn CookieSlot;

    /// Loads the cookie into the model state.
    fn read_cookie(&mut self) -> Result<&mut Self, CookieError>;

    /// Persists the model state into the cookie.
    fn write_cookie(&mut self) -> Result<&mut Self, CookieError>;

    /// Deletes the backing cookie, leaving the model state alone.
    fn remove_cookie(&mut self) -> Result<&mut Self, CookieError> {
        self.slot().remove()?;
        Ok(self)
    }
}

pub struct CookieValueStore<T, S, R> {
    cookie_name: String,
    transport: T,
    session: S,
    restriction: R,
}

impl<T, R> CookieValueStore<T, SessionConfig, R>
where
    T: CookieTransport,
    R: RestrictionPolicy,
{
    /// Creates a store using the cookie name from `config`.
    pub fn from_config(transport: T, config: SessionConfig, restriction: R) -> Self {
        let cookie_name = config.cookie_name.clone();
        Self::new(transport, config, restriction).with_cookie_name(cookie_name)
    }
}

impl<T, S, R> CookieValueStore<T, S, R>
where
    T: CookieTransport,
    S: SessionPolicy,
    R: RestrictionPolicy,
{
    /// Creates a store for the default cookie name.
    pub fn new(transport: T, session: S, restriction: R) -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            transport,
            session,
            restriction,
        }
    }

    pub fn with_cookie_name<N: Into<String>>(mut self, name: N) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Returns the current cookie value, or `None` if unset.
    pub fn read(&self) -> Option<String> {
        self.transport.get_cookie(&self.cookie_name)
    }

    /// Mirrors `value` into the cookie.
    ///
    /// Does nothing while cookies are restricted or when `value` equals the
    /// current cookie value. `None` deletes the cookie.
    pub fn update(&mut self, value: Option<&str>) -> Result<(), CookieError> {
        if self.restriction.is_cookie_restricted() {
            log::debug!("Cookie '{}' is restricted, skipping update", self.cookie_name);
            return Ok(());
        }

        if self.read().as_deref() != value {
            self.process_client_cookie(value)?;
        }
        Ok(())
    }

    /// Deletes the cookie if it is set. Calling it again is a no-op.
    pub fn remove(&mut self) -> Result<(), CookieError> {
        if self.read().is_some() {
            let metadata = CookieMetadata::from_policy(&self.session);
            self.transport.delete_cookie(&self.cookie_name, Some(&metadata))?;
            log::debug!("Cookie '{}' removed", self.cookie_name);
        }
        Ok(())
    }

    /// Sets the cookie with the session's lifetime/path/domain, or deletes it for `None`.
    fn process_client_cookie(&mut self, value: Option<&str>) -> Result<(), CookieError> {
        let metadata = CookieMetadata::from_policy(&self.session);

        match value {
            Some(value) => {
                self.transport
                    .set_public_cookie(&self.cookie_name, value, &metadata)?;
                log::debug!("Cookie '{}' written ({} bytes)", self.cookie_name, value.len());
            }
            None => {
                self.transport.delete_cookie(&self.cookie_name, Some(&metadata))?;
                log::debug!("Cookie '{}' deleted", self.cookie_name);
            }
        }
        Ok(())
    }
}

impl<T, S, R> CookieSlot for CookieValueStore<T, S, R>
where
    T: CookieTransport,
    S: SessionPolicy,
    R: RestrictionPolicy,
{
    fn read(&self) -> Option<String> {
        CookieValueStore::read(self)
    }

    fn update(&mut self, value: Option<&str>) -> Result<(), CookieError> {
        CookieValueStore::update(self, value)
    }

    fn remove(&mut self) -> Result<(), CookieError> {
        CookieValueStore::remove(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::{HeaderCookieTransport, InMemoryCookieTransport};
    use crate::restriction::CookieRestriction;
    use http::header::{COOKIE, SET_COOKIE};
    use http::{HeaderMap, HeaderValue};

    /// Records transport calls on top of an in-memory map.
    #[derive(Default)]
    struct CountingTransport {
        inner: InMemoryCookieTransport,
        sets: usize,
        deletes: usize,
    }

    impl CookieTransport for CountingTransport {
        fn get_cookie(&self, name: &str) -> Option<String> {
            self.inner.get_cookie(name)
        }

        fn set_public_cookie(
            &mut self,
            name: &str,
            value: &str,
            metadata: &CookieMetadata,
        ) -> Result<(), CookieError> {
            self.sets += 1;
            self.inner.set_public_cookie(name, value, metadata)
        }

        fn delete_cookie(
            &mut self,
            name: &str,
            metadata: Option<&CookieMetadata>,
        ) -> Result<(), CookieError> {
            self.deletes += 1;
            self.inner.delete_cookie(name, metadata)
        }
    }

    fn store(restriction: CookieRestriction) -> CookieValueStore<CountingTransport, SessionConfig, CookieRestriction> {
        let _ = env_logger::builder().is_test(true).try_init();
        CookieValueStore::from_config(CountingTransport::default(), SessionConfig::default(), restriction)
    }

    #[test]
    fn write_then_read() {
        let mut s = store(CookieRestriction::unrestricted());
        assert_eq!(s.read(), None);

        s.update(Some("abc")).unwrap();
        assert_eq!(s.read().as_deref(), Some("abc"));
        assert_eq!(s.cookie_name(), DEFAULT_COOKIE_NAME);

        let record = s.transport().inner.cookie(DEFAULT_COOKIE_NAME).unwrap();
        assert_eq!(record.path.as_deref(), Some("/"));
        assert!(record.expires.is_some());
        assert!(!record.http_only);
    }

    #[test]
    fn restricted_update_is_noop() {
        let mut s = store(CookieRestriction::restricted());

        s.update(Some("abc")).unwrap();
        assert_eq!(s.read(), None);

        s.transport_mut()
            .inner
            .set_public_cookie(DEFAULT_COOKIE_NAME, "existing", &CookieMetadata::public())
            .unwrap();
        s.update(None).unwrap();
        s.update(Some("other")).unwrap();

        assert_eq!(s.read().as_deref(), Some("existing"));
        assert_eq!(s.transport().sets, 0);
        assert_eq!(s.transport().deletes, 0);
    }

    #[test]
    fn same_value_does_not_touch_transport() {
        let mut s = store(CookieRestriction::unrestricted());

        s.update(Some("abc")).unwrap();
        s.update(Some("abc")).unwrap();
        assert_eq!(s.transport().sets, 1);

        // None over an absent cookie is also unchanged
        s.remove().unwrap();
        let deletes = s.transport().deletes;
        s.update(None).unwrap();
        assert_eq!(s.transport().deletes, deletes);
    }

    #[test]
    fn writing_none_deletes() {
        let mut s = store(CookieRestriction::unrestricted());

        s.update(Some("abc")).unwrap();
        s.update(None).unwrap();

        assert_eq!(s.read(), None);
        assert_eq!(s.transport().deletes, 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut s = store(CookieRestriction::unrestricted());

        s.remove().unwrap();
        assert_eq!(s.transport().deletes, 0);

        s.update(Some("abc")).unwrap();
        s.remove().unwrap();
        s.remove().unwrap();

        assert_eq!(s.read(), None);
        assert_eq!(s.transport().deletes, 1);
    }

    #[test]
    fn remove_ignores_restriction() {
        let mut s = store(CookieRestriction::restricted());
        s.transport_mut()
            .inner
            .set_public_cookie(DEFAULT_COOKIE_NAME, "v", &CookieMetadata::public())
            .unwrap();

        s.remove().unwrap();
        assert_eq!(s.read(), None);
    }

    #[test]
    fn errors_propagate() {
        let mut s = store(CookieRestriction::unrestricted());
        let huge = "x".repeat(10_000);

        assert!(matches!(
            s.update(Some(&huge)),
            Err(CookieError::SizeLimitReached { .. })
        ));
        assert_eq!(s.read(), None);
    }

    #[test]
    fn custom_cookie_name() {
        let cfg = SessionConfig::builder().cookie_name("cart").build().unwrap();
        let mut s = CookieValueStore::from_config(
            InMemoryCookieTransport::new(),
            cfg,
            CookieRestriction::unrestricted(),
        );

        s.update(Some("1")).unwrap();
        assert_eq!(s.transport().get_cookie("cart").as_deref(), Some("1"));
        assert!(s.transport().get_cookie(DEFAULT_COOKIE_NAME).is_none());
    }

    #[test]
    fn over_http_headers() {
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_static("shopping_cart_cookie=old"));

        let cfg = SessionConfig::builder()
            .cookie_lifetime(600)
            .cookie_domain("shop.example.com")
            .build()
            .unwrap();
        let mut s = CookieValueStore::from_config(
            HeaderCookieTransport::from_request(&request),
            cfg,
            CookieRestriction::unrestricted(),
        );

        assert_eq!(s.read().as_deref(), Some("old"));
        s.update(Some("new value")).unwrap();

        let mut response = HeaderMap::new();
        let mut transport = s.into_transport();
        transport.commit(&mut response);

        assert_eq!(
            response.get(SET_COOKIE).unwrap(),
            "shopping_cart_cookie=new%20value; Max-Age=600; Path=/; Domain=shop.example.com"
        );
    }

    #[test]
    fn borrowed_transport() {
        let mut cookies = InMemoryCookieTransport::new();
        {
            let mut s = CookieValueStore::new(
                &mut cookies,
                SessionConfig::default(),
                CookieRestriction::unrestricted(),
            );
            s.update(Some("v")).unwrap();
        }
        assert_eq!(cookies.get_cookie(DEFAULT_COOKIE_NAME).as_deref(), Some("v"));
    }
}
