use std::collections::HashMap;

use crate::cookies::transport::warn_on_cookie_count;
use crate::cookies::{now_unix, validate_cookie, validate_name, Cookie, CookieMetadata, CookieTransport};
use crate::errors::CookieError;

/// Cookie transport backed by a plain map. Nothing leaves the process.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCookieTransport {
    cookies: HashMap<String, Cookie>,
}

impl InMemoryCookieTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored record for `name`, expired or not.
    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl CookieTransport for InMemoryCookieTransport {
    fn get_cookie(&self, name: &str) -> Option<String> {
        let now = now_unix();
        self.cookies
            .get(name)
            .filter(|c| !c.is_expired(now))
            .map(|c| c.value.clone())
    }

    fn set_public_cookie(
        &mut self,
        name: &str,
        value: &str,
        metadata: &CookieMetadata,
    ) -> Result<(), CookieError> {
        validate_cookie(name, value, metadata)?;
        self.cookies
            .insert(name.to_string(), metadata.to_cookie(name, value, now_unix()));
        warn_on_cookie_count(self.cookies.len());
        Ok(())
    }

    fn delete_cookie(
        &mut self,
        name: &str,
        _metadata: Option<&CookieMetadata>,
    ) -> Result<(), CookieError> {
        validate_name(name)?;
        self.cookies.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::MAX_NUM_COOKIES;

    #[test]
    fn set_get_delete() {
        let mut t = InMemoryCookieTransport::new();
        assert!(t.get_cookie("a").is_none());

        t.set_public_cookie("a", "1", &CookieMetadata::public()).unwrap();
        assert_eq!(t.get_cookie("a").as_deref(), Some("1"));

        t.set_public_cookie("a", "2", &CookieMetadata::public()).unwrap();
        assert_eq!(t.get_cookie("a").as_deref(), Some("2"));
        assert_eq!(t.len(), 1);

        t.delete_cookie("a", None).unwrap();
        assert!(t.get_cookie("a").is_none());
        assert!(t.is_empty());

        // deleting again is fine
        t.delete_cookie("a", None).unwrap();
    }

    #[test]
    fn expired_cookie_is_invisible() {
        let mut t = InMemoryCookieTransport::new();
        t.cookies.insert(
            "old".into(),
            CookieMetadata::public().to_cookie("old", "v", 0),
        );
        t.cookies.get_mut("old").unwrap().expires = Some(1);

        assert!(t.get_cookie("old").is_none());
        assert!(t.cookie("old").is_some());
    }

    #[test]
    fn invalid_name_is_rejected() {
        let mut t = InMemoryCookieTransport::new();
        assert!(t.set_public_cookie("bad name", "v", &CookieMetadata::public()).is_err());
        assert!(t.delete_cookie("", None).is_err());
    }

    #[test]
    fn writes_past_cookie_count_limit_succeed() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut t = InMemoryCookieTransport::new();
        for i in 0..=MAX_NUM_COOKIES {
            t.set_public_cookie(&format!("c{i}"), "v", &CookieMetadata::public())
                .unwrap();
        }

        assert_eq!(t.len(), MAX_NUM_COOKIES + 1);
        assert_eq!(t.get_cookie(&format!("c{MAX_NUM_COOKIES}")).as_deref(), Some("v"));
    }
}
