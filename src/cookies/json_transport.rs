//! JSON-backed cookie transport.
//!
//! `JsonCookieTransport` plays the client side of the exchange: it keeps a
//! cookie jar in a single JSON file on disk, so values written in one session
//! are visible when the file is opened again in the next. Every mutation is
//! written back immediately.
//!
//! ### Design
//! - One file per jar (`CookieJarFile { cookies: Vec<Cookie> }`).
//! - Cookies are keyed by name; path and domain are stored but not matched.
//! - Expired cookies are invisible to reads and pruned on every save.
//!
//! ### I/O characteristics & caveats
//! - Each write **rewrites** the entire file. File writes are not atomic.
//! - A file that cannot be parsed is treated as an empty jar (and logged);
//!   I/O errors are returned to the caller.
//!
//! ### Example
//! ```no_run
//! use persistent_cart::cookies::{CookieMetadata, CookieTransport, JsonCookieTransport};
//!
//! # fn main() -> Result<(), persistent_cart::CookieError> {
//! let mut jar = JsonCookieTransport::open("cookies.json")?;
//! jar.set_public_cookie("shopping_cart_cookie", "42", &CookieMetadata::public())?;
//!
//! let reopened = JsonCookieTransport::open("cookies.json")?;
//! assert_eq!(reopened.get_cookie("shopping_cart_cookie").as_deref(), Some("42"));
//! # Ok(()) }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cookies::transport::warn_on_cookie_count;
use crate::cookies::{now_unix, validate_cookie, validate_name, Cookie, CookieMetadata, CookieTransport};
use crate::errors::CookieError;

/// On-disk representation of the jar.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieJarFile {
    cookies: Vec<Cookie>,
}

pub struct JsonCookieTransport {
    /// Path to the JSON file where cookies are stored.
    path: PathBuf,
    /// Cookies by name.
    cookies: HashMap<String, Cookie>,
}

impl JsonCookieTransport {
    /// Opens the jar at `path`, creating an empty file if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CookieError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            fs::write(&path, serde_json::to_vec(&CookieJarFile::default())?)?;
        }

        let file = Self::load_file(&path)?;
        let cookies = file
            .cookies
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect();

        Ok(Self { path, cookies })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the jar file.
    ///
    /// Returns an empty jar if deserialization fails.
    fn load_file(path: &Path) -> Result<CookieJarFile, CookieError> {
        let contents = fs::read_to_string(path)?;

        match serde_json::from_str(&contents) {
            Ok(file) => Ok(file),
            Err(e) => {
                log::warn!("Cookie jar {} is unreadable, starting empty: {}", path.display(), e);
                Ok(CookieJarFile::default())
            }
        }
    }

    /// Prunes expired cookies and writes the jar file (pretty-printed).
    fn save_file(&mut self) -> Result<(), CookieError> {
        let now = now_unix();
        self.cookies.retain(|_, c| !c.is_expired(now));

        let mut cookies: Vec<Cookie> = self.cookies.values().cloned().collect();
        cookies.sort_by(|a, b| a.name.cmp(&b.name));

        let contents = serde_json::to_string_pretty(&CookieJarFile { cookies })?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl CookieTransport for JsonCookieTransport {
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

        self.save_file()
    }

    fn delete_cookie(
        &mut self,
        name: &str,
        _metadata: Option<&CookieMetadata>,
    ) -> Result<(), CookieError> {
        validate_name(name)?;

        if self.cookies.remove(name).is_some() {
            self.save_file()?;
        }
        Ok(())
    }
}
