// src/cookies.rs
//! Cookies: the [`Cookie`] record, [`CookieMetadata`] and the [`CookieTransport`] backends.

mod cookies;
mod metadata;
mod transport;
mod header_transport;
mod in_memory;
#[cfg(feature = "json_cookie_transport")]
mod json_transport;

pub use cookies::Cookie;
pub use cookies::SameSite;
pub(crate) use cookies::now_unix;

pub use metadata::CookieMetadata;
pub(crate) use metadata::{validate_domain, validate_path};

pub use transport::CookieTransport;
pub use transport::{encode_value, validate_cookie, validate_name};
pub use transport::{MAX_COOKIE_SIZE, MAX_NUM_COOKIES};

pub use header_transport::HeaderCookieTransport;
pub use in_memory::InMemoryCookieTransport;
#[cfg(feature = "json_cookie_transport")]
pub use json_transport::JsonCookieTransport;
