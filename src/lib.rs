//! Cookie persistence for a shopping cart.
//!
//! A [`CookieValueStore`] mirrors one opaque string into one named cookie,
//! honoring the session's cookie lifetime/path/domain and a consent
//! restriction. [`CartCookie`] builds on it to remember the visitor's cart
//! across sessions.
pub mod cart;
pub mod config;
pub mod cookies;
pub mod errors;
pub mod restriction;
pub mod store;

pub use cart::{CartCookie, CartItem, CartSnapshot};
pub use config::{SessionConfig, SessionConfigError, SessionPolicy};
pub use errors::CookieError;
pub use restriction::{CookieRestriction, RestrictionPolicy};
pub use store::{CookieModel, CookieSlot, CookieValueStore};
