//! Shopping cart state persisted in a cookie.
//!
//! [`CartCookie`] keeps a small [`CartSnapshot`] (the quote id and the items
//! in the cart) and mirrors it, JSON-encoded, into the cart cookie. A visitor
//! returning in a later session gets the snapshot back from
//! [`read_cookie`](CookieModel::read_cookie).

use serde::{Deserialize, Serialize};

use crate::config::SessionPolicy;
use crate::cookies::CookieTransport;
use crate::errors::CookieError;
use crate::restriction::RestrictionPolicy;
use crate::store::{CookieModel, CookieSlot, CookieValueStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub sku: String,
    pub qty: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub quote_id: Option<u64>,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.quote_id.is_none() && self.items.is_empty()
    }

    /// Total quantity over all items.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.qty).fold(0, u32::saturating_add)
    }
}

pub struct CartCookie<T, S, R> {
    store: CookieValueStore<T, S, R>,
    cart: CartSnapshot,
}

impl<T, S, R> CartCookie<T, S, R>
where
    T: CookieTransport,
    S: SessionPolicy,
    R: RestrictionPolicy,
{
    /// Wraps `store` with an empty cart. Call [`read_cookie`](CookieModel::read_cookie) to load.
    pub fn new(store: CookieValueStore<T, S, R>) -> Self {
        Self {
            store,
            cart: CartSnapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &CartSnapshot {
        &self.cart
    }

    pub fn store(&self) -> &CookieValueStore<T, S, R> {
        &self.store
    }

    pub fn set_quote_id(&mut self, quote_id: Option<u64>) -> &mut Self {
        self.cart.quote_id = quote_id;
        self
    }

    /// Adds `qty` of `sku`, merging with an existing line for the same sku.
    pub fn add_item<K: Into<String>>(&mut self, sku: K, qty: u32) -> &mut Self {
        let sku = sku.into();
        if qty == 0 {
            return self;
        }

        if let Some(existing) = self.cart.items.iter_mut().find(|i| i.sku == sku) {
            existing.qty = existing.qty.saturating_add(qty);
        } else {
            self.cart.items.push(CartItem { sku, qty });
        }
        self
    }

    pub fn remove_item(&mut self, sku: &str) -> &mut Self {
        self.cart.items.retain(|i| i.sku != sku);
        self
    }

    /// Empties the cart. The cookie is removed on the next write.
    pub fn clear(&mut self) -> &mut Self {
        self.cart = CartSnapshot::default();
        self
    }

    pub fn into_inner(self) -> (CookieValueStore<T, S, R>, CartSnapshot) {
        (self.store, self.cart)
    }
}

impl<T, S, R> CookieModel for CartCookie<T, S, R>
where
    T: CookieTransport,
    S: SessionPolicy,
    R: RestrictionPolicy,
{
    fn slot(&mut self) -> &mut dyn CookieSlot {
        &mut self.store
    }

    fn read_cookie(&mut self) -> Result<&mut Self, CookieError> {
        self.cart = match self.store.read() {
            None => CartSnapshot::default(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!(
                    "Ignoring undecodable cookie '{}': {}",
                    self.store.cookie_name(),
                    e
                );
                CartSnapshot::default()
            }),
        };
        Ok(self)
    }

    fn write_cookie(&mut self) -> Result<&mut Self, CookieError> {
        if self.cart.is_empty() {
            self.store.update(None)?;
        } else {
            let value = serde_json::to_string(&self.cart)?;
            self.store.update(Some(&value))?;
        }
        Ok(self)
    }
}
