//! Guest cart and wishlist.
//!
//! While no one is signed in the cart and wishlist live in the visitor's
//! session as plain JSON lists. They hold only product ids and counts;
//! product details are looked up from the (cached) catalog when rendered.

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tower_sessions::Session;
use tracing::warn;

use freshcart_core::ProductId;

use crate::models::session_keys;

/// Highest count a single line can hold.
pub const MAX_LINE_COUNT: u32 = 99;

/// Read a JSON list from the session.
///
/// Missing keys, store errors and undecodable blobs all give `T::default()`.
async fn load_blob<T: DeserializeOwned + Default>(session: &Session, key: &str) -> T {
    let raw = match session.get::<serde_json::Value>(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(error = %e, key, "Failed to read guest data from session");
            return T::default();
        }
    };

    serde_json::from_value(raw).unwrap_or_else(|e| {
        warn!(error = %e, key, "Discarding corrupt guest data");
        T::default()
    })
}

// =============================================================================
// GuestCart
// =============================================================================

/// One guest cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCartLine {
    pub product: ProductId,
    pub count: u32,
}

/// The guest cart: ordered lines, one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestCart {
    lines: Vec<GuestCartLine>,
}

impl GuestCart {
    /// Load from the session. Never fails.
    pub async fn load(session: &Session) -> Self {
        load_blob(session, session_keys::GUEST_CART).await
    }

    /// Write back to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::GUEST_CART, self).await
    }

    /// Add `count` units of `product`.
    ///
    /// Appends a new line or raises an existing line's count (capped at
    /// [`MAX_LINE_COUNT`]). Returns `true` if a new line was created.
    pub fn add(&mut self, product: ProductId, count: u32) -> bool {
        if count == 0 {
            return false;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product == product) {
            line.count = line.count.saturating_add(count).min(MAX_LINE_COUNT);
            return false;
        }
        self.lines.push(GuestCartLine {
            product,
            count: count.min(MAX_LINE_COUNT),
        });
        true
    }

    /// Set the count of an existing line; 0 removes it.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn set_count(&mut self, product: &ProductId, count: u32) -> bool {
        if count == 0 {
            return self.remove(product);
        }
        match self.lines.iter_mut().find(|l| &l.product == product) {
            Some(line) => {
                line.count = count.min(MAX_LINE_COUNT);
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns `false` if it was not there.
    pub fn remove(&mut self, product: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.product != product);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn lines(&self) -> &[GuestCartLine] {
        &self.lines
    }

    /// Number of distinct products (the badge value).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.count).sum()
    }

    #[must_use]
    pub fn contains(&self, product: &ProductId) -> bool {
        self.lines.iter().any(|l| &l.product == product)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// GuestWishlist
// =============================================================================

/// The guest wishlist: product ids in insertion order, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestWishlist {
    ids: Vec<ProductId>,
}

impl GuestWishlist {
    /// Load from the session. Never fails.
    pub async fn load(session: &Session) -> Self {
        load_blob(session, session_keys::GUEST_WISHLIST).await
    }

    /// Write back to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::GUEST_WISHLIST, self).await
    }

    /// Add a product. Returns `false` if it was already there.
    pub fn add(&mut self, product: ProductId) -> bool {
        if self.contains(&product) {
            return false;
        }
        self.ids.push(product);
        true
    }

    /// Remove a product. Returns `false` if it was not there.
    pub fn remove(&mut self, product: &ProductId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| id != product);
        self.ids.len() != before
    }

    /// Add if absent, remove if present. Returns whether it is now listed.
    pub fn toggle(&mut self, product: ProductId) -> bool {
        if self.remove(&product) {
            false
        } else {
            self.ids.push(product);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, product: &ProductId) -> bool {
        self.ids.contains(product)
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
