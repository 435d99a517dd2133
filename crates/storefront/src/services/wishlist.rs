//! Wishlist operations for guests and customers behind one interface.

use tower_sessions::Session;
use tracing::{instrument, warn};

use freshcart_core::ProductId;

use crate::api::{ApiError, CommerceClient, Product};
use crate::models::session_keys;

use super::Shopper;
use super::badge::{Badge, clamp_count};
use super::guest::GuestWishlist;

/// Wishlist operations for the current visitor.
pub struct WishlistService<'a> {
    api: &'a CommerceClient,
    session: &'a Session,
}

impl<'a> WishlistService<'a> {
    #[must_use]
    pub const fn new(api: &'a CommerceClient, session: &'a Session) -> Self {
        Self { api, session }
    }

    /// Load the wishlist products.
    ///
    /// Guest entries whose product no longer exists are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all, fields(guest = shopper.is_guest()))]
    pub async fn view(&self, shopper: &Shopper) -> Result<Vec<Product>, ApiError> {
        match shopper {
            Shopper::Customer(token) => {
                let products = self.api.wishlist(token).await?.data;
                let ids: Vec<ProductId> = products.iter().map(|p| p.id.clone()).collect();
                self.remember(&ids).await;
                Ok(products)
            }
            Shopper::Guest => {
                let mut list = GuestWishlist::load(self.session).await;
                let mut products = Vec::with_capacity(list.len());
                let mut missing = Vec::new();
                for id in list.ids() {
                    match self.api.product(id).await {
                        Ok(product) => products.push(product),
                        Err(ApiError::NotFound(_)) => missing.push(id.clone()),
                        Err(e) => return Err(e),
                    }
                }
                if !missing.is_empty() {
                    for id in &missing {
                        list.remove(id);
                    }
                    warn!(pruned = missing.len(), "Dropped unavailable products from guest wishlist");
                    save_guest(&list, self.session).await;
                }
                Ok(products)
            }
        }
    }

    /// Add a product. Returns the new badge value.
    ///
    /// For customers the badge is bumped before the API call and rolled back
    /// if the call fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the API request
    /// fails.
    #[instrument(skip(self, shopper), fields(product_id = %product, guest = shopper.is_guest()))]
    pub async fn add(&self, shopper: &Shopper, product: &ProductId) -> Result<u32, ApiError> {
        match shopper {
            Shopper::Guest => {
                self.api.product(product).await?;
                let mut list = GuestWishlist::load(self.session).await;
                if list.add(product.clone()) {
                    save_guest(&list, self.session).await;
                }
                Ok(clamp_count(list.len()))
            }
            Shopper::Customer(token) => {
                let previous = Badge::Wishlist.bump(self.session).await;
                match self.api.add_to_wishlist(token, product).await {
                    Ok(response) => Ok(self.remember(&response.data).await),
                    Err(e) => {
                        Badge::Wishlist.restore(self.session, previous).await;
                        Err(e)
                    }
                }
            }
        }
    }

    /// Remove a product. Returns the new badge value.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, shopper), fields(product_id = %product, guest = shopper.is_guest()))]
    pub async fn remove(&self, shopper: &Shopper, product: &ProductId) -> Result<u32, ApiError> {
        match shopper {
            Shopper::Guest => {
                let mut list = GuestWishlist::load(self.session).await;
                if list.remove(product) {
                    save_guest(&list, self.session).await;
                }
                Ok(clamp_count(list.len()))
            }
            Shopper::Customer(token) => {
                let response = self.api.remove_from_wishlist(token, product).await?;
                Ok(self.remember(&response.data).await)
            }
        }
    }

    /// Add if absent, remove if present. Returns whether it is now listed.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn toggle(&self, shopper: &Shopper, product: &ProductId) -> Result<bool, ApiError> {
        if self.ids(shopper).await.contains(product) {
            self.remove(shopper, product).await?;
            Ok(false)
        } else {
            self.add(shopper, product).await?;
            Ok(true)
        }
    }

    /// Ids currently listed, for heart state on product cards.
    ///
    /// For customers this is the set last seen from the API; it is fetched
    /// if this session has never seen it.
    pub async fn ids(&self, shopper: &Shopper) -> Vec<ProductId> {
        match shopper {
            Shopper::Guest => GuestWishlist::load(self.session).await.ids().to_vec(),
            Shopper::Customer(token) => {
                if let Ok(Some(ids)) = self
                    .session
                    .get::<Vec<ProductId>>(session_keys::WISHLIST_IDS)
                    .await
                {
                    return ids;
                }
                self.refresh(token).await.unwrap_or_default()
            }
        }
    }

    /// Badge value for the navigation.
    pub async fn badge(&self, shopper: &Shopper) -> u32 {
        match shopper {
            Shopper::Guest => clamp_count(GuestWishlist::load(self.session).await.len()),
            Shopper::Customer(token) => {
                if let Some(count) = Badge::Wishlist.get(self.session).await {
                    return count;
                }
                self.refresh(token)
                    .await
                    .map_or(0, |ids| clamp_count(ids.len()))
            }
        }
    }

    /// Fetch the remote wishlist and store its ids and count.
    pub(crate) async fn refresh(&self, token: &str) -> Option<Vec<ProductId>> {
        match self.api.wishlist(token).await {
            Ok(response) => {
                let ids: Vec<ProductId> = response.data.into_iter().map(|p| p.id).collect();
                self.remember(&ids).await;
                Some(ids)
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh wishlist badge");
                None
            }
        }
    }

    /// Store the authoritative id list and badge count.
    async fn remember(&self, ids: &[ProductId]) -> u32 {
        if let Err(e) = self.session.insert(session_keys::WISHLIST_IDS, ids).await {
            warn!(error = %e, "Failed to store wishlist ids");
        }
        let count = clamp_count(ids.len());
        Badge::Wishlist.set(self.session, count).await;
        count
    }
}

async fn save_guest(list: &GuestWishlist, session: &Session) {
    if let Err(e) = list.save(session).await {
        warn!(error = %e, "Failed to save guest wishlist");
    }
}
