//! Cart operations for guests and customers behind one interface.

use tower_sessions::Session;
use tracing::{instrument, warn};

use freshcart_core::{CartId, Price, ProductId};

use crate::api::{ApiError, CartResponse, CommerceClient};

use super::Shopper;
use super::badge::{Badge, clamp_count};
use super::guest::{GuestCart, MAX_LINE_COUNT};

/// A cart line ready for display.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub product: ProductId,
    pub title: String,
    pub image: Option<String>,
    pub category: String,
    pub brand: String,
    pub unit_price: Price,
    pub count: u32,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.count)
    }
}

/// The whole cart as shown on the cart and checkout pages.
#[derive(Debug, Clone, Default)]
pub struct CartSnapshot {
    /// Remote cart id; `None` for guests or customers without a cart.
    pub cart_id: Option<CartId>,
    pub items: Vec<CartItem>,
}

impl CartSnapshot {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.count).sum()
    }

    fn from_response(response: CartResponse) -> Self {
        let cart_id = response.cart_id.unwrap_or(response.data.id);
        let items = response
            .data
            .products
            .into_iter()
            .map(|line| {
                let summary = line.product.summary();
                CartItem {
                    product: line.product.id().clone(),
                    title: summary.map(|s| s.title.clone()).unwrap_or_default(),
                    image: summary.and_then(|s| s.image_cover.clone()),
                    category: summary
                        .and_then(|s| s.category.as_ref())
                        .map(|c| c.name.clone())
                        .unwrap_or_default(),
                    brand: summary
                        .and_then(|s| s.brand.as_ref())
                        .map(|b| b.name.clone())
                        .unwrap_or_default(),
                    unit_price: Price::from_api(line.price),
                    count: line.count,
                }
            })
            .collect();
        Self {
            cart_id: Some(cart_id),
            items,
        }
    }
}

/// Cart operations for the current visitor.
pub struct CartService<'a> {
    api: &'a CommerceClient,
    session: &'a Session,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(api: &'a CommerceClient, session: &'a Session) -> Self {
        Self { api, session }
    }

    /// Load the cart.
    ///
    /// Customers without a remote cart get an empty one. Guest lines whose
    /// product no longer exists are dropped from the guest cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all, fields(guest = shopper.is_guest()))]
    pub async fn view(&self, shopper: &Shopper) -> Result<CartSnapshot, ApiError> {
        match shopper {
            Shopper::Customer(token) => {
                let snapshot = match self.api.cart(token).await {
                    Ok(response) => CartSnapshot::from_response(response),
                    Err(ApiError::NotFound(_)) => CartSnapshot::default(),
                    Err(e) => return Err(e),
                };
                Badge::Cart
                    .set(self.session, clamp_count(snapshot.line_count()))
                    .await;
                Ok(snapshot)
            }
            Shopper::Guest => self.view_guest().await,
        }
    }

    async fn view_guest(&self) -> Result<CartSnapshot, ApiError> {
        let mut cart = GuestCart::load(self.session).await;
        let mut items = Vec::with_capacity(cart.line_count());
        let mut missing = Vec::new();

        for line in cart.lines() {
            match self.api.product(&line.product).await {
                Ok(product) => items.push(CartItem {
                    product: product.id.clone(),
                    title: product.title.clone(),
                    image: Some(product.image_cover.clone()),
                    category: product.category_name().to_string(),
                    brand: product.brand_name().to_string(),
                    unit_price: product.list_price(),
                    count: line.count,
                }),
                Err(ApiError::NotFound(_)) => missing.push(line.product.clone()),
                Err(e) => return Err(e),
            }
        }

        if !missing.is_empty() {
            for product in &missing {
                cart.remove(product);
            }
            warn!(pruned = missing.len(), "Dropped unavailable products from guest cart");
            if let Err(e) = cart.save(self.session).await {
                warn!(error = %e, "Failed to save pruned guest cart");
            }
        }

        Ok(CartSnapshot {
            cart_id: None,
            items,
        })
    }

    /// Add `quantity` units of `product`. Returns the new badge value.
    ///
    /// For customers the badge is bumped before the API call and rolled back
    /// if the call fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the API request
    /// fails.
    #[instrument(skip(self, shopper), fields(product_id = %product, guest = shopper.is_guest()))]
    pub async fn add(
        &self,
        shopper: &Shopper,
        product: &ProductId,
        quantity: u32,
    ) -> Result<u32, ApiError> {
        let quantity = quantity.clamp(1, MAX_LINE_COUNT);
        match shopper {
            Shopper::Guest => {
                // Reject unknown ids before they reach the blob.
                self.api.product(product).await?;
                let mut cart = GuestCart::load(self.session).await;
                cart.add(product.clone(), quantity);
                save_guest(&cart, self.session).await;
                Ok(clamp_count(cart.line_count()))
            }
            Shopper::Customer(token) => {
                let previous = Badge::Cart.bump(self.session).await;
                match self.add_remote(token, product, quantity).await {
                    Ok(response) => {
                        Badge::Cart
                            .set(self.session, response.num_of_cart_items)
                            .await;
                        Ok(response.num_of_cart_items)
                    }
                    Err(e) => {
                        Badge::Cart.restore(self.session, previous).await;
                        Err(e)
                    }
                }
            }
        }
    }

    /// The API adds one unit per call; larger quantities are set afterwards.
    async fn add_remote(
        &self,
        token: &str,
        product: &ProductId,
        quantity: u32,
    ) -> Result<CartResponse, ApiError> {
        let response = self.api.add_to_cart(token, product).await?;
        if quantity <= 1 {
            return Ok(response);
        }
        let count = response
            .data
            .count_of(product)
            .saturating_add(quantity - 1)
            .min(MAX_LINE_COUNT);
        self.api.update_cart_item(token, product, count).await
    }

    /// Set a line's count; 0 removes the line. Returns the new badge value.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, shopper), fields(product_id = %product, guest = shopper.is_guest()))]
    pub async fn update(
        &self,
        shopper: &Shopper,
        product: &ProductId,
        count: u32,
    ) -> Result<u32, ApiError> {
        if count == 0 {
            return self.remove(shopper, product).await;
        }
        let count = count.min(MAX_LINE_COUNT);
        match shopper {
            Shopper::Guest => {
                let mut cart = GuestCart::load(self.session).await;
                if cart.set_count(product, count) {
                    save_guest(&cart, self.session).await;
                }
                Ok(clamp_count(cart.line_count()))
            }
            Shopper::Customer(token) => {
                let response = self.api.update_cart_item(token, product, count).await?;
                Badge::Cart
                    .set(self.session, response.num_of_cart_items)
                    .await;
                Ok(response.num_of_cart_items)
            }
        }
    }

    /// Remove a line. Returns the new badge value.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, shopper), fields(product_id = %product, guest = shopper.is_guest()))]
    pub async fn remove(&self, shopper: &Shopper, product: &ProductId) -> Result<u32, ApiError> {
        match shopper {
            Shopper::Guest => {
                let mut cart = GuestCart::load(self.session).await;
                if cart.remove(product) {
                    save_guest(&cart, self.session).await;
                }
                Ok(clamp_count(cart.line_count()))
            }
            Shopper::Customer(token) => {
                let response = self.api.remove_cart_item(token, product).await?;
                Badge::Cart
                    .set(self.session, response.num_of_cart_items)
                    .await;
                Ok(response.num_of_cart_items)
            }
        }
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all, fields(guest = shopper.is_guest()))]
    pub async fn clear(&self, shopper: &Shopper) -> Result<(), ApiError> {
        match shopper {
            Shopper::Guest => {
                let mut cart = GuestCart::load(self.session).await;
                cart.clear();
                save_guest(&cart, self.session).await;
            }
            Shopper::Customer(token) => {
                self.api.clear_cart(token).await?;
                Badge::Cart.set(self.session, 0).await;
            }
        }
        Ok(())
    }

    /// Badge value for the navigation.
    ///
    /// Customers whose counter is unknown get it fetched once; failures show
    /// 0 without storing it.
    pub async fn badge(&self, shopper: &Shopper) -> u32 {
        match shopper {
            Shopper::Guest => clamp_count(GuestCart::load(self.session).await.line_count()),
            Shopper::Customer(token) => {
                if let Some(count) = Badge::Cart.get(self.session).await {
                    return count;
                }
                self.refresh_badge(token).await.unwrap_or(0)
            }
        }
    }

    /// Fetch the authoritative line count and store it.
    pub(crate) async fn refresh_badge(&self, token: &str) -> Option<u32> {
        let count = match self.api.cart(token).await {
            Ok(response) => response.num_of_cart_items,
            Err(ApiError::NotFound(_)) => 0,
            Err(e) => {
                warn!(error = %e, "Failed to refresh cart badge");
                return None;
            }
        };
        Badge::Cart.set(self.session, count).await;
        Some(count)
    }
}

async fn save_guest(cart: &GuestCart, session: &Session) {
    if let Err(e) = cart.save(session).await {
        warn!(error = %e, "Failed to save guest cart");
    }
}
