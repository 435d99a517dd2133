//! Cart and wishlist endpoints. Every call needs the customer token.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use freshcart_core::ProductId;

use super::ApiError;
use super::client::CommerceClient;
use super::types::{CartResponse, MessageResponse, WishlistMutation, WishlistResponse};

impl CommerceClient {
    /// The customer's cart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the customer has no cart yet, or an
    /// error if the API request fails.
    #[instrument(skip_all)]
    pub async fn cart(&self, token: &str) -> Result<CartResponse, ApiError> {
        let url = self.url("cart")?;
        self.execute(self.request(Method::GET, url, Some(token)))
            .await
    }

    /// Add one unit of `product`; the API increments existing lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the product or the request fails.
    #[instrument(skip(self, token), fields(product_id = %product))]
    pub async fn add_to_cart(
        &self,
        token: &str,
        product: &ProductId,
    ) -> Result<CartResponse, ApiError> {
        let url = self.url("cart")?;
        let request = self
            .request(Method::POST, url, Some(token))
            .json(&json!({ "productId": product }));
        self.execute(request).await
    }

    /// Set the count of an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update or the request fails.
    #[instrument(skip(self, token), fields(product_id = %product))]
    pub async fn update_cart_item(
        &self,
        token: &str,
        product: &ProductId,
        count: u32,
    ) -> Result<CartResponse, ApiError> {
        let url = self.url(&format!("cart/{product}"))?;
        let request = self
            .request(Method::PUT, url, Some(token))
            .json(&json!({ "count": count }));
        self.execute(request).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product))]
    pub async fn remove_cart_item(
        &self,
        token: &str,
        product: &ProductId,
    ) -> Result<CartResponse, ApiError> {
        let url = self.url(&format!("cart/{product}"))?;
        self.execute(self.request(Method::DELETE, url, Some(token)))
            .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn clear_cart(&self, token: &str) -> Result<MessageResponse, ApiError> {
        let url = self.url("cart")?;
        self.execute(self.request(Method::DELETE, url, Some(token)))
            .await
    }

    /// The customer's wishlist, with products populated.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn wishlist(&self, token: &str) -> Result<WishlistResponse, ApiError> {
        let url = self.url("wishlist")?;
        self.execute(self.request(Method::GET, url, Some(token)))
            .await
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the product or the request fails.
    #[instrument(skip(self, token), fields(product_id = %product))]
    pub async fn add_to_wishlist(
        &self,
        token: &str,
        product: &ProductId,
    ) -> Result<WishlistMutation, ApiError> {
        let url = self.url("wishlist")?;
        let request = self
            .request(Method::POST, url, Some(token))
            .json(&json!({ "productId": product }));
        self.execute(request).await
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product))]
    pub async fn remove_from_wishlist(
        &self,
        token: &str,
        product: &ProductId,
    ) -> Result<WishlistMutation, ApiError> {
        let url = self.url(&format!("wishlist/{product}"))?;
        self.execute(self.request(Method::DELETE, url, Some(token)))
            .await
    }
}
