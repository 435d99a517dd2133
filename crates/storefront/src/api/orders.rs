//! Order endpoints: cash orders, hosted card checkout and history.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use freshcart_core::{CartId, UserId};

use super::ApiError;
use super::client::CommerceClient;
use super::types::{CashOrderResponse, CheckoutSessionResponse, Order, ShippingAddress};

impl CommerceClient {
    /// Place a cash-on-delivery order for the whole cart.
    ///
    /// The API empties the cart on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order or the request fails.
    #[instrument(skip(self, token, address), fields(cart_id = %cart))]
    pub async fn create_cash_order(
        &self,
        token: &str,
        cart: &CartId,
        address: &ShippingAddress,
    ) -> Result<CashOrderResponse, ApiError> {
        let url = self.url(&format!("orders/{cart}"))?;
        let request = self
            .request(Method::POST, url, Some(token))
            .json(&json!({ "shippingAddress": address }));
        self.execute(request).await
    }

    /// Open a hosted card payment session for the cart.
    ///
    /// `return_url` is where the payment page sends the shopper afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request or it fails.
    #[instrument(skip(self, token, address), fields(cart_id = %cart))]
    pub async fn create_checkout_session(
        &self,
        token: &str,
        cart: &CartId,
        return_url: &str,
        address: &ShippingAddress,
    ) -> Result<CheckoutSessionResponse, ApiError> {
        let mut url = self.url(&format!("orders/checkout-session/{cart}"))?;
        url.query_pairs_mut().append_pair("url", return_url);
        let request = self
            .request(Method::POST, url, Some(token))
            .json(&json!({ "shippingAddress": address }));
        self.execute(request).await
    }

    /// Every order the user has placed. The endpoint returns a bare array.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(user_id = %user))]
    pub async fn user_orders(&self, token: &str, user: &UserId) -> Result<Vec<Order>, ApiError> {
        let url = self.url(&format!("orders/user/{user}"))?;
        self.execute(self.request(Method::GET, url, Some(token))).await
    }
}
