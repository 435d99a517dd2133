//! Client for the external commerce REST API.
//!
//! # Architecture
//!
//! - The API is the source of truth for catalog, cart, wishlist and orders
//! - Catalog reads are cached in memory via `moka`; everything else is live
//! - Customer requests carry the auth token in a `token` header
//!
//! # Example
//!
//! ```rust,ignore
//! use freshcart_storefront::api::{CommerceClient, ProductQuery};
//!
//! let client = CommerceClient::new(&config.api)?;
//! let page = client.products(&ProductQuery::default()).await?;
//! let cart = client.add_to_cart(&token, &page.data[0].id).await?;
//! ```

mod auth;
mod cache;
mod cart;
mod catalog;
mod client;
mod orders;
pub mod token;
pub mod types;

pub use catalog::{ProductQuery, ProductSort};
pub use client::CommerceClient;
pub use token::TokenClaims;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the commerce API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not have the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The API answered with a non-success status.
    #[error("API rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The token is missing, expired or invalid.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The auth token could not be decoded.
    #[error("Malformed token: {0}")]
    MalformedToken(String),
}

impl ApiError {
    /// Text to show the shopper.
    ///
    /// Messages the API wrote for humans are passed through; transport and
    /// decoding failures become `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected { message, .. } | Self::Unauthorized(message)
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            Self::RateLimited(_) => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            _ => fallback.to_string(),
        }
    }

    /// Whether the API said the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the token was rejected.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
