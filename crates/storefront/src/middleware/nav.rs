//! Navigation context for page handlers.
//!
//! Every full page shows the cart and wishlist badges, who is signed in and
//! the pending flash message. [`Nav`] gathers all of it in one extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::warn;

use crate::models::{Flash, session_keys};
use crate::services::{CartService, Shopper, WishlistService};
use crate::state::AppState;

use super::auth::{current_customer, request_path};

/// Queue a flash message for the next rendered page.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, flash).await {
        warn!(error = %e, "Failed to store flash message");
    }
}

/// Remove and return the pending flash message.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read flash message");
            None
        })
}

/// What the navigation bar and layout need.
#[derive(Debug, Clone, Default)]
pub struct Nav {
    pub cart_count: u32,
    pub wishlist_count: u32,
    /// Signed-in customer's name.
    pub user_name: Option<String>,
    pub flash: Option<Flash>,
    /// Path of the current page, for redirect-back forms.
    pub path: String,
}

impl Nav {
    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.user_name.is_some()
    }
}

impl FromRequestParts<AppState> for Nav {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = request_path(parts);

        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self {
                path,
                ..Self::default()
            });
        };

        let customer = current_customer(&session).await;
        let shopper = Shopper::from_customer(customer.as_ref());

        let cart_count = CartService::new(state.api(), &session)
            .badge(&shopper)
            .await;
        let wishlist_count = WishlistService::new(state.api(), &session)
            .badge(&shopper)
            .await;

        Ok(Self {
            cart_count,
            wishlist_count,
            user_name: customer.map(|c| c.name),
            flash: take_flash(&session).await,
            path,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn flash_is_consumed_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        set_flash(&session, Flash::success("Added to cart")).await;

        assert_eq!(
            take_flash(&session).await,
            Some(Flash::success("Added to cart"))
        );
        assert_eq!(take_flash(&session).await, None);
    }
}
