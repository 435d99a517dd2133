//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `guest` - Session-held cart and wishlist for visitors who are not signed in
//! - `cart` - Cart operations over the guest cart or the remote cart
//! - `wishlist` - Wishlist operations over the guest list or the remote list
//! - `badge` - Optimistic navigation counters for customers
//! - `merge` - Moving guest data into the account on sign-in

pub mod badge;
pub mod cart;
pub mod guest;
pub mod merge;
pub mod wishlist;

pub use cart::{CartItem, CartService, CartSnapshot};
pub use guest::{GuestCart, GuestWishlist};
pub use merge::{MergeReport, merge_guest_into_account};
pub use wishlist::WishlistService;

use crate::models::CurrentCustomer;

/// Who the cart and wishlist belong to.
#[derive(Clone)]
pub enum Shopper {
    /// Not signed in: data lives in the session.
    Guest,
    /// Signed in: data lives in the API, addressed by this token.
    Customer(String),
}

impl Shopper {
    #[must_use]
    pub fn from_customer(customer: Option<&CurrentCustomer>) -> Self {
        customer.map_or(Self::Guest, |c| Self::Customer(c.token.clone()))
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

impl std::fmt::Debug for Shopper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Guest => f.write_str("Guest"),
            Self::Customer(_) => f.write_str("Customer([REDACTED])"),
        }
    }
}
