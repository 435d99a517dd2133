//! Session-held models for the storefront.

pub mod session;

pub use session::{CurrentCustomer, Flash, FlashLevel, keys as session_keys};
