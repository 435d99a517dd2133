//! FreshCart Core - Shared domain types.
//!
//! The storefront talks to an external commerce API that owns every entity
//! (products, carts, wishlists, orders, users). This crate holds the small
//! set of types the storefront uses to validate input before it reaches that
//! API and to present what comes back.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and testable in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for identifiers, prices, emails, phones and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
