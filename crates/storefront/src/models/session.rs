//! Session-related types.
//!
//! Everything the storefront keeps per visitor lives in the session: the
//! signed-in customer, guest cart and wishlist blobs, badge counters and the
//! pending flash message.

use std::fmt;

use serde::{Deserialize, Serialize};

use freshcart_core::UserId;

/// Session-stored customer identity.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// API auth token, sent as the `token` header.
    pub token: String,
    /// User id decoded from the token.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    pub email: String,
}

impl fmt::Debug for CurrentCustomer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentCustomer")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("email", &self.email)
            .finish()
    }
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    /// CSS modifier class.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash--success",
            Self::Error => "flash--error",
        }
    }
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// The signed-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Guest cart lines (JSON list).
    pub const GUEST_CART: &str = "guest_cart";

    /// Guest wishlist product ids (JSON list).
    pub const GUEST_WISHLIST: &str = "guest_wishlist";

    /// Customer cart badge counter.
    pub const CART_COUNT: &str = "cart_count";

    /// Customer wishlist badge counter.
    pub const WISHLIST_COUNT: &str = "wishlist_count";

    /// Product ids on the customer's remote wishlist, for heart state.
    pub const WISHLIST_IDS: &str = "wishlist_ids";

    /// Pending flash message.
    pub const FLASH: &str = "flash";

    /// Email the password reset code was sent to.
    pub const RESET_EMAIL: &str = "reset_email";

    /// Whether the reset code for `RESET_EMAIL` was verified.
    pub const RESET_VERIFIED: &str = "reset_verified";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let customer = CurrentCustomer {
            token: "eyJhbGciOiJIUzI1NiJ9.secret.sig".to_string(),
            user_id: UserId::parse("64c8b1d2e7c7a3b1a1f0c0aa").unwrap(),
            name: "Mona".to_string(),
            email: "mona@example.com".to_string(),
        };
        let debug = format!("{customer:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_flash_constructors() {
        assert_eq!(Flash::success("ok").level, FlashLevel::Success);
        assert_eq!(Flash::error("no").level.css_class(), "flash--error");
    }
}
