//! Order status enums.
//!
//! The API reports order state as a payment method string plus two booleans
//! (`isPaid`, `isDelivered`). These enums give them names and labels.

use serde::{Deserialize, Serialize};

/// How an order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cash,
    /// Card payment through the hosted checkout session.
    Card,
}

impl PaymentMethod {
    /// Label shown on the orders page.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash on delivery",
            Self::Card => "Card",
        }
    }
}

/// Whether an order has been paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    /// Map the API's `isPaid` flag.
    #[must_use]
    pub const fn from_flag(is_paid: bool) -> Self {
        if is_paid { Self::Paid } else { Self::Pending }
    }

    /// Label shown on the orders page.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
        }
    }
}

/// Whether an order has been delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryStatus {
    #[default]
    Processing,
    Delivered,
}

impl DeliveryStatus {
    /// Map the API's `isDelivered` flag.
    #[must_use]
    pub const fn from_flag(is_delivered: bool) -> Self {
        if is_delivered {
            Self::Delivered
        } else {
            Self::Processing
        }
    }

    /// Label shown on the orders page.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Delivered => "Delivered",
        }
    }
}
