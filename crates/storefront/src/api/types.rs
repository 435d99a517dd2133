//! Wire types for the commerce API.
//!
//! These mirror the JSON the API returns closely enough to deserialize it;
//! fields the storefront never shows are left out and ignored by serde.
//! Prices arrive as JSON numbers and are converted to [`Price`] at the view
//! layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use freshcart_core::{
    BrandId, CartId, CategoryId, OrderId, PaymentMethod, Price, ProductId, SubcategoryId, UserId,
};

// =============================================================================
// Envelopes
// =============================================================================

/// Paginated list envelope (`{results, metadata, data: [...]}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub results: Option<u32>,
    #[serde(default)]
    pub metadata: Option<PageMetadata>,
    pub data: Vec<T>,
}

/// Pagination metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub current_page: u32,
    pub number_of_pages: u32,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub next_page: Option<u32>,
    #[serde(default)]
    pub prev_page: Option<u32>,
}

/// Single-resource envelope (`{data: {...}}`).
#[derive(Debug, Clone, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Envelope for endpoints that only acknowledge (`{message: "success"}`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_msg: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// Product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Product brand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: BrandId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Subcategory reference embedded in a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(rename = "_id")]
    pub id: SubcategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Review author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewUser {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
}

/// A product review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub user: Option<ReviewUser>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Units in stock.
    #[serde(default)]
    pub quantity: i64,
    pub price: f64,
    #[serde(default)]
    pub price_after_discount: Option<f64>,
    pub image_cover: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub brand: Option<Brand>,
    #[serde(default)]
    pub subcategory: Vec<Subcategory>,
    #[serde(default)]
    pub ratings_average: f64,
    #[serde(default)]
    pub ratings_quantity: u32,
    #[serde(default)]
    pub sold: Option<u64>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// List price.
    #[must_use]
    pub fn list_price(&self) -> Price {
        Price::from_api(self.price)
    }

    /// Discounted price, if the product is on sale.
    #[must_use]
    pub fn sale_price(&self) -> Option<Price> {
        self.price_after_discount
            .filter(|p| *p < self.price)
            .map(Price::from_api)
    }

    /// Category name, or empty.
    #[must_use]
    pub fn category_name(&self) -> &str {
        self.category.as_ref().map_or("", |c| c.name.as_str())
    }

    /// Brand name, or empty.
    #[must_use]
    pub fn brand_name(&self) -> &str {
        self.brand.as_ref().map_or("", |b| b.name.as_str())
    }

    /// Case-insensitive match of `needle` against title, category and brand.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.category_name().to_lowercase().contains(needle)
            || self.brand_name().to_lowercase().contains(needle)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Product data embedded in a cart line (no price; the line carries it).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProductSummary {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_cover: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub brand: Option<Brand>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// The `product` field of a cart line.
///
/// `POST /cart` returns bare ids; the other cart endpoints populate it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CartProduct {
    Populated(Box<CartProductSummary>),
    Id(ProductId),
}

impl CartProduct {
    /// The product id, whichever shape was returned.
    #[must_use]
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Populated(summary) => &summary.id,
            Self::Id(id) => id,
        }
    }

    /// The populated summary, if present.
    #[must_use]
    pub fn summary(&self) -> Option<&CartProductSummary> {
        match self {
            Self::Populated(summary) => Some(summary),
            Self::Id(_) => None,
        }
    }
}

/// A line in the remote cart.
#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
    pub count: u32,
    pub product: CartProduct,
    /// Unit price.
    pub price: f64,
}

/// The remote cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: CartId,
    #[serde(default)]
    pub products: Vec<CartLine>,
    #[serde(default)]
    pub total_cart_price: f64,
}

impl Cart {
    /// Count for `product`, or 0.
    #[must_use]
    pub fn count_of(&self, product: &ProductId) -> u32 {
        self.products
            .iter()
            .find(|line| line.product.id() == product)
            .map_or(0, |line| line.count)
    }
}

/// Response of every cart endpoint except clear.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub num_of_cart_items: u32,
    #[serde(default)]
    pub cart_id: Option<CartId>,
    pub data: Cart,
}

// =============================================================================
// Wishlist
// =============================================================================

/// `GET /wishlist` response.
#[derive(Debug, Clone, Deserialize)]
pub struct WishlistResponse {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub data: Vec<Product>,
}

/// Add/remove wishlist response: the resulting list of ids.
#[derive(Debug, Clone, Deserialize)]
pub struct WishlistMutation {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<ProductId>,
}

// =============================================================================
// Orders
// =============================================================================

/// Shipping address submitted with an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
}

/// A line of a placed order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    pub count: u32,
    pub product: CartProduct,
    pub price: f64,
}

/// A placed order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// Human-facing sequential order number.
    #[serde(rename = "id", default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub tax_price: f64,
    #[serde(default)]
    pub shipping_price: f64,
    pub total_order_price: f64,
    #[serde(default)]
    pub payment_method_type: PaymentMethod,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_delivered: bool,
    #[serde(default)]
    pub cart_items: Vec<OrderLine>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// `POST /orders/{cart}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CashOrderResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub data: Order,
}

/// Hosted payment session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub url: String,
}

/// `POST /orders/checkout-session/{cart}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub session: CheckoutSession,
}

// =============================================================================
// Auth
// =============================================================================

/// The user as returned by sign-in/sign-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Sign-in / sign-up / change-password response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
    pub token: String,
}

/// `PUT /auth/resetPassword` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Sign-up request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
    pub re_password: String,
    pub phone: String,
}
