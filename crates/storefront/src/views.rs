//! Display data for templates.
//!
//! Templates get plain strings and flags; prices are formatted here so the
//! templates never do arithmetic.

use freshcart_core::{DeliveryStatus, PaymentStatus, Price, ProductId};

use crate::api::{Order, Product};
use crate::services::{CartItem, CartSnapshot};
use crate::services::guest::MAX_LINE_COUNT;

/// A product tile in grids and sliders.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub title: String,
    pub image: String,
    pub category: String,
    pub brand: String,
    /// Price to pay.
    pub price: String,
    /// Struck-through list price when on sale.
    pub original_price: Option<String>,
    pub discount_percent: Option<u32>,
    /// One decimal, e.g. "4.8".
    pub rating: String,
    pub in_stock: bool,
    pub in_wishlist: bool,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, wishlist: &[ProductId]) -> Self {
        let list = product.list_price();
        let sale = product.sale_price();
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            image: product.image_cover.clone(),
            category: product.category_name().to_string(),
            brand: product.brand_name().to_string(),
            price: sale.unwrap_or(list).to_string(),
            original_price: sale.map(|_| list.to_string()),
            discount_percent: product
                .price_after_discount
                .and_then(|after| discount_percent(product.price, after)),
            rating: format!("{:.1}", product.ratings_average),
            in_stock: product.quantity > 0,
            in_wishlist: wishlist.contains(&product.id),
        }
    }

    #[must_use]
    pub fn list(products: &[Product], wishlist: &[ProductId]) -> Vec<Self> {
        products.iter().map(|p| Self::new(p, wishlist)).collect()
    }
}

/// Whole-percent discount, if `after` is a real reduction.
fn discount_percent(price: f64, after: f64) -> Option<u32> {
    if price <= 0.0 || after >= price || after < 0.0 {
        return None;
    }
    let percent = ((price - after) / price * 100.0).round();
    // Bounded to 0..=100 by the checks above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(percent as u32).filter(|p| *p > 0)
}

/// Product detail page data.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub card: ProductCard,
    pub description: String,
    pub images: Vec<String>,
    pub ratings_quantity: u32,
    pub stock: i64,
    pub sold: u64,
    pub subcategories: Vec<String>,
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
    /// Largest quantity the form offers.
    pub max_quantity: u32,
    pub reviews: Vec<ReviewView>,
}

/// A review on the product page.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub author: String,
    pub rating: String,
    pub text: String,
}

impl ProductDetail {
    #[must_use]
    pub fn new(product: &Product, wishlist: &[ProductId]) -> Self {
        let mut images = product.images.clone();
        if images.is_empty() {
            images.push(product.image_cover.clone());
        }
        let stock = product.quantity.max(0);
        Self {
            card: ProductCard::new(product, wishlist),
            description: product.description.clone(),
            images,
            ratings_quantity: product.ratings_quantity,
            stock,
            sold: product.sold.unwrap_or(0),
            subcategories: product.subcategory.iter().map(|s| s.name.clone()).collect(),
            category_id: product.category.as_ref().map(|c| c.id.to_string()),
            brand_id: product.brand.as_ref().map(|b| b.id.to_string()),
            max_quantity: u32::try_from(stock)
                .unwrap_or(MAX_LINE_COUNT)
                .clamp(1, MAX_LINE_COUNT),
            reviews: product
                .reviews
                .iter()
                .map(|r| ReviewView {
                    author: r
                        .user
                        .as_ref()
                        .map_or_else(|| "Customer".to_string(), |u| u.name.clone()),
                    rating: format!("{:.1}", r.rating),
                    text: r.review.clone(),
                })
                .collect(),
        }
    }
}

/// A row on the cart page.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub title: String,
    pub image: Option<String>,
    pub category: String,
    pub brand: String,
    pub unit_price: String,
    pub line_total: String,
    pub count: u32,
    pub can_decrement: bool,
    pub can_increment: bool,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.to_string(),
            title: if item.title.is_empty() {
                "Product".to_string()
            } else {
                item.title.clone()
            },
            image: item.image.clone(),
            category: item.category.clone(),
            brand: item.brand.clone(),
            unit_price: item.unit_price.to_string(),
            line_total: item.line_total().to_string(),
            count: item.count,
            can_decrement: item.count > 1,
            can_increment: item.count < MAX_LINE_COUNT,
        }
    }
}

/// Cart page / checkout summary data.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub line_count: usize,
    pub total_quantity: u32,
}

impl From<&CartSnapshot> for CartView {
    fn from(snapshot: &CartSnapshot) -> Self {
        Self {
            lines: snapshot.items.iter().map(CartLineView::from).collect(),
            subtotal: snapshot.subtotal().to_string(),
            line_count: snapshot.line_count(),
            total_quantity: snapshot.total_quantity(),
        }
    }
}

/// A line in the order history.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub title: String,
    pub image: Option<String>,
    pub count: u32,
    pub price: String,
}

/// An order in the order history.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub number: String,
    pub placed_on: String,
    pub payment_method: &'static str,
    pub payment_status: &'static str,
    pub is_paid: bool,
    pub delivery_status: &'static str,
    pub is_delivered: bool,
    pub total: String,
    pub shipping: Option<String>,
    pub lines: Vec<OrderLineView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            number: order
                .number
                .map_or_else(|| order.id.to_string(), |n| n.to_string()),
            placed_on: order
                .created_at
                .map(|d| d.format("%B %-d, %Y").to_string())
                .unwrap_or_default(),
            payment_method: order.payment_method_type.label(),
            payment_status: PaymentStatus::from_flag(order.is_paid).label(),
            is_paid: order.is_paid,
            delivery_status: DeliveryStatus::from_flag(order.is_delivered).label(),
            is_delivered: order.is_delivered,
            total: Price::from_api(order.total_order_price).to_string(),
            shipping: order
                .shipping_address
                .as_ref()
                .map(|a| format!("{}, {} ({})", a.details, a.city, a.phone)),
            lines: order
                .cart_items
                .iter()
                .map(|line| {
                    let summary = line.product.summary();
                    OrderLineView {
                        title: summary.map_or_else(|| "Product".to_string(), |s| s.title.clone()),
                        image: summary.and_then(|s| s.image_cover.clone()),
                        count: line.count,
                        price: Price::from_api(line.price).times(line.count).to_string(),
                    }
                })
                .collect(),
        }
    }
}

/// Newest orders first.
#[must_use]
pub fn order_history(mut orders: Vec<Order>) -> Vec<OrderView> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders.iter().map(OrderView::from).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: f64, after: Option<f64>) -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": "6428ebc6dc1175abc65ca0b9",
            "title": "Woman Shawl",
            "quantity": 0,
            "price": price,
            "priceAfterDiscount": after,
            "imageCover": "https://img/cover.jpeg",
            "ratingsAverage": 4.76
        }))
        .unwrap()
    }

    #[test]
    fn card_shows_sale_price_and_discount() {
        let card = ProductCard::new(&product(200.0, Some(150.0)), &[]);
        assert_eq!(card.price, "EGP 150");
        assert_eq!(card.original_price.as_deref(), Some("EGP 200"));
        assert_eq!(card.discount_percent, Some(25));
        assert_eq!(card.rating, "4.8");
        assert!(!card.in_stock);
    }

    #[test]
    fn card_without_sale() {
        let card = ProductCard::new(&product(99.5, None), &[]);
        assert_eq!(card.price, "EGP 99.50");
        assert!(card.original_price.is_none());
        assert!(card.discount_percent.is_none());
    }

    #[test]
    fn card_marks_wishlisted() {
        let p = product(10.0, None);
        let card = ProductCard::new(&p, std::slice::from_ref(&p.id));
        assert!(card.in_wishlist);
    }

    #[test]
    fn detail_falls_back_to_cover_image_and_min_quantity() {
        let detail = ProductDetail::new(&product(10.0, None), &[]);
        assert_eq!(detail.images, vec!["https://img/cover.jpeg".to_string()]);
        assert_eq!(detail.max_quantity, 1);
    }

    #[test]
    fn discount_percent_edge_cases() {
        assert_eq!(discount_percent(100.0, 100.0), None);
        assert_eq!(discount_percent(0.0, 0.0), None);
        assert_eq!(discount_percent(100.0, 99.9), None);
        assert_eq!(discount_percent(100.0, 1.0), Some(99));
    }
}
