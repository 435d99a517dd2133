//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health, /health/ready     - Liveness / readiness
//!
//! # Catalog
//! GET  /products                  - Product listing (?search=&sort=&page=)
//! GET  /products/{id}             - Product detail
//! GET  /categories                - Category grid
//! GET  /categories/{id}           - Category products
//! GET  /brands                    - Brand grid
//! GET  /brands/{id}               - Brand products
//!
//! # Cart
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add product, redirect back
//! POST /cart/update               - Set line count
//! POST /cart/remove               - Remove line
//! POST /cart/clear                - Empty cart
//! GET  /cart/count                - Cart badge fragment
//!
//! # Wishlist
//! GET  /wishlist                  - Wishlist page
//! POST /wishlist/add | /remove | /toggle | /move-to-cart
//!
//! # Checkout and orders (signed in)
//! GET  /checkout                  - Shipping form and summary
//! POST /checkout/cash             - Cash on delivery order
//! POST /checkout/online           - Redirect to hosted card payment
//! GET  /orders                    - Order history
//!
//! # Auth
//! GET  /auth/login, POST          - Sign in (merges guest data)
//! GET  /auth/register, POST       - Sign up
//! POST /auth/logout               - Sign out
//! GET  /auth/forgot-password      - Reset flow page
//! POST /auth/forgot-password/send | /verify | /reset
//! GET  /auth/change-password, POST
//!
//! # Misc
//! GET  /contact, POST             - Contact form and FAQs
//! POST /newsletter                - Newsletter sign-up
//! ```

pub mod auth;
pub mod brands;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod wishlist;

use std::str::FromStr;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, is_local_path};
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(categories::index))
        .route("/categories/{id}", get(categories::show))
        .route("/brands", get(brands::index))
        .route("/brands/{id}", get(brands::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/toggle", post(wishlist::toggle))
        .route("/move-to-cart", post(wishlist::move_to_cart))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/cash", post(checkout::cash))
        .route("/online", post(checkout::online))
}

/// Create the auth routes router.
///
/// Form posts are rate limited per client IP; pages are not.
pub fn auth_routes() -> Router<AppState> {
    let pages = Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/forgot-password", get(auth::forgot_password_page))
        .route("/change-password", get(auth::change_password_page))
        .route("/logout", post(auth::logout));

    let actions = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/forgot-password/send", post(auth::send_reset_code))
        .route("/forgot-password/verify", post(auth::verify_reset_code))
        .route("/forgot-password/reset", post(auth::reset_password))
        .route("/change-password", post(auth::change_password))
        .layer(auth_rate_limiter());

    pages.merge(actions)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/checkout", checkout_routes())
        .route("/orders", get(orders::index))
        .nest("/auth", auth_routes())
        .route("/contact", get(contact::show).post(contact::submit))
        .route("/newsletter", post(newsletter::subscribe))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the commerce API is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

// =============================================================================
// Form helpers
// =============================================================================

/// Redirect to `return_to` when it is a local path, else to `fallback`.
pub(crate) fn redirect_back(return_to: Option<&str>, fallback: &str) -> Redirect {
    match return_to.map(str::trim) {
        Some(path) if is_local_path(path) => Redirect::to(path),
        _ => Redirect::to(fallback),
    }
}

/// Parse an id from a form or path, `None` if malformed.
pub(crate) fn parse_id<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

/// Upper-case the first letter of a validation message.
pub(crate) fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use freshcart_core::ProductId;

    use super::*;

    fn location(redirect: Redirect) -> String {
        redirect.into_response().headers()["location"]
            .to_str()
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn redirect_back_accepts_only_local_paths() {
        assert_eq!(location(redirect_back(Some("/products?page=2"), "/")), "/products?page=2");
        assert_eq!(location(redirect_back(Some("https://evil.example"), "/cart")), "/cart");
        assert_eq!(location(redirect_back(Some("//evil.example"), "/cart")), "/cart");
        assert_eq!(location(redirect_back(None, "/wishlist")), "/wishlist");
    }

    #[test]
    fn parse_id_validates() {
        assert!(parse_id::<ProductId>(" 6428ebc6dc1175abc65ca0b9 ").is_some());
        assert!(parse_id::<ProductId>("../admin").is_none());
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("email domain is invalid"), "Email domain is invalid");
        assert_eq!(capitalize(""), "");
    }
}
