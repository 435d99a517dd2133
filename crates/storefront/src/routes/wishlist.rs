//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use freshcart_core::ProductId;

use crate::filters;
use crate::middleware::{Nav, OptionalAuth, set_flash};
use crate::models::Flash;
use crate::services::{CartService, Shopper, WishlistService, badge::clamp_count};
use crate::state::AppState;
use crate::views::ProductCard;

use super::{parse_id, redirect_back};

/// Wishlist form data, shared by every wishlist action.
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub product_id: String,
    pub return_to: Option<String>,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub nav: Nav,
    pub products: Vec<ProductCard>,
}

/// Display the wishlist.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    mut nav: Nav,
) -> impl IntoResponse {
    let shopper = Shopper::from_customer(customer.as_ref());
    let products = match WishlistService::new(state.api(), &session)
        .view(&shopper)
        .await
    {
        Ok(products) => {
            nav.wishlist_count = clamp_count(products.len());
            products
        }
        Err(e) => {
            warn!(error = %e, "Failed to load wishlist");
            nav.flash = Some(Flash::error(e.user_message("Failed to load wishlist")));
            Vec::new()
        }
    };

    let listed: Vec<ProductId> = products.iter().map(|p| p.id.clone()).collect();
    WishlistShowTemplate {
        nav,
        products: ProductCard::list(&products, &listed),
    }
}

/// Add a product to the wishlist.
#[instrument(skip(state, session, customer))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<WishlistForm>,
) -> Redirect {
    let back = redirect_back(form.return_to.as_deref(), "/wishlist");
    let Some(product) = parse_id::<ProductId>(&form.product_id) else {
        set_flash(&session, Flash::error("Failed to add to wishlist")).await;
        return back;
    };

    let shopper = Shopper::from_customer(customer.as_ref());
    let flash = match WishlistService::new(state.api(), &session)
        .add(&shopper, &product)
        .await
    {
        Ok(_) => Flash::success("Added to wishlist"),
        Err(e) => {
            warn!(error = %e, product_id = %product, "Failed to add to wishlist");
            Flash::error(e.user_message("Failed to add to wishlist"))
        }
    };
    set_flash(&session, flash).await;
    back
}

/// Remove a product from the wishlist.
#[instrument(skip(state, session, customer))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<WishlistForm>,
) -> Redirect {
    let back = redirect_back(form.return_to.as_deref(), "/wishlist");
    let Some(product) = parse_id::<ProductId>(&form.product_id) else {
        set_flash(&session, Flash::error("Failed to remove from wishlist")).await;
        return back;
    };

    let shopper = Shopper::from_customer(customer.as_ref());
    let flash = match WishlistService::new(state.api(), &session)
        .remove(&shopper, &product)
        .await
    {
        Ok(_) => Flash::success("Removed from wishlist"),
        Err(e) => {
            warn!(error = %e, product_id = %product, "Failed to remove from wishlist");
            Flash::error(e.user_message("Failed to remove from wishlist"))
        }
    };
    set_flash(&session, flash).await;
    back
}

/// Heart button: add when absent, remove when present.
#[instrument(skip(state, session, customer))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<WishlistForm>,
) -> Redirect {
    let back = redirect_back(form.return_to.as_deref(), "/wishlist");
    let Some(product) = parse_id::<ProductId>(&form.product_id) else {
        set_flash(&session, Flash::error("Failed to update wishlist")).await;
        return back;
    };

    let shopper = Shopper::from_customer(customer.as_ref());
    let flash = match WishlistService::new(state.api(), &session)
        .toggle(&shopper, &product)
        .await
    {
        Ok(true) => Flash::success("Added to wishlist"),
        Ok(false) => Flash::success("Removed from wishlist"),
        Err(e) => {
            warn!(error = %e, product_id = %product, "Failed to toggle wishlist");
            Flash::error(e.user_message("Failed to update wishlist"))
        }
    };
    set_flash(&session, flash).await;
    back
}

/// Move a product from the wishlist to the cart.
///
/// The wishlist entry is only removed once the cart accepted the product.
#[instrument(skip(state, session, customer))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<WishlistForm>,
) -> Redirect {
    let back = redirect_back(form.return_to.as_deref(), "/wishlist");
    let Some(product) = parse_id::<ProductId>(&form.product_id) else {
        set_flash(&session, Flash::error("Failed to add to cart")).await;
        return back;
    };

    let shopper = Shopper::from_customer(customer.as_ref());
    if let Err(e) = CartService::new(state.api(), &session)
        .add(&shopper, &product, 1)
        .await
    {
        warn!(error = %e, product_id = %product, "Failed to move wishlist item to cart");
        set_flash(&session, Flash::error(e.user_message("Failed to add to cart"))).await;
        return back;
    }

    let flash = match WishlistService::new(state.api(), &session)
        .remove(&shopper, &product)
        .await
    {
        Ok(_) => Flash::success("Moved to cart"),
        Err(e) => {
            warn!(error = %e, product_id = %product, "Added to cart but wishlist removal failed");
            Flash::success("Added to cart!")
        }
    };
    set_flash(&session, flash).await;
    back
}
