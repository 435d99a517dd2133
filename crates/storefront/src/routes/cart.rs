//! Cart route handlers.
//!
//! Every mutation is a plain form post answered with a redirect back to the
//! page it came from; the outcome travels as a flash message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use freshcart_core::ProductId;

use crate::filters;
use crate::middleware::{Nav, OptionalAuth, set_flash};
use crate::models::Flash;
use crate::services::{CartService, CartSnapshot, Shopper, badge::clamp_count};
use crate::state::AppState;
use crate::views::CartView;

use super::{parse_id, redirect_back};

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
    pub return_to: Option<String>,
}

/// Update line form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub count: u32,
    pub return_to: Option<String>,
}

/// Remove line form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
    pub return_to: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: Nav,
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    mut nav: Nav,
) -> impl IntoResponse {
    let shopper = Shopper::from_customer(customer.as_ref());
    let snapshot = match CartService::new(state.api(), &session).view(&shopper).await {
        Ok(snapshot) => {
            // Pruned or refreshed lines may have changed the badge.
            nav.cart_count = clamp_count(snapshot.line_count());
            snapshot
        }
        Err(e) => {
            warn!(error = %e, "Failed to load cart");
            nav.flash = Some(Flash::error(e.user_message("Failed to load cart")));
            CartSnapshot::default()
        }
    };

    CartShowTemplate {
        nav,
        cart: CartView::from(&snapshot),
    }
}

/// Add a product to the cart and redirect back.
#[instrument(skip(state, session, customer))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    let back = redirect_back(form.return_to.as_deref(), "/cart");
    let Some(product) = parse_id::<ProductId>(&form.product_id) else {
        set_flash(&session, Flash::error("Failed to add to cart")).await;
        return back;
    };

    let shopper = Shopper::from_customer(customer.as_ref());
    let quantity = form.quantity.unwrap_or(1);
    let flash = match CartService::new(state.api(), &session)
        .add(&shopper, &product, quantity)
        .await
    {
        Ok(_) => Flash::success("Added to cart!"),
        Err(e) => {
            warn!(error = %e, product_id = %product, "Failed to add to cart");
            Flash::error(e.user_message("Failed to add to cart"))
        }
    };
    set_flash(&session, flash).await;
    back
}

/// Set a line's count and redirect back.
#[instrument(skip(state, session, customer))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<UpdateCartForm>,
) -> Redirect {
    let back = redirect_back(form.return_to.as_deref(), "/cart");
    let Some(product) = parse_id::<ProductId>(&form.product_id) else {
        set_flash(&session, Flash::error("Failed to update cart")).await;
        return back;
    };

    let shopper = Shopper::from_customer(customer.as_ref());
    if let Err(e) = CartService::new(state.api(), &session)
        .update(&shopper, &product, form.count)
        .await
    {
        warn!(error = %e, product_id = %product, "Failed to update cart");
        set_flash(&session, Flash::error(e.user_message("Failed to update cart"))).await;
    }
    back
}

/// Remove a line and redirect back.
#[instrument(skip(state, session, customer))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Redirect {
    let back = redirect_back(form.return_to.as_deref(), "/cart");
    let Some(product) = parse_id::<ProductId>(&form.product_id) else {
        set_flash(&session, Flash::error("Failed to remove item")).await;
        return back;
    };

    let shopper = Shopper::from_customer(customer.as_ref());
    let flash = match CartService::new(state.api(), &session)
        .remove(&shopper, &product)
        .await
    {
        Ok(_) => Flash::success("Item removed"),
        Err(e) => {
            warn!(error = %e, product_id = %product, "Failed to remove from cart");
            Flash::error(e.user_message("Failed to remove item"))
        }
    };
    set_flash(&session, flash).await;
    back
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Redirect {
    let shopper = Shopper::from_customer(customer.as_ref());
    let flash = match CartService::new(state.api(), &session).clear(&shopper).await {
        Ok(()) => Flash::success("Cart cleared"),
        Err(e) => {
            warn!(error = %e, "Failed to clear cart");
            Flash::error(e.user_message("Failed to clear cart"))
        }
    };
    set_flash(&session, flash).await;
    Redirect::to("/cart")
}

/// Cart count badge fragment.
#[instrument(skip_all)]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Response {
    let shopper = Shopper::from_customer(customer.as_ref());
    let count = CartService::new(state.api(), &session)
        .badge(&shopper)
        .await;
    CartCountTemplate { count }.into_response()
}
