//! Checkout route handlers.
//!
//! Checkout is for signed-in customers only: the API places orders against
//! a remote cart, which guests do not have.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use freshcart_core::{CartId, Phone};

use crate::api::ShippingAddress;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{Nav, RequireAuth, set_flash};
use crate::models::{CurrentCustomer, Flash};
use crate::services::{CartService, CartSnapshot, Shopper, badge::Badge};
use crate::state::AppState;
use crate::views::CartView;

use super::capitalize;

/// Shipping form data.
#[derive(Debug, Default, Deserialize)]
pub struct ShippingForm {
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
}

impl ShippingForm {
    /// Validate every field, collecting one message per bad field.
    fn validate(&self) -> Result<ShippingAddress, Vec<String>> {
        let mut errors = Vec::new();
        let details = self.details.trim();
        let city = self.city.trim();

        if details.is_empty() {
            errors.push("Address details are required".to_string());
        }
        if city.is_empty() {
            errors.push("City is required".to_string());
        }
        let phone = Phone::parse(&self.phone).map_err(|e| errors.push(capitalize(&e.to_string())));

        match phone {
            Ok(phone) if errors.is_empty() => Ok(ShippingAddress {
                details: details.to_string(),
                phone: phone.into_inner(),
                city: city.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub nav: Nav,
    pub cart: CartView,
    pub form: ShippingForm,
    pub errors: Vec<String>,
}

/// Load the customer's cart, or `None` when there is nothing to check out.
async fn load_cart(
    state: &AppState,
    session: &Session,
    customer: &CurrentCustomer,
) -> Option<(CartId, CartSnapshot)> {
    let shopper = Shopper::from_customer(Some(customer));
    match CartService::new(state.api(), session).view(&shopper).await {
        Ok(snapshot) if !snapshot.is_empty() => {
            let cart_id = snapshot.cart_id.clone()?;
            Some((cart_id, snapshot))
        }
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "Failed to load cart for checkout");
            set_flash(session, Flash::error(e.user_message("Failed to load cart"))).await;
            None
        }
    }
}

/// Display the shipping form and order summary.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    nav: Nav,
) -> Response {
    let Some((_, snapshot)) = load_cart(&state, &session, &customer).await else {
        return Redirect::to("/cart").into_response();
    };

    CheckoutTemplate {
        nav,
        cart: CartView::from(&snapshot),
        form: ShippingForm::default(),
        errors: Vec::new(),
    }
    .into_response()
}

/// Re-render the form with validation errors.
fn invalid(nav: Nav, snapshot: &CartSnapshot, form: ShippingForm, errors: Vec<String>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutTemplate {
            nav,
            cart: CartView::from(snapshot),
            form,
            errors,
        },
    )
        .into_response()
}

/// Place a cash-on-delivery order.
#[instrument(skip_all)]
pub async fn cash(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    nav: Nav,
    Form(form): Form<ShippingForm>,
) -> Response {
    let Some((cart_id, snapshot)) = load_cart(&state, &session, &customer).await else {
        return Redirect::to("/cart").into_response();
    };
    let address = match form.validate() {
        Ok(address) => address,
        Err(errors) => return invalid(nav, &snapshot, form, errors),
    };

    match state
        .api()
        .create_cash_order(&customer.token, &cart_id, &address)
        .await
    {
        Ok(_) => {
            info!(cart_id = %cart_id, "Cash order placed");
            add_breadcrumb("checkout", "Cash order placed", None);
            Badge::Cart.set(&session, 0).await;
            set_flash(&session, Flash::success("Order placed successfully!")).await;
            Redirect::to("/orders").into_response()
        }
        Err(e) => {
            warn!(error = %e, cart_id = %cart_id, "Failed to place cash order");
            set_flash(&session, Flash::error(e.user_message("Failed to place order"))).await;
            Redirect::to("/checkout").into_response()
        }
    }
}

/// Start a hosted card payment and send the customer to it.
#[instrument(skip_all)]
pub async fn online(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    nav: Nav,
    Form(form): Form<ShippingForm>,
) -> Response {
    let Some((cart_id, snapshot)) = load_cart(&state, &session, &customer).await else {
        return Redirect::to("/cart").into_response();
    };
    let address = match form.validate() {
        Ok(address) => address,
        Err(errors) => return invalid(nav, &snapshot, form, errors),
    };

    let return_url = state.config().base_url.as_str();
    match state
        .api()
        .create_checkout_session(&customer.token, &cart_id, return_url, &address)
        .await
    {
        Ok(response) => {
            info!(cart_id = %cart_id, "Checkout session created");
            add_breadcrumb("checkout", "Redirecting to card payment", None);
            Redirect::to(&response.session.url).into_response()
        }
        Err(e) => {
            warn!(error = %e, cart_id = %cart_id, "Failed to create checkout session");
            set_flash(&session, Flash::error(e.user_message("Failed to initiate payment"))).await;
            Redirect::to("/checkout").into_response()
        }
    }
}
