//! Order history.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{Nav, RequireAuth};
use crate::state::AppState;
use crate::views::{OrderView, order_history};

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub nav: Nav,
    pub orders: Vec<OrderView>,
}

/// Display the signed-in customer's orders, newest first.
#[instrument(skip_all, fields(user_id = %customer.user_id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    nav: Nav,
) -> Result<impl IntoResponse> {
    let orders = state
        .api()
        .user_orders(&customer.token, &customer.user_id)
        .await?;
    Ok(OrdersTemplate {
        nav,
        orders: order_history(orders),
    })
}
