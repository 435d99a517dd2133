//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use freshcart_core::CategoryId;

use crate::api::{Category, ProductQuery};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Nav, OptionalAuth};
use crate::services::{Shopper, WishlistService};
use crate::state::AppState;
use crate::views::ProductCard;

use super::parse_id;

/// Category grid template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub nav: Nav,
    pub categories: Vec<Category>,
}

/// Single category template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub nav: Nav,
    pub category: Category,
    pub products: Vec<ProductCard>,
}

/// Display all categories.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, nav: Nav) -> Result<impl IntoResponse> {
    let categories = state.api().categories().await?;
    Ok(CategoriesIndexTemplate { nav, categories })
}

/// Display one category and its products.
#[instrument(skip(state, session, customer, nav))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    nav: Nav,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: CategoryId =
        parse_id(&id).ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    let query = ProductQuery::in_category(id.clone());
    let (category, products) =
        tokio::join!(state.api().category(&id), state.api().products(&query));
    let category = category?;
    let products = products?.data;

    let shopper = Shopper::from_customer(customer.as_ref());
    let wishlist = WishlistService::new(state.api(), &session)
        .ids(&shopper)
        .await;

    Ok(CategoryShowTemplate {
        nav,
        category,
        products: ProductCard::list(&products, &wishlist),
    })
}
