//! Brand route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use freshcart_core::BrandId;

use crate::api::{Brand, ProductQuery};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Nav, OptionalAuth};
use crate::services::{Shopper, WishlistService};
use crate::state::AppState;
use crate::views::ProductCard;

use super::parse_id;

/// Brand grid template.
#[derive(Template, WebTemplate)]
#[template(path = "brands/index.html")]
pub struct BrandsIndexTemplate {
    pub nav: Nav,
    pub brands: Vec<Brand>,
}

/// Single brand template.
#[derive(Template, WebTemplate)]
#[template(path = "brands/show.html")]
pub struct BrandShowTemplate {
    pub nav: Nav,
    pub brand: Brand,
    pub products: Vec<ProductCard>,
}

/// Display all brands.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, nav: Nav) -> Result<impl IntoResponse> {
    let brands = state.api().brands().await?;
    Ok(BrandsIndexTemplate { nav, brands })
}

/// Display one brand and its products.
#[instrument(skip(state, session, customer, nav))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    nav: Nav,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: BrandId = parse_id(&id).ok_or_else(|| AppError::NotFound(format!("brand {id}")))?;

    let query = ProductQuery::of_brand(id.clone());
    let (brand, products) = tokio::join!(state.api().brand(&id), state.api().products(&query));
    let brand = brand?;
    let products = products?.data;

    let shopper = Shopper::from_customer(customer.as_ref());
    let wishlist = WishlistService::new(state.api(), &session)
        .ids(&shopper)
        .await;

    Ok(BrandShowTemplate {
        nav,
        brand,
        products: ProductCard::list(&products, &wishlist),
    })
}
