//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use freshcart_core::ProductId;

use crate::api::{ProductQuery, ProductSort};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Nav, OptionalAuth};
use crate::services::{Shopper, WishlistService};
use crate::state::AppState;
use crate::views::{ProductCard, ProductDetail};

use super::parse_id;

/// Products per listing page.
const PAGE_SIZE: u32 = 20;

/// Products fetched in one go when searching; the whole catalog fits.
const SEARCH_POOL: u32 = 100;

/// Related products shown on the detail page.
const RELATED_COUNT: usize = 8;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
}

/// A sort menu entry.
pub struct SortOption {
    pub slug: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn sort_options(current: Option<ProductSort>) -> Vec<SortOption> {
    ProductSort::ALL
        .into_iter()
        .map(|sort| SortOption {
            slug: sort.slug(),
            label: sort.label(),
            selected: current == Some(sort),
        })
        .collect()
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub nav: Nav,
    pub products: Vec<ProductCard>,
    pub search: String,
    pub sort: String,
    pub sort_options: Vec<SortOption>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: usize,
}

impl ProductsIndexTemplate {
    #[must_use]
    pub const fn has_prev_page(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: Nav,
    pub product: ProductDetail,
    pub related: Vec<ProductCard>,
}

/// Display the product listing.
///
/// With `search`, the full catalog is fetched and filtered by title,
/// category and brand name; otherwise the API pages the results.
#[instrument(skip(state, session, customer, nav))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    nav: Nav,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse> {
    let sort = query.sort.as_deref().and_then(ProductSort::from_slug);
    let search = query.search.unwrap_or_default().trim().to_string();
    let needle = search.to_lowercase();

    let (products, current_page, total_pages) = if needle.is_empty() {
        let current_page = query.page.unwrap_or(1).max(1);
        let page = state
            .api()
            .products(&ProductQuery {
                limit: Some(PAGE_SIZE),
                page: Some(current_page),
                sort,
                ..ProductQuery::default()
            })
            .await?;
        let total_pages = page
            .metadata
            .as_ref()
            .map_or(1, |m| m.number_of_pages.max(1));
        (page.data, current_page, total_pages)
    } else {
        let page = state
            .api()
            .products(&ProductQuery {
                limit: Some(SEARCH_POOL),
                sort,
                ..ProductQuery::default()
            })
            .await?;
        let matches = page
            .data
            .into_iter()
            .filter(|p| p.matches_search(&needle))
            .collect();
        (matches, 1, 1)
    };

    let shopper = Shopper::from_customer(customer.as_ref());
    let wishlist = WishlistService::new(state.api(), &session)
        .ids(&shopper)
        .await;

    Ok(ProductsIndexTemplate {
        nav,
        total_results: products.len(),
        products: ProductCard::list(&products, &wishlist),
        search,
        sort: sort.map(ProductSort::slug).unwrap_or_default().to_string(),
        sort_options: sort_options(sort),
        current_page,
        total_pages,
    })
}

/// Display the product detail page.
#[instrument(skip(state, session, customer, nav))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    nav: Nav,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: ProductId =
        parse_id(&id).ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let product = state.api().product(&id).await?;

    let related = match &product.category {
        Some(category) => state
            .api()
            .products(&ProductQuery::in_category(category.id.clone()))
            .await
            .map(|page| {
                page.data
                    .into_iter()
                    .filter(|p| p.id != product.id)
                    .take(RELATED_COUNT)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load related products");
                Vec::new()
            }),
        None => Vec::new(),
    };

    let shopper = Shopper::from_customer(customer.as_ref());
    let wishlist = WishlistService::new(state.api(), &session)
        .ids(&shopper)
        .await;

    Ok(ProductShowTemplate {
        nav,
        product: ProductDetail::new(&product, &wishlist),
        related: ProductCard::list(&related, &wishlist),
    })
}
