//! Home page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::api::{Brand, Category, ProductQuery};
use crate::filters;
use crate::middleware::{Nav, OptionalAuth};
use crate::services::{Shopper, WishlistService};
use crate::state::AppState;
use crate::views::ProductCard;

/// Products shown in the featured grid.
const FEATURED_COUNT: u32 = 20;

/// A hero carousel slide.
pub struct HeroSlide {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub cta: &'static str,
    pub href: &'static str,
}

static HERO_SLIDES: [HeroSlide; 3] = [
    HeroSlide {
        title: "Fresh Products Delivered to your Door",
        subtitle: "Get 20% off your first order",
        cta: "Shop Now",
        href: "/products",
    },
    HeroSlide {
        title: "Premium Quality Guaranteed",
        subtitle: "Fresh from farm to your table",
        cta: "Browse Categories",
        href: "/categories",
    },
    HeroSlide {
        title: "Fast & Free Delivery",
        subtitle: "Same day delivery available",
        cta: "Start Shopping",
        href: "/products",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
    pub slides: &'static [HeroSlide],
    pub categories: Vec<Category>,
    pub products: Vec<ProductCard>,
    pub brands: Vec<Brand>,
}

/// Display the home page.
///
/// Each section degrades to empty on its own if the API fails.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    nav: Nav,
) -> impl IntoResponse {
    let api = state.api();
    let featured = ProductQuery {
        limit: Some(FEATURED_COUNT),
        ..ProductQuery::default()
    };
    let (categories, products, brands) =
        tokio::join!(api.categories(), api.products(&featured), api.brands());

    let categories = categories.unwrap_or_else(|e| {
        warn!(error = %e, "Home: failed to load categories");
        Vec::new()
    });
    let products = products.map(|page| page.data).unwrap_or_else(|e| {
        warn!(error = %e, "Home: failed to load products");
        Vec::new()
    });
    let brands = brands.unwrap_or_else(|e| {
        warn!(error = %e, "Home: failed to load brands");
        Vec::new()
    });

    let shopper = Shopper::from_customer(customer.as_ref());
    let wishlist = WishlistService::new(api, &session).ids(&shopper).await;

    HomeTemplate {
        nav,
        slides: &HERO_SLIDES,
        categories,
        products: ProductCard::list(&products, &wishlist),
        brands,
    }
}
