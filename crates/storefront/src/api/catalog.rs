//! Catalog endpoints: categories, brands and products.
//!
//! All reads here are cached; see [`CacheKey`].

use reqwest::Method;
use tracing::{debug, instrument};

use freshcart_core::{BrandId, CategoryId, ProductId};

use super::ApiError;
use super::cache::{CacheKey, CacheValue};
use super::client::CommerceClient;
use super::types::{Brand, Category, DataResponse, ListResponse, Product};

/// Sort orders the product list supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    Newest,
    TopRated,
    BestSelling,
}

impl ProductSort {
    /// Every option, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Newest,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::TopRated,
        Self::BestSelling,
    ];

    /// Value of the API's `sort` parameter.
    #[must_use]
    pub const fn api_value(self) -> &'static str {
        match self {
            Self::PriceAsc => "price",
            Self::PriceDesc => "-price",
            Self::Newest => "-createdAt",
            Self::TopRated => "-ratingsAverage",
            Self::BestSelling => "-sold",
        }
    }

    /// Value used in storefront URLs.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Newest => "newest",
            Self::TopRated => "top-rated",
            Self::BestSelling => "best-selling",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
            Self::Newest => "Newest",
            Self::TopRated => "Top rated",
            Self::BestSelling => "Best selling",
        }
    }

    /// Parse a URL slug; unknown values mean "no sort".
    #[must_use]
    pub fn from_slug(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sort| sort.slug() == s)
    }
}

/// Filters for the product list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub sort: Option<ProductSort>,
    pub category: Option<CategoryId>,
    pub brand: Option<BrandId>,
}

impl ProductQuery {
    /// Products in one category.
    #[must_use]
    pub fn in_category(category: CategoryId) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    /// Products of one brand.
    #[must_use]
    pub fn of_brand(brand: BrandId) -> Self {
        Self {
            brand: Some(brand),
            ..Self::default()
        }
    }

    fn append_to(&self, url: &mut url::Url) {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.api_value().to_string()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category[in]", category.to_string()));
        }
        if let Some(brand) = &self.brand {
            pairs.push(("brand", brand.to_string()));
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
    }
}

impl CommerceClient {
    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache().get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.url("categories")?;
        let response: ListResponse<Category> =
            self.execute(self.request(Method::GET, url, None)).await?;

        self.cache()
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(response.data.clone()),
            )
            .await;
        Ok(response.data)
    }

    /// One category.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids, or an error if the API
    /// request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let key = CacheKey::Category(id.clone());
        if let Some(CacheValue::Category(category)) = self.cache().get(&key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let url = self.url(&format!("categories/{id}"))?;
        let response: DataResponse<Option<Category>> =
            self.execute(self.request(Method::GET, url, None)).await?;
        let category = response
            .data
            .ok_or_else(|| ApiError::NotFound(format!("Category not found: {id}")))?;

        self.cache()
            .insert(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }

    /// All brands.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn brands(&self) -> Result<Vec<Brand>, ApiError> {
        if let Some(CacheValue::Brands(brands)) = self.cache().get(&CacheKey::Brands).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let mut url = self.url("brands")?;
        // The API pages brands at 40 by default.
        url.query_pairs_mut().append_pair("limit", "100");
        let response: ListResponse<Brand> =
            self.execute(self.request(Method::GET, url, None)).await?;

        self.cache()
            .insert(CacheKey::Brands, CacheValue::Brands(response.data.clone()))
            .await;
        Ok(response.data)
    }

    /// One brand.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids, or an error if the API
    /// request fails.
    #[instrument(skip(self), fields(brand_id = %id))]
    pub async fn brand(&self, id: &BrandId) -> Result<Brand, ApiError> {
        let key = CacheKey::Brand(id.clone());
        if let Some(CacheValue::Brand(brand)) = self.cache().get(&key).await {
            debug!("Cache hit for brand");
            return Ok(*brand);
        }

        let url = self.url(&format!("brands/{id}"))?;
        let response: DataResponse<Option<Brand>> =
            self.execute(self.request(Method::GET, url, None)).await?;
        let brand = response
            .data
            .ok_or_else(|| ApiError::NotFound(format!("Brand not found: {id}")))?;

        self.cache()
            .insert(key, CacheValue::Brand(Box::new(brand.clone())))
            .await;
        Ok(brand)
    }

    /// A page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<ListResponse<Product>, ApiError> {
        let key = CacheKey::Products(query.clone());
        if let Some(CacheValue::Products(page)) = self.cache().get(&key).await {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let mut url = self.url("products")?;
        query.append_to(&mut url);
        let page: ListResponse<Product> =
            self.execute(self.request(Method::GET, url, None)).await?;

        self.cache()
            .insert(key, CacheValue::Products(page.clone()))
            .await;
        Ok(page)
    }

    /// One product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids, or an error if the API
    /// request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.cache().get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.url(&format!("products/{id}"))?;
        let response: DataResponse<Option<Product>> =
            self.execute(self.request(Method::GET, url, None)).await?;
        let product = response
            .data
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))?;

        self.cache()
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }
}
