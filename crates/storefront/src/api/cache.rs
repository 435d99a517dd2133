//! Cache types for catalog responses.

use freshcart_core::{BrandId, CategoryId, ProductId};

use super::catalog::ProductQuery;
use super::types::{Brand, Category, ListResponse, Product};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Category(CategoryId),
    Brands,
    Brand(BrandId),
    Products(ProductQuery),
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Category(Box<Category>),
    Brands(Vec<Brand>),
    Brand(Box<Brand>),
    Products(ListResponse<Product>),
    Product(Box<Product>),
}
