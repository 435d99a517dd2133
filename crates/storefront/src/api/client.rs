//! HTTP plumbing shared by every endpoint module.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CommerceApiConfig;

use super::ApiError;
use super::cache::{CacheKey, CacheValue};

const USER_AGENT: &str = concat!("freshcart-storefront/", env!("CARGO_PKG_VERSION"));

/// Maximum number of cached catalog responses.
const CACHE_CAPACITY: u64 = 1000;

/// Header the API reads the customer token from.
const TOKEN_HEADER: &str = "token";

// =============================================================================
// CommerceClient
// =============================================================================

/// Client for the commerce REST API.
///
/// Cloning is cheap; all clones share one connection pool and one cache.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl CommerceClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &CommerceApiConfig) -> Result<Self, ApiError> {
        // Validate once so request URLs can be built by concatenation.
        Url::parse(&config.base_url)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CommerceClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// Absolute URL for an API path such as `products/{id}`.
    pub(super) fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.inner.base_url,
            path.trim_start_matches('/')
        ))?)
    }

    /// Start a request; attaches the customer token when given.
    pub(super) fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }

    pub(super) fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.inner.cache
    }

    /// Send a request and decode the JSON body.
    pub(super) async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Read as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            tracing::warn!(
                status = %status,
                message = %message,
                "Commerce API returned non-success status"
            );
            return Err(match status {
                StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
                StatusCode::NOT_FOUND => ApiError::NotFound(message),
                _ => ApiError::Rejected {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse commerce API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Clear every cached catalog response.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
        debug!("Catalog cache cleared");
    }

    /// Cheap reachability check for the readiness endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the API cannot be reached or answers with an error.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), ApiError> {
        let mut url = self.url("categories")?;
        url.query_pairs_mut().append_pair("limit", "1");
        self.execute::<serde_json::Value>(self.request(Method::GET, url, None))
            .await
            .map(|_| ())
    }
}

/// Pull the human-readable message out of an API error body.
///
/// Validation failures put it in `errors.msg`; everything else uses `message`.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let from_errors = value
        .get("errors")
        .and_then(|e| e.get("msg"))
        .and_then(serde_json::Value::as_str);
    let from_message = value.get("message").and_then(serde_json::Value::as_str);
    from_errors
        .or(from_message)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}
