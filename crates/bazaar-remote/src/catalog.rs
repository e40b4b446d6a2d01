//! # Product Catalog Client
//!
//! HTTP GET against the two catalog hosts, mapped to domain products.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Primary host (dummyjson)                 → {products,total,skip,limit} │
//! │    GET /products?limit=&skip=             list_products                 │
//! │    GET /products/{id}                     get_product                   │
//! │    GET /products/search?q=&limit=&skip=   search_products               │
//! │    GET /products/category/{slug}          products_by_category          │
//! │    GET /products/categories               categories                    │
//! │                                                                         │
//! │  Secondary host (fakestore)               → flat JSON array             │
//! │    GET /products                          store_products                │
//! │    GET /products/category/{name}          store_products_by_category    │
//! │    GET /products/categories               store_categories              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every request shares one `reqwest::Client` with a fixed timeout
//! (15 s by default). There are no retries; a timeout becomes
//! [`RemoteError::Timeout`].

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::dto::{CategoryDto, ProductDto, ProductListDto, StoreProductDto};
use crate::error::{RemoteError, RemoteResult};
use bazaar_core::{Category, Product, ProductPage};

/// Default primary catalog host.
pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com/";

/// Default secondary catalog host.
pub const DEFAULT_STORE_URL: &str = "https://fakestoreapi.com/";

/// Default request ceiling.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

// =============================================================================
// Configuration
// =============================================================================

/// Catalog client configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub catalog_url: Url,
    pub store_url: Url,
    pub timeout: Duration,
}

impl CatalogConfig {
    /// Builds a config from string URLs.
    ///
    /// A trailing `/` is added when missing so relative joins keep any
    /// base path.
    pub fn new(catalog_url: &str, store_url: &str, timeout: Duration) -> RemoteResult<Self> {
        Ok(CatalogConfig {
            catalog_url: parse_base_url(catalog_url)?,
            store_url: parse_base_url(store_url)?,
            timeout,
        })
    }

    /// Public hosts with the default timeout.
    pub fn public() -> RemoteResult<Self> {
        Self::new(DEFAULT_CATALOG_URL, DEFAULT_STORE_URL, DEFAULT_HTTP_TIMEOUT)
    }
}

/// Parses a base URL, normalizing it to end in `/`.
pub(crate) fn parse_base_url(raw: &str) -> RemoteResult<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// =============================================================================
// Catalog Trait
// =============================================================================

/// Read access to the product catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn list_products(&self, limit: u64, skip: u64) -> RemoteResult<ProductPage>;

    async fn get_product(&self, id: i64) -> RemoteResult<Product>;

    async fn search_products(&self, query: &str, limit: u64, skip: u64)
        -> RemoteResult<ProductPage>;

    async fn products_by_category(
        &self,
        slug: &str,
        limit: u64,
        skip: u64,
    ) -> RemoteResult<ProductPage>;

    async fn categories(&self) -> RemoteResult<Vec<Category>>;

    async fn store_products(&self) -> RemoteResult<Vec<Product>>;

    async fn store_products_by_category(&self, name: &str) -> RemoteResult<Vec<Product>>;

    async fn store_categories(&self) -> RemoteResult<Vec<String>>;
}

// =============================================================================
// HTTP Client
// =============================================================================

/// reqwest-backed catalog client.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> RemoteResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::InvalidConfig(e.to_string()))?;
        Ok(CatalogClient { http, config })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// GETs `base + segments` with query pairs and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        base: &Url,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> RemoteResult<T> {
        let mut url = endpoint(base, segments)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        debug!(url = %url, "GET");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Catalog request failed");
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: api_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.map_transport(e))?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Parse(e.to_string()))
    }

    fn map_transport(&self, err: reqwest::Error) -> RemoteError {
        match RemoteError::from(err) {
            RemoteError::Timeout { .. } => RemoteError::Timeout {
                secs: self.config.timeout.as_secs(),
            },
            other => other,
        }
    }

    fn paging(limit: u64, skip: u64) -> [(&'static str, String); 2] {
        [("limit", limit.to_string()), ("skip", skip.to_string())]
    }
}

/// Pulls `message` out of an error body like `{"message": "Product with id '0' not found"}`.
fn api_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl ProductCatalog for CatalogClient {
    #[instrument(skip(self))]
    async fn list_products(&self, limit: u64, skip: u64) -> RemoteResult<ProductPage> {
        let dto: ProductListDto = self
            .get_json(&self.config.catalog_url, &["products"], &Self::paging(limit, skip))
            .await?;
        Ok(dto.into_page())
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: i64) -> RemoteResult<Product> {
        let id = id.to_string();
        let dto: ProductDto = self
            .get_json(&self.config.catalog_url, &["products", id.as_str()], &[])
            .await?;
        Ok(dto.into())
    }

    #[instrument(skip(self))]
    async fn search_products(
        &self,
        query: &str,
        limit: u64,
        skip: u64,
    ) -> RemoteResult<ProductPage> {
        let [limit, skip] = Self::paging(limit, skip);
        let dto: ProductListDto = self
            .get_json(
                &self.config.catalog_url,
                &["products", "search"],
                &[("q", query.to_string()), limit, skip],
            )
            .await?;
        Ok(dto.into_page())
    }

    #[instrument(skip(self))]
    async fn products_by_category(
        &self,
        slug: &str,
        limit: u64,
        skip: u64,
    ) -> RemoteResult<ProductPage> {
        let dto: ProductListDto = self
            .get_json(
                &self.config.catalog_url,
                &["products", "category", slug],
                &Self::paging(limit, skip),
            )
            .await?;
        Ok(dto.into_page())
    }

    async fn categories(&self) -> RemoteResult<Vec<Category>> {
        let dtos: Vec<CategoryDto> = self
            .get_json(&self.config.catalog_url, &["products", "categories"], &[])
            .await?;
        Ok(dtos.into_iter().map(Category::from).collect())
    }

    async fn store_products(&self) -> RemoteResult<Vec<Product>> {
        let dtos: Vec<StoreProductDto> =
            self.get_json(&self.config.store_url, &["products"], &[]).await?;
        Ok(dtos.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn store_products_by_category(&self, name: &str) -> RemoteResult<Vec<Product>> {
        let dtos: Vec<StoreProductDto> = self
            .get_json(&self.config.store_url, &["products", "category", name], &[])
            .await?;
        Ok(dtos.into_iter().map(Product::from).collect())
    }

    async fn store_categories(&self) -> RemoteResult<Vec<String>> {
        self.get_json(&self.config.store_url, &["products", "categories"], &[])
            .await
    }
}

/// Appends path segments to a base URL. Each segment is percent-encoded on
/// its own, so a `/` inside a category name stays part of that segment.
fn endpoint(base: &Url, segments: &[&str]) -> RemoteResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| RemoteError::InvalidUrl(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: &str, timeout: Duration) -> CatalogClient {
        CatalogClient::new(CatalogConfig::new(base, base, timeout).unwrap()).unwrap()
    }

    fn catalog_router() -> Router {
        Router::new()
            .route(
                "/products",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!({
                        "products": [{"id": 1, "title": "Mascara", "price": 9.99}],
                        "total": 100,
                        "skip": q.get("skip").and_then(|s| s.parse::<u64>().ok()).unwrap_or(0),
                        "limit": q.get("limit").and_then(|s| s.parse::<u64>().ok()).unwrap_or(30),
                        "unexpected": true
                    }))
                }),
            )
            .route(
                "/products/{id}",
                get(|Path(id): Path<String>| async move {
                    match id.as_str() {
                        "search" => (
                            StatusCode::OK,
                            Json(json!({"products": [], "total": 0, "skip": 0, "limit": 0})),
                        ),
                        "categories" => (
                            StatusCode::OK,
                            Json(json!([{"slug": "beauty", "name": "Beauty"}, "electronics"])),
                        ),
                        "7" => (
                            StatusCode::OK,
                            Json(json!({"id": 7, "title": "Lamp", "price": "12.5"})),
                        ),
                        _ => (
                            StatusCode::NOT_FOUND,
                            Json(json!({"message": format!("Product with id '{}' not found", id)})),
                        ),
                    }
                }),
            )
            .route(
                "/products/category/{slug}",
                get(|Path(slug): Path<String>| async move {
                    // fakestore-style flat array for names with spaces
                    if slug.contains(' ') {
                        Json(json!([{"id": 3, "title": "Jacket", "price": 55.99,
                                     "category": slug, "rating": {"rate": 4.1, "count": 7}}]))
                    } else {
                        Json(json!({"products": [{"id": 2, "title": "Lipstick", "price": 5,
                                                  "category": slug}],
                                    "total": 1, "skip": 0, "limit": 1}))
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_list_products_pages() {
        let base = serve(catalog_router()).await;
        let page = client(&base, DEFAULT_HTTP_TIMEOUT)
            .list_products(10, 20)
            .await
            .unwrap();

        assert_eq!(page.skip, 20);
        assert_eq!(page.limit, 10);
        assert_eq!(page.total, 100);
        assert_eq!(page.products[0].price_cents, 999);
    }

    #[tokio::test]
    async fn test_get_product_and_not_found() {
        let base = serve(catalog_router()).await;
        let client = client(&base, DEFAULT_HTTP_TIMEOUT);

        let product = client.get_product(7).await.unwrap();
        assert_eq!(product.price_cents, 1250);

        match client.get_product(0).await.unwrap_err() {
            RemoteError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_category_and_categories() {
        let base = serve(catalog_router()).await;
        let client = client(&base, DEFAULT_HTTP_TIMEOUT);

        let page = client.products_by_category("beauty", 10, 0).await.unwrap();
        assert_eq!(page.products[0].category, "beauty");

        let page = client
            .products_by_category("home/garden", 10, 0)
            .await
            .unwrap();
        assert_eq!(page.products[0].category, "home/garden");

        let categories = client.categories().await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[1].slug, "electronics");

        let jackets = client
            .store_products_by_category("men's clothing")
            .await
            .unwrap();
        assert_eq!(jackets[0].category, "men's clothing");
        assert_eq!(jackets[0].rating_count, 7);
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let router = Router::new().route(
            "/products",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(Value::Null)
            }),
        );
        let base = serve(router).await;

        let err = client(&base, Duration::from_millis(200))
            .list_products(10, 0)
            .await
            .unwrap_err();

        assert!(err.is_timeout(), "got {err:?}");
        assert_eq!(
            err.user_message(),
            "Request timed out. Please check your connection."
        );
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}", addr), DEFAULT_HTTP_TIMEOUT)
            .store_products()
            .await
            .unwrap_err();
        assert!(err.is_network());
    }

    #[test]
    fn test_public_config() {
        let config = CatalogConfig::public().unwrap();
        assert_eq!(config.catalog_url.as_str(), DEFAULT_CATALOG_URL);
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_base_url_normalized() {
        let url = parse_base_url("https://example.com/api").unwrap();
        assert_eq!(url.join("products").unwrap().as_str(), "https://example.com/api/products");
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_endpoint_encodes_each_segment() {
        let base = parse_base_url("https://example.com/api").unwrap();
        assert_eq!(
            endpoint(&base, &["products", "category", "men's clothing"])
                .unwrap()
                .as_str(),
            "https://example.com/api/products/category/men's%20clothing"
        );
        assert_eq!(
            endpoint(&base, &["products", "category", "home/garden"])
                .unwrap()
                .as_str(),
            "https://example.com/api/products/category/home%2Fgarden"
        );

        let opaque = Url::parse("mailto:shop@example.com").unwrap();
        assert!(matches!(
            endpoint(&opaque, &["products"]),
            Err(RemoteError::InvalidUrl(_))
        ));
    }
}
