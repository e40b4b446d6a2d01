//! # Catalog Commands
//!
//! Listing, detail, search and category browsing against the remote
//! catalog. Nothing here is cached; every call is one HTTP request.
//!
//! ## Which Host?
//! ```text
//! load_products / search_products / products_by_category / categories
//!     └──► paged host (dummyjson)         { products, total, skip, limit }
//!
//! store_products / store_products_by_category / store_categories
//!     └──► flat host (fakestore)          [ ... ]
//! ```

use serde::Serialize;
use tracing::debug;

use bazaar_core::validation::{validate_page_size, validate_search_query};
use bazaar_core::{Category, Product, ProductPage};
use bazaar_remote::ProductCatalog;

use crate::error::ApiResult;
use crate::state::{CartState, WishlistState};

/// Product detail screen payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    /// Quantity already in the cart (0 when absent)
    pub in_cart: i64,
    pub favorited: bool,
}

/// Gets one page of the catalog.
///
/// ## Arguments
/// * `limit` - Page size, 1-100
/// * `skip` - Number of products to skip
pub async fn load_products(
    catalog: &dyn ProductCatalog,
    limit: u64,
    skip: u64,
) -> ApiResult<ProductPage> {
    debug!(limit, skip, "load_products command");
    validate_page_size(limit)?;
    Ok(catalog.list_products(limit, skip).await?)
}

/// Gets a product with its cart and wishlist status.
pub async fn product_detail(
    catalog: &dyn ProductCatalog,
    cart: &CartState,
    wishlist: &WishlistState,
    product_id: i64,
) -> ApiResult<ProductDetail> {
    debug!(product_id, "product_detail command");

    let product = catalog.get_product(product_id).await?;
    let in_cart = cart.with_cart(|c| c.line(product_id).map_or(0, |l| l.quantity));

    Ok(ProductDetail {
        favorited: wishlist.contains(product_id),
        in_cart,
        product,
    })
}

/// Searches product titles and descriptions.
///
/// An empty query returns the regular listing.
pub async fn search_products(
    catalog: &dyn ProductCatalog,
    query: &str,
    limit: u64,
    skip: u64,
) -> ApiResult<ProductPage> {
    let query = validate_search_query(query)?;
    validate_page_size(limit)?;
    debug!(query = %query, limit, skip, "search_products command");

    if query.is_empty() {
        return Ok(catalog.list_products(limit, skip).await?);
    }
    Ok(catalog.search_products(&query, limit, skip).await?)
}

pub async fn products_by_category(
    catalog: &dyn ProductCatalog,
    slug: &str,
    limit: u64,
    skip: u64,
) -> ApiResult<ProductPage> {
    debug!(slug = %slug, "products_by_category command");
    validate_page_size(limit)?;
    Ok(catalog.products_by_category(slug, limit, skip).await?)
}

pub async fn categories(catalog: &dyn ProductCatalog) -> ApiResult<Vec<Category>> {
    Ok(catalog.categories().await?)
}

pub async fn store_products(catalog: &dyn ProductCatalog) -> ApiResult<Vec<Product>> {
    Ok(catalog.store_products().await?)
}

pub async fn store_products_by_category(
    catalog: &dyn ProductCatalog,
    name: &str,
) -> ApiResult<Vec<Product>> {
    debug!(name = %name, "store_products_by_category command");
    Ok(catalog.store_products_by_category(name).await?)
}

pub async fn store_categories(catalog: &dyn ProductCatalog) -> ApiResult<Vec<String>> {
    Ok(catalog.store_categories().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::test_support::{product, FakeCatalog};

    #[tokio::test]
    async fn test_page_size_is_validated() {
        let catalog = FakeCatalog::with_products(3);
        let err = load_products(&catalog, 0, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let page = load_products(&catalog, 2, 2).await.unwrap();
        assert_eq!(page.products.len(), 1);
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_detail_reports_cart_and_wishlist() {
        let catalog = FakeCatalog::with_products(3);
        let cart = CartState::new();
        let wishlist = WishlistState::new();
        cart.add(&product(2, 100), 3, None, None).unwrap();
        wishlist.add(&product(2, 100));

        let detail = product_detail(&catalog, &cart, &wishlist, 2).await.unwrap();
        assert_eq!(detail.in_cart, 3);
        assert!(detail.favorited);

        let err = product_detail(&catalog, &cart, &wishlist, 99)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_search_and_categories() {
        let catalog = FakeCatalog::with_products(12);

        let page = search_products(&catalog, "  product 1 ", 10, 0).await.unwrap();
        assert_eq!(page.total, 4); // 1, 10, 11, 12

        let all = search_products(&catalog, "", 5, 0).await.unwrap();
        assert_eq!(all.total, 12);

        let odd = products_by_category(&catalog, "odd", 100, 0).await.unwrap();
        assert_eq!(odd.total, 6);
        assert_eq!(categories(&catalog).await.unwrap().len(), 2);
        assert_eq!(store_products_by_category(&catalog, "even").await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_timeout_message() {
        let catalog = FakeCatalog::with_products(1);
        catalog.fail_with_timeout();
        let err = store_products(&catalog).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert_eq!(err.message, bazaar_remote::TIMEOUT_MESSAGE);
    }
}
