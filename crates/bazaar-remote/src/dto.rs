//! # Catalog DTOs
//!
//! Wire shapes of the two catalog hosts and their mapping to [`Product`].
//!
//! ## Leniency
//! Every field carries `#[serde(default)]` and unknown fields are ignored,
//! so a host adding, dropping or renaming an optional field never breaks a
//! listing. Numbers that arrive as strings are accepted too.
//!
//! ```text
//! dummyjson  {products:[ProductDto], total, skip, limit} ──► ProductPage
//! fakestore  [StoreProductDto]                           ──► Vec<Product>
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use bazaar_core::{
    Category, Dimensions, DiscountRate, Money, Product, ProductPage, Review,
};

// =============================================================================
// Lenient Number Helpers
// =============================================================================

/// Reads a JSON number or a numeric string. Null and anything else read as
/// zero.
fn loose_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = match serde_json::Value::deserialize(d)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(value.filter(|v: &f64| v.is_finite()).unwrap_or_default())
}

fn loose_i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(loose_f64(d)? as i64)
}

// =============================================================================
// dummyjson
// =============================================================================

/// `GET /products`, `/products/search`, `/products/category/{slug}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductListDto {
    pub products: Vec<ProductDto>,
    #[serde(deserialize_with = "loose_i64")]
    pub total: i64,
    #[serde(deserialize_with = "loose_i64")]
    pub skip: i64,
    #[serde(deserialize_with = "loose_i64")]
    pub limit: i64,
}

impl ProductListDto {
    pub fn into_page(self) -> ProductPage {
        ProductPage {
            products: self.products.into_iter().map(Product::from).collect(),
            total: self.total.max(0) as u64,
            skip: self.skip.max(0) as u64,
            limit: self.limit.max(0) as u64,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(deserialize_with = "loose_i64")]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(deserialize_with = "loose_f64")]
    pub price: f64,
    #[serde(deserialize_with = "loose_f64")]
    pub discount_percentage: f64,
    #[serde(deserialize_with = "loose_f64")]
    pub rating: f64,
    #[serde(deserialize_with = "loose_i64")]
    pub stock: i64,
    pub tags: Vec<String>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub dimensions: Option<DimensionsDto>,
    pub warranty_information: Option<String>,
    pub shipping_information: Option<String>,
    pub availability_status: Option<String>,
    pub reviews: Vec<ReviewDto>,
    pub return_policy: Option<String>,
    #[serde(deserialize_with = "loose_i64")]
    pub minimum_order_quantity: i64,
    pub images: Vec<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DimensionsDto {
    #[serde(deserialize_with = "loose_f64")]
    pub width: f64,
    #[serde(deserialize_with = "loose_f64")]
    pub height: f64,
    #[serde(deserialize_with = "loose_f64")]
    pub depth: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewDto {
    #[serde(deserialize_with = "loose_f64")]
    pub rating: f64,
    pub comment: String,
    pub date: Option<String>,
    pub reviewer_name: String,
    pub reviewer_email: Option<String>,
}

impl From<ReviewDto> for Review {
    fn from(dto: ReviewDto) -> Self {
        Review {
            rating: dto.rating.round().clamp(0.0, 5.0) as u8,
            comment: dto.comment,
            date: dto
                .date
                .as_deref()
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                .map(|d| d.with_timezone(&Utc)),
            reviewer_name: dto.reviewer_name,
            reviewer_email: dto.reviewer_email,
        }
    }
}

impl From<ProductDto> for Product {
    fn from(dto: ProductDto) -> Self {
        Product {
            id: dto.id,
            title: dto.title,
            description: dto.description,
            category: dto.category,
            brand: dto.brand.filter(|b| !b.trim().is_empty()),
            price_cents: Money::from_api_amount(dto.price).cents(),
            discount_bps: DiscountRate::from_percentage(dto.discount_percentage).bps(),
            rating: dto.rating.clamp(0.0, 5.0) as f32,
            rating_count: dto.reviews.len() as u32,
            stock: dto.stock.max(0),
            thumbnail: dto.thumbnail.filter(|t| !t.is_empty()),
            images: dto.images,
            tags: dto.tags,
            dimensions: dto.dimensions.map(|d| Dimensions {
                width: d.width,
                height: d.height,
                depth: d.depth,
            }),
            reviews: dto.reviews.into_iter().map(Review::from).collect(),
            warranty_information: dto.warranty_information,
            shipping_information: dto.shipping_information,
            return_policy: dto.return_policy,
            availability_status: dto.availability_status,
            minimum_order_quantity: dto.minimum_order_quantity.max(1) as u32,
        }
    }
}

/// `GET /products/categories`: objects on current hosts, plain strings on
/// older ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CategoryDto {
    Detailed {
        slug: String,
        #[serde(default)]
        name: Option<String>,
    },
    Plain(String),
}

impl From<CategoryDto> for Category {
    fn from(dto: CategoryDto) -> Self {
        match dto {
            CategoryDto::Detailed { slug, name } => Category {
                name: name.unwrap_or_else(|| slug.clone()),
                slug,
            },
            CategoryDto::Plain(name) => Category::from_name(name),
        }
    }
}

// =============================================================================
// fakestore
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreProductDto {
    #[serde(deserialize_with = "loose_i64")]
    pub id: i64,
    pub title: String,
    #[serde(deserialize_with = "loose_f64")]
    pub price: f64,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub rating: Option<StoreRatingDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreRatingDto {
    #[serde(deserialize_with = "loose_f64")]
    pub rate: f64,
    #[serde(deserialize_with = "loose_i64")]
    pub count: i64,
}

impl From<StoreProductDto> for Product {
    fn from(dto: StoreProductDto) -> Self {
        let (rating, rating_count) = dto
            .rating
            .map(|r| (r.rate.clamp(0.0, 5.0) as f32, r.count.max(0) as u32))
            .unwrap_or_default();
        let image = dto.image.filter(|i| !i.is_empty());

        Product {
            id: dto.id,
            title: dto.title,
            description: dto.description,
            category: dto.category,
            brand: None,
            price_cents: Money::from_api_amount(dto.price).cents(),
            discount_bps: 0,
            rating,
            rating_count,
            // This host does not report stock
            stock: 0,
            thumbnail: image.clone(),
            images: image.into_iter().collect(),
            tags: Vec::new(),
            dimensions: None,
            reviews: Vec::new(),
            warranty_information: None,
            shipping_information: None,
            return_policy: None,
            availability_status: None,
            minimum_order_quantity: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_dummyjson_product() {
        let json = r#"{
            "id": 1,
            "title": "Essence Mascara Lash Princess",
            "description": "Popular mascara",
            "category": "beauty",
            "price": 9.99,
            "discountPercentage": 7.17,
            "rating": 4.94,
            "stock": 5,
            "tags": ["beauty", "mascara"],
            "brand": "Essence",
            "sku": "RCH45Q1A",
            "weight": 2,
            "dimensions": {"width": 23.17, "height": 14.43, "depth": 28.01},
            "warrantyInformation": "1 month warranty",
            "shippingInformation": "Ships in 1 month",
            "availabilityStatus": "Low Stock",
            "reviews": [{
                "rating": 2, "comment": "Very unhappy with my purchase!",
                "date": "2024-05-23T08:56:21.618Z",
                "reviewerName": "John Doe", "reviewerEmail": "john.doe@x.com"
            }],
            "returnPolicy": "30 days return policy",
            "minimumOrderQuantity": 24,
            "meta": {"barcode": "9164035109868"},
            "images": ["https://cdn.example/1.png"],
            "thumbnail": "https://cdn.example/thumb.png"
        }"#;

        let product: Product = serde_json::from_str::<ProductDto>(json).unwrap().into();

        assert_eq!(product.price_cents, 999);
        assert_eq!(product.discount_bps, 717);
        assert_eq!(product.brand.as_deref(), Some("Essence"));
        assert_eq!(product.minimum_order_quantity, 24);
        assert_eq!(product.reviews.len(), 1);
        assert!(product.reviews[0].date.is_some());
        assert_eq!(product.rating_count, 1);
        assert_eq!(product.primary_image(), Some("https://cdn.example/thumb.png"));
    }

    #[test]
    fn test_missing_and_odd_fields_are_defaulted() {
        let json = r#"{"id": "12", "title": "Bare", "price": "19.5", "rating": null,
                       "reviews": [{"date": "not a date"}]}"#;

        let product: Product = serde_json::from_str::<ProductDto>(json).unwrap().into();

        assert_eq!(product.id, 12);
        assert_eq!(product.price_cents, 1950);
        assert_eq!(product.rating, 0.0);
        assert_eq!(product.stock, 0);
        assert_eq!(product.minimum_order_quantity, 1);
        assert!(product.reviews[0].date.is_none());
        assert!(product.dimensions.is_none());
    }

    #[test]
    fn test_non_numeric_values_read_as_zero() {
        let json = r#"{"id": 4, "title": "Odd", "price": {"amount": 3},
                       "stock": true, "rating": [4.5], "discountPercentage": "n/a"}"#;

        let product: Product = serde_json::from_str::<ProductDto>(json).unwrap().into();

        assert_eq!(product.price_cents, 0);
        assert_eq!(product.stock, 0);
        assert_eq!(product.rating, 0.0);
        assert_eq!(product.discount_bps, 0);
    }

    #[test]
    fn test_list_to_page() {
        let json = r#"{"products": [{"id": 1, "title": "A", "price": 1}],
                       "total": 194, "skip": 30, "limit": 1}"#;
        let page = serde_json::from_str::<ProductListDto>(json).unwrap().into_page();

        assert_eq!(page.products.len(), 1);
        assert_eq!(page.total, 194);
        assert_eq!(page.next_skip(), 31);
        assert!(page.has_more());
    }

    #[test]
    fn test_empty_object_is_empty_page() {
        let page = serde_json::from_str::<ProductListDto>("{}").unwrap().into_page();
        assert!(page.products.is_empty());
        assert!(!page.has_more());
    }

    #[test]
    fn test_fakestore_product() {
        let json = r#"{"id": 1, "title": "Backpack", "price": 109.95,
                       "description": "Fits 15 inch laptops", "category": "men's clothing",
                       "image": "https://fakestore.example/1.jpg",
                       "rating": {"rate": 3.9, "count": 120}}"#;

        let product: Product = serde_json::from_str::<StoreProductDto>(json).unwrap().into();

        assert_eq!(product.price_cents, 10995);
        assert_eq!(product.rating_count, 120);
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn test_categories_both_shapes() {
        let json = r#"[{"slug": "home-decoration", "name": "Home Decoration", "url": "x"},
                       "electronics"]"#;
        let categories: Vec<Category> = serde_json::from_str::<Vec<CategoryDto>>(json)
            .unwrap()
            .into_iter()
            .map(Category::from)
            .collect();

        assert_eq!(categories[0].slug, "home-decoration");
        assert_eq!(categories[0].name, "Home Decoration");
        assert_eq!(categories[1], Category::from_name("electronics"));
    }
}
