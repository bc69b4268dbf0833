//! # Product Types
//!
//! Product catalog types for the storefront.
//! Products live in the `products` collection and are edited from the admin.

use crate::error::{ShopError, ShopResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product category.
///
/// The shop started with jewellery and woodwork; any other value is kept
/// verbatim so new categories need no code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Jewellery,
    Wooden,
    Other(String),
}

impl Category {
    /// Returns the stored category name
    pub fn as_str(&self) -> &str {
        match self {
            Category::Jewellery => "jewellery",
            Category::Wooden => "wooden",
            Category::Other(name) => name,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "jewellery" => Category::Jewellery,
            "wooden" => Category::Wooden,
            _ => Category::Other(value),
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category::from(value.to_string())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive a URL-safe slug from a product name.
///
/// Lowercases, turns spaces into hyphens and `&` into `and`, then drops every
/// character that is neither alphanumeric nor a hyphen. Slugs are not unique.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "-")
        .replace('&', "and")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}

/// Editable product fields, as sent by the admin on create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: Category,
    pub stock: i64,
    /// Image URLs; update replaces the stored list with this one
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductInput {
    /// Check scalar constraints before anything is written
    pub fn validate(&self) -> ShopResult<()> {
        if self.name.trim().is_empty() {
            return Err(ShopError::Validation("name must not be empty".to_string()));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ShopError::Validation(
                "price must be greater than zero".to_string(),
            ));
        }
        if self.stock < 0 {
            return Err(ShopError::Validation(
                "stock must not be negative".to_string(),
            ));
        }
        if u32::try_from(self.stock).is_err() {
            return Err(ShopError::Validation("stock is too large".to_string()));
        }
        if self.category.as_str().is_empty() {
            return Err(ShopError::Validation(
                "category must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn stock_count(&self) -> u32 {
        u32::try_from(self.stock).unwrap_or(0)
    }
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier (UUID v4)
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price in rupees
    pub price: f64,

    /// Long description
    pub description: String,

    /// Category used by the storefront filters
    pub category: Category,

    /// Units in stock
    pub stock: u32,

    /// Image URLs in display order
    #[serde(default)]
    pub images: Vec<String>,

    /// Slug derived from `name`
    pub slug: String,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Create a new product from validated input
    pub fn from_input(input: ProductInput) -> Self {
        let slug = slugify(&input.name);
        let stock = input.stock_count();
        Self {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            price: input.price,
            description: input.description,
            category: input.category,
            stock,
            images: input.images,
            slug,
            created_at: Utc::now(),
        }
    }

    /// Replace every editable field, keeping `id` and `created_at`
    pub fn apply(&mut self, input: ProductInput) {
        self.slug = slugify(&input.name);
        self.stock = input.stock_count();
        self.name = input.name;
        self.price = input.price;
        self.description = input.description;
        self.category = input.category;
        self.images = input.images;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_input() -> ProductInput {
        ProductInput {
            name: "Gold & Silver Ring".to_string(),
            price: 1499.0,
            description: "Handmade".to_string(),
            category: Category::Jewellery,
            stock: 3,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Gold & Silver Ring"), "gold-and-silver-ring");
        assert_eq!(slugify("Teak Box (Large)!"), "teak-box-large");
        assert_eq!(slugify("Already-a-slug"), "already-a-slug");
    }

    #[test]
    fn test_slugify_idempotent() {
        let name = "Rose Wood & Brass Bowl";
        let once = slugify(name);
        assert_eq!(slugify(name), once);
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn test_category_round_trip() {
        assert_eq!(Category::from("jewellery"), Category::Jewellery);
        assert_eq!(Category::from("wooden"), Category::Wooden);
        assert_eq!(
            Category::from("textiles"),
            Category::Other("textiles".to_string())
        );

        let json = serde_json::to_string(&Category::Wooden).unwrap();
        assert_eq!(json, "\"wooden\"");
        let parsed: Category = serde_json::from_str("\"textiles\"").unwrap();
        assert_eq!(parsed.as_str(), "textiles");
    }

    #[test]
    fn test_validate() {
        assert!(ring_input().validate().is_ok());

        let mut blank = ring_input();
        blank.name = "  ".to_string();
        assert!(matches!(blank.validate(), Err(ShopError::Validation(_))));

        let mut free = ring_input();
        free.price = 0.0;
        assert!(free.validate().is_err());

        let mut negative = ring_input();
        negative.stock = -1;
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_apply_replaces_fields() {
        let mut product = Product::from_input(ring_input());
        product.images = vec!["/uploads/a.png".to_string()];
        let id = product.id.clone();
        let created_at = product.created_at;

        let mut edit = ring_input();
        edit.name = "Silver Ring".to_string();
        edit.stock = 0;
        product.apply(edit);

        assert_eq!(product.id, id);
        assert_eq!(product.created_at, created_at);
        assert_eq!(product.slug, "silver-ring");
        assert!(product.images.is_empty());
        assert_eq!(product.stock, 0);
    }
}
