//! Product domain entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

/// Names double as image folder names, so separators and control characters are refused.
static PRODUCT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/\\\x00-\x1f]{1,128}$").expect("valid product name regex"));

/// Check that a product name is usable as a storage folder name.
pub fn validate_product_name(name: &str) -> AppResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed.contains("..") || !PRODUCT_NAME.is_match(name)
    {
        return Err(AppError::bad_request("Invalid product name"));
    }
    Ok(())
}

/// A sellable variant. Variants of one article share a name and differ in size and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Price in whole euros
    pub price: i64,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    /// Virtual products are delivered as in-game cosmetics
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub listed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Label used on checkout line items, e.g. `Hoodie - XL`.
    pub fn line_item_name(&self) -> String {
        match &self.size {
            Some(size) => format!("{} - {}", self.name, size),
            None => self.name.clone(),
        }
    }

    /// Unit price in cents.
    pub fn unit_amount(&self) -> i64 {
        self.price.saturating_mul(100)
    }
}

/// Fields of a product to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub is_virtual: bool,
    pub listed: bool,
}

/// Partial product update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    #[serde(rename = "virtual")]
    pub is_virtual: Option<bool>,
    pub listed: Option<bool>,
}

impl ProductChanges {
    /// New name, if this update renames the product.
    pub fn rename_of<'a>(&'a self, current: &Product) -> Option<&'a str> {
        self.name
            .as_deref()
            .filter(|name| *name != current.name.as_str())
    }

    /// Apply the changes onto a product, bumping its edit timestamp.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = Some(description);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(size) = self.size {
            product.size = Some(size);
        }
        if let Some(color) = self.color {
            product.color = Some(color);
        }
        if let Some(material) = self.material {
            product.material = Some(material);
        }
        if let Some(is_virtual) = self.is_virtual {
            product.is_virtual = is_virtual;
        }
        if let Some(listed) = self.listed {
            product.listed = listed;
        }
        product.updated_at = Utc::now();
    }
}

#[cfg(test)]
pub(crate) fn sample_product(id: i64, name: &str, size: Option<&str>, color: Option<&str>) -> Product {
    let now = Utc::now();
    Product {
        id,
        name: name.to_string(),
        description: Some(format!("{} description", name)),
        price: 25,
        size: size.map(str::to_string),
        color: color.map(str::to_string),
        material: Some("Cotton".to_string()),
        is_virtual: false,
        listed: true,
        created_at: now,
        updated_at: now,
    }
}
