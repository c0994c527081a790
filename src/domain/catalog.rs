//! Storefront catalog structure.
//!
//! Variants sharing a name form one catalog entry. Inside an entry the
//! variants are grouped by color, and every color lists its sizes in the
//! fixed shop order.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Product, Stock};
use crate::config::SIZE_ORDER;

/// One size of a color variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SizeVariant {
    /// Product id of this exact variant
    pub id: i64,
    pub size: Option<String>,
    pub stock: i64,
    /// Only present on the detail view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorVariant {
    pub color: Option<String>,
    /// Color without a leading `#`
    pub color_code: Option<String>,
    /// Summed stock of every size in this color
    pub stock: i64,
    pub sizes: Vec<SizeVariant>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub material: Option<String>,
    pub color_variants: Vec<ColorVariant>,
}

/// Which per-size fields to include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeDetail {
    Summary,
    WithDiscount,
}

/// Position of a size in the shop order. Unknown or missing sizes sort first.
pub fn size_rank(size: Option<&str>) -> i64 {
    size.and_then(|s| SIZE_ORDER.iter().position(|known| *known == s))
        .map(|i| i as i64)
        .unwrap_or(-1)
}

/// Strip the leading `#` of a hex color.
pub fn color_code(color: Option<&str>) -> Option<String> {
    color.map(|c| c.strip_prefix('#').unwrap_or(c).to_string())
}

/// Group variants by color. A single uncolored variant collapses the whole
/// set into one colorless group.
fn group_by_color(variants: &[Product]) -> Vec<(Option<String>, Vec<&Product>)> {
    if variants.iter().any(|p| p.color.is_none()) {
        return vec![(None, variants.iter().collect())];
    }

    let mut groups: BTreeMap<String, Vec<&Product>> = BTreeMap::new();
    for product in variants {
        if let Some(color) = &product.color {
            groups.entry(color.clone()).or_default().push(product);
        }
    }
    groups
        .into_iter()
        .map(|(color, products)| (Some(color), products))
        .collect()
}

/// Build the catalog entry for all variants sharing one name.
///
/// Returns `None` when there are no variants.
pub fn build_entry(
    variants: &[Product],
    stocks: &HashMap<i64, Stock>,
    images: &[String],
    detail: SizeDetail,
) -> Option<CatalogProduct> {
    let first = variants.first()?;

    let color_variants = group_by_color(variants)
        .into_iter()
        .map(|(color, products)| {
            let mut sizes: Vec<SizeVariant> = products
                .iter()
                .map(|p| {
                    let stock = stocks.get(&p.id);
                    SizeVariant {
                        id: p.id,
                        size: p.size.clone(),
                        stock: stock.map(|s| s.quantity).unwrap_or(0),
                        discount: match detail {
                            SizeDetail::WithDiscount => {
                                Some(stock.map(|s| s.discount).unwrap_or(0.0))
                            }
                            SizeDetail::Summary => None,
                        },
                    }
                })
                .collect();
            sizes.sort_by_key(|s| size_rank(s.size.as_deref()));

            ColorVariant {
                color_code: color_code(color.as_deref()),
                color,
                stock: sizes.iter().map(|s| s.stock).sum(),
                sizes,
                images: images.to_vec(),
            }
        })
        .collect();

    Some(CatalogProduct {
        name: first.name.clone(),
        description: first.description.clone(),
        price: first.price,
        is_virtual: first.is_virtual,
        material: first.material.clone(),
        color_variants,
    })
}

/// Build the catalog from listed products, ordered by product name.
pub fn build_catalog(
    products: Vec<Product>,
    stocks: &HashMap<i64, Stock>,
    images: &HashMap<String, Vec<String>>,
) -> Vec<CatalogProduct> {
    let mut by_name: BTreeMap<String, Vec<Product>> = BTreeMap::new();
    for product in products {
        by_name.entry(product.name.clone()).or_default().push(product);
    }

    by_name
        .into_iter()
        .filter_map(|(name, variants)| {
            let product_images = images.get(&name).map(Vec::as_slice).unwrap_or(&[]);
            build_entry(&variants, stocks, product_images, SizeDetail::Summary)
        })
        .collect()
}
