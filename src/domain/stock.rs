//! Stock levels per product variant.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub discount: f64,
}

impl Stock {
    /// Placeholder returned for products without a stock row.
    pub fn empty(product_id: i64) -> Self {
        Self {
            id: 0,
            product_id,
            quantity: 0,
            discount: 0.0,
        }
    }

    pub fn covers(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// New quantity and discount for a stock row
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct StockUpdate {
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub discount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stock_keeps_product_id() {
        let stock = Stock::empty(42);
        assert_eq!(stock.product_id, 42);
        assert_eq!(stock.quantity, 0);
        assert!(!stock.covers(1));
    }

    #[test]
    fn test_stock_serializes_camel_case() {
        let json = serde_json::to_value(Stock::empty(7)).unwrap();
        assert_eq!(json["productId"], 7);
    }
}
