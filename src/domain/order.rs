//! Orders, order status and the shopping cart.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Order lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Unpaid,
    Pending,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Unpaid => "UNPAID",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNPAID" => Ok(OrderStatus::Unpaid),
            "PENDING" => Ok(OrderStatus::Pending),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            other => Err(AppError::bad_request(format!("Unknown order status: {}", other))),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// Buyer's player account, when signed in
    pub uuid: Option<Uuid>,
    /// Product ids, one entry per unit bought
    pub cart: Vec<i64>,
    pub destination: String,
    pub phone: String,
    pub email: String,
    pub status: OrderStatus,
    /// Checkout session that paid for the order
    pub transaction: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order fields to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: Option<Uuid>,
    pub cart: Vec<i64>,
    pub destination: String,
    pub phone: String,
    pub email: String,
    pub status: OrderStatus,
    pub transaction: Option<String>,
}

/// Everything a paid checkout writes, applied in one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRecord {
    pub order: NewOrder,
    /// Physical product ids, one entry per unit to take out of stock
    pub stock_reductions: Vec<i64>,
    /// Virtual product ids to grant to the buyer's wardrobe
    pub wardrobe_grants: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub quantity: i64,
}

/// Shopping cart keyed by product id, as sent by the storefront:
/// `{"12": {"quantity": 2}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(BTreeMap<String, CartItem>);

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parsed `(product_id, quantity)` pairs, one per product.
    ///
    /// Keys naming the same id (`"1"`, `"01"`, `" 1"`) are merged.
    pub fn entries(&self) -> AppResult<Vec<(i64, i64)>> {
        let mut merged: BTreeMap<i64, i64> = BTreeMap::new();
        for (key, item) in &self.0 {
            let id: i64 = key
                .trim()
                .parse()
                .map_err(|_| AppError::bad_request(format!("Invalid product ID: {}", key)))?;
            if item.quantity <= 0 {
                return Err(AppError::bad_request(format!(
                    "Invalid quantity for product {}",
                    id
                )));
            }
            let total = merged.entry(id).or_insert(0);
            *total = total.checked_add(item.quantity).ok_or_else(|| {
                AppError::bad_request(format!("Invalid quantity for product {}", id))
            })?;
        }
        Ok(merged.into_iter().collect())
    }

    /// Product ids repeated once per unit.
    pub fn expand(&self) -> AppResult<Vec<i64>> {
        Ok(self
            .entries()?
            .into_iter()
            .flat_map(|(id, quantity)| std::iter::repeat(id).take(quantity as usize))
            .collect())
    }

    /// Serialize for checkout session metadata.
    pub fn to_metadata(&self) -> AppResult<String> {
        serde_json::to_string(self)
            .map_err(|e| AppError::internal(format!("Cart serialization failed: {}", e)))
    }

    pub fn from_metadata(value: &str) -> AppResult<Self> {
        serde_json::from_str(value)
            .map_err(|e| AppError::bad_request(format!("Invalid cart: {}", e)))
    }
}

impl FromIterator<(i64, i64)> for Cart {
    fn from_iter<T: IntoIterator<Item = (i64, i64)>>(iter: T) -> Self {
        Cart(
            iter.into_iter()
                .map(|(id, quantity)| (id.to_string(), CartItem { quantity }))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            OrderStatus::Unpaid,
            OrderStatus::Pending,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("LOST".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_cart_parses_storefront_json() {
        let cart: Cart = serde_json::from_str(r#"{"3": {"quantity": 2}, "10": {"quantity": 1}}"#).unwrap();

        let mut entries = cart.entries().unwrap();
        entries.sort();
        assert_eq!(entries, vec![(3, 2), (10, 1)]);

        let mut expanded = cart.expand().unwrap();
        expanded.sort();
        assert_eq!(expanded, vec![3, 3, 10]);
    }

    #[test]
    fn test_cart_merges_keys_for_same_product() {
        let cart: Cart =
            serde_json::from_str(r#"{"1": {"quantity": 5}, "01": {"quantity": 5}, " 1": {"quantity": 1}}"#)
                .unwrap();

        assert_eq!(cart.entries().unwrap(), vec![(1, 11)]);
        assert_eq!(cart.expand().unwrap().len(), 11);
    }

    #[test]
    fn test_cart_rejects_bad_entries() {
        let bad_id: Cart = serde_json::from_str(r#"{"abc": {"quantity": 1}}"#).unwrap();
        assert!(matches!(bad_id.entries(), Err(AppError::BadRequest(_))));

        let zero: Cart = serde_json::from_str(r#"{"1": {"quantity": 0}}"#).unwrap();
        assert!(matches!(zero.entries(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_cart_metadata_round_trip() {
        let cart: Cart = [(5, 3)].into_iter().collect();
        let restored = Cart::from_metadata(&cart.to_metadata().unwrap()).unwrap();
        assert_eq!(restored, cart);
        assert!(Cart::from_metadata("not json").is_err());
    }
}
