//! Inventory records: products, categories and stock movements.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ajaxtreon_core::{CategoryId, ProductId, StockChangeType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i64,
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i64,
    pub category_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Body for creating or renaming a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
}

/// Current stock of one product, derived from the product list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
}

impl From<Product> for StockLevel {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name,
            quantity: product.stock,
        }
    }
}

/// Body of add-stock and subtract-stock requests.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct StockAdjustment<'a> {
    pub quantity: u32,
    pub note: &'a str,
}

/// One entry of a product's stock history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub product_id: ProductId,
    pub change_type: StockChangeType,
    pub quantity: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_level_from_product() {
        let product: Product = serde_json::from_str(
            r#"{"id":"p1","name":"Beras 5kg","price":72500,"stock":40,"categoryId":"c1"}"#,
        )
        .unwrap();
        assert_eq!(product.price, Decimal::new(72500, 0));

        let level = StockLevel::from(product);
        assert_eq!(level.product_id.as_str(), "p1");
        assert_eq!(level.quantity, 40);
    }
}
