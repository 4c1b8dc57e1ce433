//! Reporting queries and row types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ajaxtreon_core::{CustomerId, OrderId, ProductId, StockChangeType, SupplierId, WorkStatus};

use super::ContactPerson;

/// Inclusive date range every report is filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Report families served under `/report/{kind}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Sales,
    Purchases,
    Stocks,
    Revenue,
    Customers,
    Suppliers,
    InventoryTurnover,
}

impl ReportKind {
    /// Path segment under `/report/`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Purchases => "purchases",
            Self::Stocks => "stocks",
            Self::Revenue => "revenue",
            Self::Customers => "customers",
            Self::Suppliers => "suppliers",
            Self::InventoryTurnover => "inventory-turnover",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportItem {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: String,
    pub total_quantity: i64,
    pub total_items: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReportItem {
    pub supplier_id: SupplierId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub status: WorkStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReportItem {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub refund_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_revenue: Decimal,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReportItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub current_stock: i64,
    pub last_updated: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHistoryItem {
    pub product_id: ProductId,
    pub change_type: StockChangeType,
    pub quantity: i64,
    pub timestamp: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReportItem {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub billing_address: Option<String>,
    #[serde(default)]
    pub contact_persons: Vec<ContactPerson>,
    pub loyalty_member_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub total_orders: i64,
    pub total_completed_orders: i64,
    pub total_pending_orders: i64,
    pub total_cancelled_orders: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount_spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_order_value: Decimal,
    pub last_order_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierReportItem {
    pub supplier_id: SupplierId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub payment_term: Option<String>,
    #[serde(default)]
    pub products_supplied: Vec<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub total_purchases: i64,
    pub total_quantity_purchased: i64,
    pub last_purchase_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTurnoverReportItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: Option<String>,
    pub beginning_inventory: i64,
    pub ending_inventory: i64,
    pub total_sold_quantity: i64,
    pub average_inventory: f64,
    pub inventory_turnover_ratio: f64,
    pub turnover_days: Option<f64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_report_query_wire_format() {
        let query = ReportQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        };
        assert_eq!(
            serde_json::to_value(query).unwrap(),
            serde_json::json!({"startDate": "2024-01-01", "endDate": "2024-01-31"})
        );
    }

    #[test]
    fn test_report_kind_segments() {
        assert_eq!(ReportKind::InventoryTurnover.as_str(), "inventory-turnover");
        assert_eq!(ReportKind::Sales.as_str(), "sales");
    }
}
