//! Reporting endpoints under `/report`.

use ajaxtreon_core::ProductId;
use serde::de::DeserializeOwned;

use super::{encode_segment, fail};
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{
    CustomerReportItem, InventoryTurnoverReportItem, PurchaseReportItem, ReportKind, ReportQuery,
    RevenueReportItem, SalesReportItem, StockHistoryItem, StockReportItem, SupplierReportItem,
};

/// Date-ranged reports.
#[derive(Clone, Copy)]
pub struct Reports<'a> {
    api: &'a ApiClient,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Reports<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Fetch `GET /report/{kind}?startDate=..&endDate=..` as rows of `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        kind: ReportKind,
        query: &ReportQuery,
    ) -> Result<Vec<T>, ApiError> {
        let path = format!("/report/{}", kind.as_str());
        let params = [
            ("startDate", query.start_date.to_string()),
            ("endDate", query.end_date.to_string()),
        ];
        self.api
            .get_with_query(&path, &params)
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| fail(&format!("Failed to fetch {} report", kind.as_str()), e))
    }

    pub async fn sales(&self, query: &ReportQuery) -> Result<Vec<SalesReportItem>, ApiError> {
        self.fetch(ReportKind::Sales, query).await
    }

    pub async fn purchases(
        &self,
        query: &ReportQuery,
    ) -> Result<Vec<PurchaseReportItem>, ApiError> {
        self.fetch(ReportKind::Purchases, query).await
    }

    pub async fn stocks(&self, query: &ReportQuery) -> Result<Vec<StockReportItem>, ApiError> {
        self.fetch(ReportKind::Stocks, query).await
    }

    pub async fn revenue(&self, query: &ReportQuery) -> Result<Vec<RevenueReportItem>, ApiError> {
        self.fetch(ReportKind::Revenue, query).await
    }

    pub async fn customers(
        &self,
        query: &ReportQuery,
    ) -> Result<Vec<CustomerReportItem>, ApiError> {
        self.fetch(ReportKind::Customers, query).await
    }

    pub async fn suppliers(
        &self,
        query: &ReportQuery,
    ) -> Result<Vec<SupplierReportItem>, ApiError> {
        self.fetch(ReportKind::Suppliers, query).await
    }

    pub async fn inventory_turnover(
        &self,
        query: &ReportQuery,
    ) -> Result<Vec<InventoryTurnoverReportItem>, ApiError> {
        self.fetch(ReportKind::InventoryTurnover, query).await
    }

    /// Full stock history of one product; not date-ranged.
    pub async fn stock_history(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<StockHistoryItem>, ApiError> {
        let path = format!(
            "/report/stock-history/{}",
            encode_segment(product_id.as_str())
        );
        self.api
            .get(&path)
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| fail("Failed to fetch stock history", e))
    }
}
