//! Inventory resources: products, categories and stock movements.

use ajaxtreon_core::{CategoryId, ProductId};

use super::{Collection, encode_segment, fail};
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{
    Category, CategoryInput, CreateProductPayload, Product, StockAdjustment, StockChange,
    StockLevel, UpdateProductPayload,
};

const PRODUCTS_PATH: &str = "/inventory/product";

/// `/inventory/product`
#[derive(Clone, Copy)]
pub struct Products<'a> {
    collection: Collection<'a>,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Products<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(api, PRODUCTS_PATH, "product", "products"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.collection.list().await
    }

    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, ApiError> {
        self.collection.get(id.as_str()).await
    }

    /// Returns the new product's ID.
    pub async fn create(&self, payload: &CreateProductPayload) -> Result<String, ApiError> {
        self.collection.add(payload).await
    }

    pub async fn update(
        &self,
        id: &ProductId,
        payload: &UpdateProductPayload,
    ) -> Result<(), ApiError> {
        self.collection
            .update_quietly(id.as_str(), payload)
            .await
    }

    pub async fn delete(&self, id: &ProductId) -> Result<(), ApiError> {
        self.collection.delete(id.as_str()).await
    }
}

/// `/inventory/category`
#[derive(Clone, Copy)]
pub struct Categories<'a> {
    collection: Collection<'a>,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Categories<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(api, "/inventory/category", "category", "categories"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Category>, ApiError> {
        self.collection.list().await
    }

    /// Returns the new category's ID as the backend reports it.
    pub async fn create(&self, name: &str) -> Result<String, ApiError> {
        self.collection
            .add(&CategoryInput {
                name: name.to_string(),
            })
            .await
    }

    pub async fn rename(&self, id: CategoryId, name: &str) -> Result<(), ApiError> {
        self.collection
            .update_quietly(
                &id.to_string(),
                &CategoryInput {
                    name: name.to_string(),
                },
            )
            .await
    }

    pub async fn delete(&self, id: CategoryId) -> Result<(), ApiError> {
        self.collection.delete(&id.to_string()).await
    }
}

/// Stock levels and adjustments under `/inventory/stock`.
#[derive(Clone, Copy)]
pub struct Stocks<'a> {
    api: &'a ApiClient,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Stocks<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Current stock of every product.
    ///
    /// The backend has no stock listing of its own; levels are read off the
    /// product list.
    pub async fn list(&self) -> Result<Vec<StockLevel>, ApiError> {
        let products: Vec<Product> = self
            .api
            .get(PRODUCTS_PATH)
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| fail("Failed to fetch stocks", e))?;
        Ok(products.into_iter().map(StockLevel::from).collect())
    }

    pub async fn add(
        &self,
        product_id: &ProductId,
        quantity: u32,
        note: &str,
    ) -> Result<(), ApiError> {
        self.adjust("add-stock", product_id, quantity, note)
            .await
            .map_err(|e| fail("Failed to add stock", e))
    }

    pub async fn subtract(
        &self,
        product_id: &ProductId,
        quantity: u32,
        note: &str,
    ) -> Result<(), ApiError> {
        self.adjust("subtract-stock", product_id, quantity, note)
            .await
            .map_err(|e| fail("Failed to subtract stock", e))
    }

    /// Stock movements of one product, oldest first as the backend sends them.
    pub async fn history(&self, product_id: &ProductId) -> Result<Vec<StockChange>, ApiError> {
        let path = format!(
            "/inventory/stock/stock-history/{}",
            encode_segment(product_id.as_str())
        );
        self.api
            .get(&path)
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| fail("Failed to fetch stock history", e))
    }

    async fn adjust(
        &self,
        action: &str,
        product_id: &ProductId,
        quantity: u32,
        note: &str,
    ) -> Result<(), ApiError> {
        let path = format!(
            "/inventory/stock/{action}/{}",
            encode_segment(product_id.as_str())
        );
        self.api
            .post::<_, serde::de::IgnoredAny>(&path, &StockAdjustment { quantity, note })
            .await
            .map(drop)
    }
}
