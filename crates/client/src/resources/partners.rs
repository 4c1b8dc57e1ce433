//! Supplier and seller resources.

use ajaxtreon_core::{SellerId, SupplierId};

use super::Collection;
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{
    Seller, SellerCreateInput, SellerUpdatePayload, Supplier, SupplierCreateInput,
    SupplierUpdatePayload,
};

/// `/supplier`
#[derive(Clone, Copy)]
pub struct Suppliers<'a> {
    collection: Collection<'a>,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Suppliers<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(api, "/supplier", "supplier", "suppliers"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Supplier>, ApiError> {
        self.collection.list().await
    }

    pub async fn get(&self, id: &SupplierId) -> Result<Option<Supplier>, ApiError> {
        self.collection.get(id.as_str()).await
    }

    /// Run [`crate::validation::validate_supplier`] first; the backend's own
    /// messages are not surfaced.
    pub async fn create(&self, input: &SupplierCreateInput) -> Result<Supplier, ApiError> {
        self.collection.create(input).await
    }

    pub async fn update(
        &self,
        id: &SupplierId,
        payload: &SupplierUpdatePayload,
    ) -> Result<Supplier, ApiError> {
        self.collection.update(id.as_str(), payload).await
    }

    pub async fn delete(&self, id: &SupplierId) -> Result<(), ApiError> {
        self.collection.delete(id.as_str()).await
    }
}

/// `/seller`
#[derive(Clone, Copy)]
pub struct Sellers<'a> {
    collection: Collection<'a>,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Sellers<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(api, "/seller", "seller", "sellers"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Seller>, ApiError> {
        self.collection.list().await
    }

    pub async fn get(&self, id: &SellerId) -> Result<Option<Seller>, ApiError> {
        self.collection.get(id.as_str()).await
    }

    pub async fn create(&self, input: &SellerCreateInput) -> Result<Seller, ApiError> {
        self.collection.create(input).await
    }

    pub async fn update(
        &self,
        id: &SellerId,
        payload: &SellerUpdatePayload,
    ) -> Result<Seller, ApiError> {
        self.collection.update(id.as_str(), payload).await
    }

    pub async fn delete(&self, id: &SellerId) -> Result<(), ApiError> {
        self.collection.delete(id.as_str()).await
    }
}
