//! Order and purchase resources.

use ajaxtreon_core::{OrderId, PurchaseId};

use super::{Collection, encode_segment, fail};
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{
    CreateOrderPayload, CreatePurchasePayload, Order, Purchase, UpdateOrderPayload,
    UpdatePurchasePayload,
};

/// `/order`
#[derive(Clone, Copy)]
pub struct Orders<'a> {
    collection: Collection<'a>,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Orders<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(api, "/order", "order", "orders"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Order>, ApiError> {
        self.collection.list().await
    }

    /// Returns the new order's ID.
    pub async fn create(&self, payload: &CreateOrderPayload) -> Result<String, ApiError> {
        self.collection.add(payload).await
    }

    pub async fn update(&self, id: &OrderId, payload: &UpdateOrderPayload) -> Result<(), ApiError> {
        self.collection
            .update_quietly(id.as_str(), payload)
            .await
    }

    pub async fn delete(&self, id: &OrderId) -> Result<(), ApiError> {
        self.collection.delete(id.as_str()).await
    }
}

/// `/purchase`
#[derive(Clone, Copy)]
pub struct Purchases<'a> {
    api: &'a ApiClient,
    collection: Collection<'a>,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Purchases<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self {
            api,
            collection: Collection::new(api, "/purchase", "purchase", "purchases"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Purchase>, ApiError> {
        self.collection.list().await
    }

    /// Returns the new purchase's ID.
    pub async fn create(&self, payload: &CreatePurchasePayload) -> Result<String, ApiError> {
        self.collection.add(payload).await
    }

    /// Purchases only change status after creation (`PUT /purchase/{id}/status`).
    pub async fn update_status(
        &self,
        id: &PurchaseId,
        payload: &UpdatePurchasePayload,
    ) -> Result<(), ApiError> {
        let path = format!("/purchase/{}/status", encode_segment(id.as_str()));
        self.api
            .put::<_, serde::de::IgnoredAny>(&path, payload)
            .await
            .map(drop)
            .map_err(|e| fail("Failed to update purchase", e))
    }

    pub async fn delete(&self, id: &PurchaseId) -> Result<(), ApiError> {
        self.collection.delete(id.as_str()).await
    }
}
