//! CRM resources: leads, contacts, opportunities, activities and CRM users.

use ajaxtreon_core::{ActivityId, ContactId, LeadId, OpportunityId, RelatedKind, UserId};

use super::{Collection, encode_segment};
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{
    Activity, ActivityCreateInput, ActivityUpdatePayload, Contact, ContactCreateInput,
    ContactUpdatePayload, CrmUser, CrmUserCreateInput, CrmUserUpdatePayload, Lead,
    LeadCreateInput, LeadUpdatePayload, Opportunity, OpportunityCreateInput,
    OpportunityUpdatePayload,
};

/// `/leads`
#[derive(Clone, Copy)]
pub struct Leads<'a> {
    collection: Collection<'a>,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Leads<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(api, "/leads", "lead", "leads"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Lead>, ApiError> {
        self.collection.list().await
    }

    pub async fn get(&self, id: &LeadId) -> Result<Option<Lead>, ApiError> {
        self.collection.get(id.as_str()).await
    }

    pub async fn create(&self, input: &LeadCreateInput) -> Result<Lead, ApiError> {
        self.collection.create(input).await
    }

    pub async fn update(
        &self,
        id: &LeadId,
        payload: &LeadUpdatePayload,
    ) -> Result<Lead, ApiError> {
        self.collection.update(id.as_str(), payload).await
    }

    pub async fn delete(&self, id: &LeadId) -> Result<(), ApiError> {
        self.collection.delete(id.as_str()).await
    }
}

/// `/contacts`
#[derive(Clone, Copy)]
pub struct Contacts<'a> {
    collection: Collection<'a>,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Contacts<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(api, "/contacts", "contact", "contacts"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Contact>, ApiError> {
        self.collection.list().await
    }

    pub async fn get(&self, id: &ContactId) -> Result<Option<Contact>, ApiError> {
        self.collection.get(id.as_str()).await
    }

    /// Contacts attached to a lead.
    pub async fn for_lead(&self, lead_id: &LeadId) -> Result<Vec<Contact>, ApiError> {
        let path = format!("/contacts/lead/{}", encode_segment(lead_id.as_str()));
        self.collection
            .list_at(&path, "Failed to fetch contacts by leadId")
            .await
    }

    pub async fn create(&self, input: &ContactCreateInput) -> Result<Contact, ApiError> {
        self.collection.create(input).await
    }

    pub async fn update(
        &self,
        id: &ContactId,
        payload: &ContactUpdatePayload,
    ) -> Result<Contact, ApiError> {
        self.collection.update(id.as_str(), payload).await
    }

    pub async fn delete(&self, id: &ContactId) -> Result<(), ApiError> {
        self.collection.delete(id.as_str()).await
    }
}

/// `/opportunities`
#[derive(Clone, Copy)]
pub struct Opportunities<'a> {
    collection: Collection<'a>,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Opportunities<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(api, "/opportunities", "opportunity", "opportunities"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Opportunity>, ApiError> {
        self.collection.list().await
    }

    pub async fn get(&self, id: &OpportunityId) -> Result<Option<Opportunity>, ApiError> {
        self.collection.get(id.as_str()).await
    }

    pub async fn create(&self, input: &OpportunityCreateInput) -> Result<Opportunity, ApiError> {
        self.collection.create(input).await
    }

    pub async fn update(
        &self,
        id: &OpportunityId,
        payload: &OpportunityUpdatePayload,
    ) -> Result<Opportunity, ApiError> {
        self.collection.update(id.as_str(), payload).await
    }

    pub async fn delete(&self, id: &OpportunityId) -> Result<(), ApiError> {
        self.collection.delete(id.as_str()).await
    }
}

/// `/activity`
#[derive(Clone, Copy)]
pub struct Activities<'a> {
    collection: Collection<'a>,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Activities<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(api, "/activity", "activity", "activities"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Activity>, ApiError> {
        self.collection.list().await
    }

    pub async fn get(&self, id: &ActivityId) -> Result<Option<Activity>, ApiError> {
        self.collection.get(id.as_str()).await
    }

    /// Activities attached to a lead, contact or opportunity.
    pub async fn related_to(
        &self,
        kind: RelatedKind,
        related_id: &str,
    ) -> Result<Vec<Activity>, ApiError> {
        let path = format!(
            "/activity/related/{}/{}",
            kind.as_str(),
            encode_segment(related_id)
        );
        self.collection
            .list_at(&path, "Failed to fetch related activities")
            .await
    }

    pub async fn create(&self, input: &ActivityCreateInput) -> Result<Activity, ApiError> {
        self.collection.create(input).await
    }

    pub async fn update(
        &self,
        id: &ActivityId,
        payload: &ActivityUpdatePayload,
    ) -> Result<Activity, ApiError> {
        self.collection.update(id.as_str(), payload).await
    }

    pub async fn delete(&self, id: &ActivityId) -> Result<(), ApiError> {
        self.collection.delete(id.as_str()).await
    }
}

/// `/users`: CRM back-office accounts.
#[derive(Clone, Copy)]
pub struct CrmUsers<'a> {
    collection: Collection<'a>,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> CrmUsers<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(api, "/users", "user", "users"),
        }
    }

    pub async fn list(&self) -> Result<Vec<CrmUser>, ApiError> {
        self.collection.list().await
    }

    pub async fn get(&self, id: &UserId) -> Result<Option<CrmUser>, ApiError> {
        self.collection.get(id.as_str()).await
    }

    pub async fn by_email(&self, email: &str) -> Result<Option<CrmUser>, ApiError> {
        let path = format!("/users/email/{}", encode_segment(email));
        self.collection
            .get_at(&path, "Failed to fetch user by email")
            .await
    }

    pub async fn create(&self, input: &CrmUserCreateInput) -> Result<CrmUser, ApiError> {
        self.collection.create(input).await
    }

    pub async fn update(
        &self,
        id: &UserId,
        payload: &CrmUserUpdatePayload,
    ) -> Result<CrmUser, ApiError> {
        self.collection.update(id.as_str(), payload).await
    }

    pub async fn delete(&self, id: &UserId) -> Result<(), ApiError> {
        self.collection.delete(id.as_str()).await
    }
}
