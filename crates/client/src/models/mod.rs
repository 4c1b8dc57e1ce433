//! Typed records exchanged with the ERP backend.
//!
//! Every record uses camelCase JSON. Create inputs carry the required fields;
//! update payloads make every field optional and omit unset fields so a `PUT`
//! only touches what the caller changed.

mod auth;
mod crm;
mod inventory;
mod notification;
mod partners;
mod report;
mod sales;
mod user;

pub use auth::*;
pub use crm::*;
pub use inventory::*;
pub use notification::*;
pub use partners::*;
pub use report::*;
pub use sales::*;
pub use user::*;

use serde::Deserialize;

/// Body returned by endpoints that create a document and answer with its ID.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedId {
    /// ID of the new document.
    #[serde(default)]
    pub id: String,
}
