//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Sales pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Lost,
    Converted,
}

/// Outcome of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    #[default]
    Open,
    Won,
    Lost,
}

/// Kind of CRM activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityType {
    Call,
    Meeting,
    Email,
    Task,
    FollowUp,
    Note,
    Reminder,
}

/// Lifecycle shared by activities, orders and purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// What an activity is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedKind {
    Lead,
    Contact,
    Opportunity,
}

impl RelatedKind {
    /// Path segment used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Contact => "contact",
            Self::Opportunity => "opportunity",
        }
    }
}

/// Role of a CRM back-office user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrmRole {
    Admin,
    Staff,
    Manager,
    Sales,
    Marketing,
    Support,
}

/// Marketplace seller account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerStatus {
    Active,
    Pending,
    Suspended,
    Rejected,
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockChangeType {
    Add,
    Subtract,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ActivityType::FollowUp).unwrap(),
            "\"follow-up\""
        );
        assert_eq!(
            serde_json::from_str::<ActivityType>("\"meeting\"").unwrap(),
            ActivityType::Meeting
        );
    }

    #[test]
    fn test_work_status_default_is_pending() {
        assert_eq!(WorkStatus::default(), WorkStatus::Pending);
    }
}
