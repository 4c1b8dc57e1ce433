//! User roles and the route areas they own.
//!
//! Every role maps onto exactly one [`Area`]. An area reserves a set of URL
//! path prefixes and has a landing path. The mapping is an exhaustive match,
//! so adding a role without deciding its area fails to compile.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a role string is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

/// Application-level user role as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full back-office access.
    Admin,
    /// Marketplace seller managing their own store.
    Seller,
    /// Store staff working in the seller area.
    Staff,
    /// Store manager working in the seller area.
    Manager,
    /// Registered customer.
    Customer,
    /// Plain account created by self-registration.
    #[default]
    User,
}

/// A role-restricted section of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    /// `/admin/...`
    Admin,
    /// `/seller/...`
    Seller,
    /// `/customer/...`
    Customer,
}

impl Area {
    /// Every restricted area.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Seller, Self::Customer];

    /// URL path prefixes reserved for this area.
    #[must_use]
    pub const fn prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Admin => &["/admin"],
            Self::Seller => &["/seller"],
            Self::Customer => &["/customer"],
        }
    }

    /// Where a user of this area lands after login or a blocked navigation.
    #[must_use]
    pub const fn landing_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin/dashboard",
            Self::Seller => "/seller/dashboard",
            Self::Customer => "/customer/dashboard",
        }
    }

    /// Whether `path` falls inside this area.
    #[must_use]
    pub fn contains(self, path: &str) -> bool {
        self.prefixes().iter().any(|prefix| path.starts_with(prefix))
    }
}

impl Role {
    /// The area this role may enter.
    #[must_use]
    pub const fn area(self) -> Area {
        match self {
            Self::Admin => Area::Admin,
            Self::Seller | Self::Staff | Self::Manager => Area::Seller,
            Self::Customer | Self::User => Area::Customer,
        }
    }

    /// Path prefixes this role may enter.
    #[must_use]
    pub const fn allowed_prefixes(self) -> &'static [&'static str] {
        self.area().prefixes()
    }

    /// Default landing path for this role.
    #[must_use]
    pub const fn landing_path(self) -> &'static str {
        self.area().landing_path()
    }

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Seller => "seller",
            Self::Staff => "staff",
            Self::Manager => "manager",
            Self::Customer => "customer",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "seller" => Ok(Self::Seller),
            "staff" => Ok(Self::Staff),
            "manager" => Ok(Self::Manager),
            "customer" => Ok(Self::Customer),
            "user" => Ok(Self::User),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_areas() {
        assert_eq!(Role::Admin.area(), Area::Admin);
        assert_eq!(Role::Seller.area(), Area::Seller);
        assert_eq!(Role::Staff.area(), Area::Seller);
        assert_eq!(Role::Manager.area(), Area::Seller);
        assert_eq!(Role::Customer.area(), Area::Customer);
        assert_eq!(Role::User.area(), Area::Customer);
    }

    #[test]
    fn test_landing_paths() {
        assert_eq!(Role::Admin.landing_path(), "/admin/dashboard");
        assert_eq!(Role::Seller.landing_path(), "/seller/dashboard");
        assert_eq!(Role::User.landing_path(), "/customer/dashboard");
    }

    #[test]
    fn test_area_contains_is_plain_prefix() {
        assert!(Area::Admin.contains("/admin"));
        assert!(Area::Admin.contains("/admin/dashboard"));
        assert!(Area::Admin.contains("/administrator"));
        assert!(!Area::Admin.contains("/seller/admin"));
    }

    #[test]
    fn test_every_landing_path_is_inside_its_area() {
        for area in Area::ALL {
            assert!(area.contains(area.landing_path()));
        }
    }

    #[test]
    fn test_role_roundtrip_through_str() {
        for role in [
            Role::Admin,
            Role::Seller,
            Role::Staff,
            Role::Manager,
            Role::Customer,
            Role::User,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert_eq!(
            "superuser".parse::<Role>(),
            Err(RoleParseError("superuser".to_owned()))
        );
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }
}
