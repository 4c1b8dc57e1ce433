//! Form validators for supplier, seller and user input.
//!
//! Validators never fail. They return every problem found as a
//! field → message map so a front end can show all of them at once.
//! Field names use the backend's camelCase spelling.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s+()-]{6,20}$").expect("Invalid regex"));

const MIN_ADDRESS_LEN: usize = 5;
const MIN_PASSWORD_LEN: usize = 6;

/// Outcome of validating one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub errors: BTreeMap<String, String>,
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message recorded for `field`, if any.
    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    fn push(&mut self, field: &str, message: &str) {
        self.errors.insert(field.to_string(), message.to_string());
    }
}

/// Supplier form fields. Only `name` is mandatory.
#[derive(Debug, Clone, Default)]
pub struct SupplierInput<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub company_name: Option<&'a str>,
    pub contact_person: Option<&'a str>,
}

/// Seller form fields. Only `name` is mandatory.
#[derive(Debug, Clone, Default)]
pub struct SellerInput<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
}

/// User form fields. `password` may be left out when editing.
#[derive(Debug, Clone, Default)]
pub struct UserInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: Option<&'a str>,
    pub role: &'a str,
}

/// A field counts as given only when it is a non-empty string.
fn given(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn check_contact(
    result: &mut ValidationResult,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
    address: Option<&str>,
) {
    if name.trim().is_empty() {
        result.push("name", "Name is required");
    }
    if given(email).is_some_and(|e| !EMAIL_RE.is_match(e)) {
        result.push("email", "Email is not valid");
    }
    if given(phone).is_some_and(|p| !PHONE_RE.is_match(p)) {
        result.push("phone", "Phone number is not valid");
    }
    if given(address).is_some_and(|a| a.trim().chars().count() < MIN_ADDRESS_LEN) {
        result.push("address", "Address must be at least 5 characters");
    }
}

#[must_use]
pub fn validate_supplier(input: &SupplierInput<'_>) -> ValidationResult {
    let mut result = ValidationResult::default();
    check_contact(
        &mut result,
        input.name,
        input.email,
        input.phone,
        input.address,
    );
    if given(input.company_name).is_some_and(|c| c.trim().is_empty()) {
        result.push("companyName", "Company Name cannot be empty");
    }
    if given(input.contact_person).is_some_and(|c| c.trim().is_empty()) {
        result.push("contactPerson", "Contact Person cannot be empty");
    }
    result
}

#[must_use]
pub fn validate_seller(input: &SellerInput<'_>) -> ValidationResult {
    let mut result = ValidationResult::default();
    check_contact(
        &mut result,
        input.name,
        input.email,
        input.phone,
        input.address,
    );
    result
}

/// Validate a user form. The password is checked when `require_password`
/// is set or when one was typed in.
#[must_use]
pub fn validate_user(input: &UserInput<'_>, require_password: bool) -> ValidationResult {
    let mut result = ValidationResult::default();

    if input.name.trim().is_empty() {
        result.push("name", "Name is required");
    }

    if input.email.trim().is_empty() {
        result.push("email", "Email is required");
    } else if !EMAIL_RE.is_match(input.email) {
        result.push("email", "Email is not valid");
    }

    let password = given(input.password);
    if (require_password || password.is_some())
        && password.is_none_or(|p| p.chars().count() < MIN_PASSWORD_LEN)
    {
        result.push("password", "Password must be at least 6 characters");
    }

    if !matches!(input.role, "user" | "admin") {
        result.push("role", r#"Role must be either "user" or "admin""#);
    }

    result
}
