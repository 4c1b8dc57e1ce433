//! Ajaxtreon Core - Shared types library.
//!
//! This crate provides common types used across all Ajaxtreon components:
//! - `client` - Session resolution, route guard and REST resource wrappers
//! - `cli` - Command-line front end for the ERP backend
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere, including
//! inside a browser bundle.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for entity IDs and emails, the role/area
//!   routing table, and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
