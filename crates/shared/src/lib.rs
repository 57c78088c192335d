// Test code patterns:
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Invoicely Shared Library
//!
//! Common types and database plumbing used by the API and billing crates.

pub mod db;
pub mod types;

pub use db::{create_pool, run_migrations};
pub use types::{FieldErrors, Limit, Pagination, UNLIMITED_SENTINEL};
