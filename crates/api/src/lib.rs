// API crate clippy configuration
#![allow(clippy::needless_borrows_for_generic_args)] // Sometimes needed for clarity
// Test code patterns:
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Invoicely API Library
//!
//! This crate contains the HTTP server components for Invoicely.

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod quota;
pub mod resources;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
