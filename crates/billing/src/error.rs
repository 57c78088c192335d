//! Billing error types

use thiserror::Error;

use crate::quota::ClientLimitDenial;

pub type BillingResult<T> = Result<T, BillingError>;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Invalid plan privileges: {0}")]
    InvalidPrivileges(String),

    /// Policy denial raised when the quota is re-checked inside the
    /// client-creation transaction
    #[error("Client limit reached ({} of {})", .0.current, .0.limit)]
    ClientLimitReached(ClientLimitDenial),
}

impl From<sqlx::Error> for BillingError {
    fn from(e: sqlx::Error) -> Self {
        BillingError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for BillingError {
    fn from(e: serde_json::Error) -> Self {
        BillingError::InvalidPrivileges(e.to_string())
    }
}
