// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Invoicely Billing Module
//!
//! Accounts, plans, clients and the client quota gate.
//!
//! ## Features
//!
//! - **Plan Privileges**: typed, validated plan configuration
//! - **Client Quota**: reseller-credit and plan-based client limits
//! - **Clients**: quota-checked creation, listing and lookup

pub mod accounts;
pub mod clients;
pub mod error;
pub mod privileges;
pub mod quota;


// Accounts
pub use accounts::{Account, AccountService, ActingAccount, SubscriptionPlan};

// Clients
pub use clients::{Client, ClientPage, ClientService, NewClient};

// Error
pub use error::{BillingError, BillingResult};

// Privileges
pub use privileges::{PlanPrivileges, ReportsAccess, MAX_TRIAL_DAYS};

// Quota
pub use quota::{
    evaluate_client_quota, ClientLimitDenial, ClientQuotaService, QuotaDecision, QuotaPolicy,
    QuotaUsage, CLIENT_LIMIT_REACHED,
};

use sqlx::PgPool;

/// Main billing service that combines all billing functionality
#[derive(Clone)]
pub struct BillingService {
    pub accounts: AccountService,
    pub clients: ClientService,
    pub quota: ClientQuotaService,
}

impl BillingService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: AccountService::new(pool.clone()),
            clients: ClientService::new(pool.clone()),
            quota: ClientQuotaService::new(pool),
        }
    }
}
