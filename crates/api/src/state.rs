//! Application state

use invoicely_billing::BillingService;
use sqlx::PgPool;

use crate::{
    auth::{AuthState, JwtManager},
    config::Config,
    email::NotificationEmailService,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub jwt_manager: JwtManager,
    pub billing: BillingService,
    pub email: NotificationEmailService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let jwt_manager = JwtManager::new(&config.jwt_secret);
        let billing = BillingService::new(pool);
        tracing::info!("Billing services initialized");

        let email = NotificationEmailService::from_config(config);
        if email.is_enabled() {
            tracing::info!("Client notification emails enabled (Resend)");
        }

        Self {
            jwt_manager,
            billing,
            email,
        }
    }

    /// Get auth state for middleware
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt_manager: self.jwt_manager.clone(),
            accounts: self.billing.accounts.clone(),
        }
    }
}
