//! Client quota gate
//!
//! Route-scoped middleware placed in front of the client-creation handler.
//! It runs after [`crate::auth::require_auth`] and reads the acting account
//! from the request extensions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use invoicely_billing::{ActingAccount, ClientQuotaService, QuotaDecision};

use crate::error::ApiError;

/// Stop client creation when the acting account is at its limit
pub async fn require_client_quota(
    State(quota): State<ClientQuotaService>,
    request: Request,
    next: Next,
) -> Response {
    let Some(acting) = request.extensions().get::<ActingAccount>().cloned() else {
        tracing::warn!("require_client_quota: no authenticated account on request");
        return ApiError::Unauthorized.into_response();
    };

    match quota.check(&acting.account, acting.privileges()).await {
        Ok(QuotaDecision::Allow) => next.run(request).await,
        Ok(QuotaDecision::Deny(denial)) => {
            tracing::info!(
                account_id = %acting.account.id,
                current = denial.current,
                limit = denial.limit,
                allocated_to_sub_accounts = ?denial.allocated_to_sub_accounts,
                "Client creation blocked by quota"
            );
            ApiError::ClientLimitReached(denial).into_response()
        }
        Err(e) => {
            tracing::error!(account_id = %acting.account.id, error = %e, "Client quota check failed");
            ApiError::from(e).into_response()
        }
    }
}
