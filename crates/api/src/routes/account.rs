//! Account routes

use axum::{
    extract::{Extension, State},
    Json,
};
use invoicely_billing::{ActingAccount, QuotaUsage};

use crate::{error::ApiResult, resources::AccountResource, state::AppState};

pub async fn get_account(Extension(acting): Extension<ActingAccount>) -> Json<AccountResource> {
    Json(AccountResource::new(acting.account, acting.plan))
}

/// Client quota figures under the same policy the gate applies
pub async fn get_quota(
    State(state): State<AppState>,
    Extension(acting): Extension<ActingAccount>,
) -> ApiResult<Json<QuotaUsage>> {
    let usage = state
        .billing
        .quota
        .usage(&acting.account, acting.privileges())
        .await?;

    Ok(Json(usage))
}
