//! Plan routes

use axum::{extract::rejection::JsonRejection, Json};
use invoicely_billing::PlanPrivileges;

use crate::error::{ApiError, ApiResult};

/// Check a privileges document before it is saved on a plan
pub async fn validate_privileges(
    payload: Result<Json<PlanPrivileges>, JsonRejection>,
) -> ApiResult<Json<PlanPrivileges>> {
    let Json(privileges) = payload?;
    let errors = privileges.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    Ok(Json(privileges.normalized()))
}
