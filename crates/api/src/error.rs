//! API error type and its HTTP mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use invoicely_billing::{BillingError, ClientLimitDenial};
use invoicely_shared::FieldErrors;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found")]
    NotFound,
    /// Body missing, not JSON, or not the expected shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Validation failed")]
    Validation(FieldErrors),
    /// Policy denial, not a fault
    #[error("Client limit reached")]
    ClientLimitReached(ClientLimitDenial),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({"error": "unauthorized", "message": "Authentication required"}),
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({"error": "not_found", "message": "Resource not found"}),
            ),
            ApiError::InvalidBody(message) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "invalid_body", "message": message}),
            ),
            ApiError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "validation_failed",
                    "message": "The given data was invalid.",
                    "fields": fields,
                }),
            ),
            ApiError::ClientLimitReached(denial) => {
                (StatusCode::FORBIDDEN, client_limit_body(&denial))
            }
            ApiError::Database(message) => {
                tracing::error!(error = %message, "Database error while handling request");
                internal_error()
            }
            ApiError::Internal => internal_error(),
        };

        (status, Json(body)).into_response()
    }
}

fn internal_error() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "internal_error", "message": "Internal server error"}),
    )
}

/// `{"message", "error", "current", "limit", "allocated_to_sub_accounts"?}`
fn client_limit_body(denial: &ClientLimitDenial) -> serde_json::Value {
    let mut body = json!({
        "message": denial.message(),
        "error": denial.error_code(),
        "current": denial.current,
        "limit": denial.limit,
    });
    if let Some(allocated) = denial.allocated_to_sub_accounts {
        body["allocated_to_sub_accounts"] = json!(allocated);
    }
    body
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<BillingError> for ApiError {
    fn from(e: BillingError) -> Self {
        match e {
            BillingError::ClientLimitReached(denial) => ApiError::ClientLimitReached(denial),
            BillingError::AccountNotFound(_) | BillingError::ClientNotFound(_) => {
                ApiError::NotFound
            }
            BillingError::Database(message) => ApiError::Database(message),
            BillingError::InvalidPrivileges(message) => {
                tracing::error!(error = %message, "Plan privileges could not be used");
                ApiError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_direct_account_denial_body() {
        let response = ApiError::ClientLimitReached(ClientLimitDenial {
            current: 3,
            limit: 3,
            allocated_to_sub_accounts: Some(7),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["error"], "client_limit_reached");
        assert_eq!(body["current"], 3);
        assert_eq!(body["limit"], 3);
        assert_eq!(body["allocated_to_sub_accounts"], 7);
        assert!(body["message"].as_str().unwrap().contains("sub-accounts"));
        assert_eq!(body.as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_sub_account_denial_body_has_no_allocation_key() {
        let response = ApiError::ClientLimitReached(ClientLimitDenial {
            current: 5,
            limit: 5,
            allocated_to_sub_accounts: None,
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        let object = body.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert!(!object.contains_key("allocated_to_sub_accounts"));
    }

    #[tokio::test]
    async fn test_zero_allocation_still_reported_for_direct_account() {
        let response = ApiError::ClientLimitReached(ClientLimitDenial {
            current: 5,
            limit: 5,
            allocated_to_sub_accounts: Some(0),
        })
        .into_response();
        let body = body_json(response).await;
        assert_eq!(body["allocated_to_sub_accounts"], 0);
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let mut fields = FieldErrors::new();
        fields.insert("email".to_string(), "email is invalid".to_string());
        let response = ApiError::Validation(fields).into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["fields"]["email"], "email is invalid");
    }

    #[tokio::test]
    async fn test_database_error_hides_detail() {
        let response = ApiError::Database("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert!(!body.to_string().contains("connection refused"));
    }

    #[test]
    fn test_billing_error_mapping() {
        let denial = ClientLimitDenial {
            current: 1,
            limit: 1,
            allocated_to_sub_accounts: None,
        };
        assert!(matches!(
            ApiError::from(BillingError::ClientLimitReached(denial.clone())),
            ApiError::ClientLimitReached(d) if d == denial
        ));
        assert!(matches!(
            ApiError::from(BillingError::ClientNotFound("x".into())),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from(BillingError::InvalidPrivileges("bad".into())),
            ApiError::Internal
        ));
    }
}
