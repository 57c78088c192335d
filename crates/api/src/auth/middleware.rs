//! Authentication middleware for Axum

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use invoicely_billing::{AccountService, BillingError};
use serde_json::json;

use super::jwt::JwtManager;

/// Cookie set by the dashboard for browser sessions
const AUTH_COOKIE: &str = "invoicely_auth_token";

/// State needed for authentication
#[derive(Clone)]
pub struct AuthState {
    pub jwt_manager: JwtManager,
    pub accounts: AccountService,
}

/// Extract bearer token from an HttpOnly cookie
fn extract_token_from_cookie(request: &Request) -> Option<String> {
    request
        .headers()
        .get(COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                cookie
                    .trim()
                    .strip_prefix(AUTH_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
                    .filter(|token| !token.is_empty())
                    .map(String::from)
            })
        })
}

/// Extract bearer token from Authorization header or HttpOnly cookie
/// Prefers the Authorization header
pub(crate) fn extract_bearer_token(request: &Request) -> Option<String> {
    if let Some(header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = header.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    extract_token_from_cookie(request)
}

/// Middleware that requires authentication
///
/// Resolves the token's account (and its plan) once and stores it as an
/// [`invoicely_billing::ActingAccount`] request extension.
pub async fn require_auth(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let Some(token) = extract_bearer_token(&request) else {
        tracing::debug!(path = %path, "require_auth: no bearer token");
        return AuthError::MissingAuth.into_response();
    };

    let claims = match auth_state.jwt_manager.validate_access_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "require_auth: token rejected");
            return AuthError::InvalidToken.into_response();
        }
    };

    match auth_state.accounts.acting_account(claims.sub).await {
        Ok(acting) => {
            tracing::debug!(
                path = %path,
                account_id = %acting.account.id,
                sub_account = acting.account.is_sub_account(),
                "require_auth: authentication successful"
            );
            request.extensions_mut().insert(acting);
            next.run(request).await
        }
        Err(BillingError::AccountNotFound(_)) => {
            tracing::warn!(path = %path, account_id = %claims.sub, "require_auth: account no longer exists");
            AuthError::InvalidToken.into_response()
        }
        Err(e) => {
            tracing::error!(path = %path, error = %e, "require_auth: failed to load account");
            AuthError::DatabaseError.into_response()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Database error")]
    DatabaseError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::DatabaseError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}
