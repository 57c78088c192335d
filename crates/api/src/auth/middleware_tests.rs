//! Unit tests for authentication middleware
//!
//! Tests cover:
//! - Token extraction from header and cookie
//! - Rejection of missing and invalid tokens before any database access

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        extract::Request,
        http::{header, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use invoicely_billing::AccountService;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::super::jwt::{sign_test_token, JwtManager};
    use super::super::middleware::*;

    const SECRET: &str = "test-jwt-secret-key-for-testing-only";

    /// Pool that never connects unless a query runs
    fn lazy_auth_state() -> AuthState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/invoicely_test")
            .unwrap();
        AuthState {
            jwt_manager: JwtManager::new(SECRET),
            accounts: AccountService::new(pool),
        }
    }

    fn protected_app() -> Router {
        let state = lazy_auth_state();
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(state, require_auth))
    }

    #[test]
    fn test_bearer_header_preferred() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer header-token")
            .header(header::COOKIE, "invoicely_auth_token=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            extract_bearer_token(&request),
            Some("header-token".to_string())
        );
    }

    #[test]
    fn test_cookie_fallback() {
        let request = Request::builder()
            .header(header::COOKIE, "theme=dark; invoicely_auth_token=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            extract_bearer_token(&request),
            Some("cookie-token".to_string())
        );
    }

    #[test]
    fn test_similar_cookie_name_ignored() {
        let request = Request::builder()
            .header(header::COOKIE, "invoicely_auth_token_old=stale")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_bearer_token(&request), None);
    }

    #[test]
    fn test_non_bearer_scheme_ignored() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_bearer_token(&request), None);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let response = protected_app()
            .oneshot(Request::builder().uri("/protected").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 401);
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_unauthorized() {
        let foreign = sign_test_token("some-other-secret", Uuid::new_v4(), 3600);

        let response = protected_app()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(header::AUTHORIZATION, format!("Bearer {}", foreign))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
