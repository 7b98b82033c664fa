//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod checks;
pub mod codes;
pub mod detail_levels;
pub mod details;
pub mod documents;
pub mod fiscal;
pub mod health;
pub mod journals;
pub mod treasury;

/// Creates the API router; everything except `/health` sits behind the guard.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(codes::routes())
        .merge(details::routes())
        .merge(detail_levels::routes())
        .merge(fiscal::routes())
        .merge(journals::routes())
        .merge(documents::routes())
        .merge(checks::routes())
        .merge(treasury::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(health::routes()).merge(protected_routes)
}

#[cfg(test)]
mod tests {
    use crate::{AppState, create_router};
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use daftar_db::MappingResolver;
    use daftar_shared::{Environment, JwtConfig, JwtService};
    use http_body_util::BodyExt;
    use rstest::rstest;
    use sea_orm::DatabaseConnection;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "router-test-secret";

    fn jwt(expires_minutes: i64) -> JwtService {
        JwtService::new(JwtConfig {
            secret: SECRET.to_string(),
            access_token_expires_minutes: expires_minutes,
        })
    }

    fn app(environment: Environment) -> Router {
        create_router(AppState {
            db: Arc::new(DatabaseConnection::Disconnected),
            jwt_service: Arc::new(jwt(15)),
            mappings: Arc::new(MappingResolver::default()),
            environment,
        })
    }

    fn bearer(expires_minutes: i64) -> String {
        format!("Bearer {}", jwt(expires_minutes).issue_token("operator-1").unwrap())
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let request = Request::get("/api/v1/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(Environment::Development), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"], "Service is healthy");
        assert_eq!(body["data"]["status"], "healthy");
    }

    #[rstest]
    #[case("/api/v1/codes")]
    #[case("/api/v1/journals")]
    #[case("/api/v1/receipts")]
    #[case("/api/v1/payments")]
    #[case("/api/v1/checks")]
    #[case("/api/v1/fiscal-years/current")]
    #[tokio::test]
    async fn test_guard_rejects_missing_token(#[case] uri: &str) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let (status, body) = send(app(Environment::Development), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["ok"], false);
        assert_eq!(body["message"], "Authentication required");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_guard_message_is_localized() {
        let request = Request::get("/api/v1/codes")
            .header(header::ACCEPT_LANGUAGE, "fa-IR,fa;q=0.9")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(Environment::Development), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "احراز هویت لازم است");
    }

    #[tokio::test]
    async fn test_production_hides_error_detail() {
        let request = Request::get("/api/v1/codes")
            .header(header::AUTHORIZATION, "Bearer not-a-token")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(Environment::Production), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["ok"], false);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_expired_token() {
        let request = Request::get("/api/v1/codes")
            .header(header::AUTHORIZATION, bearer(-10))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(Environment::Development), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token has expired");
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_payload() {
        let request = Request::post("/api/v1/journals")
            .header(header::AUTHORIZATION, bearer(15))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"date\": "))
            .unwrap();
        let (status, body) = send(app(Environment::Development), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Request payload is invalid");
    }

    #[tokio::test]
    async fn test_bad_path_id_is_invalid_payload() {
        let request = Request::get("/api/v1/journals/not-a-uuid")
            .header(header::AUTHORIZATION, bearer(15))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(Environment::Development), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_non_numeric_code_filter_rejected_before_query() {
        let request = Request::get("/api/v1/journals?code_from=1%3BDROP")
            .header(header::AUTHORIZATION, bearer(15))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(Environment::Development), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid filter");
    }
}
