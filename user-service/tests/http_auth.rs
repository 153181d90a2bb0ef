mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use common_auth::{Role, UserId};
use support::{test_state, MemoryUserRepository, TEST_SECRET};
use tower::ServiceExt;
use user_service::tokens::{TokenConfig, TokenSigner, TokenSubject};
use user_service::user_handlers::{create_user, list_users};
use user_service::AppState;

fn app(state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .with_state(state)
}

fn list_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri("/users");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

fn issue_token(signer: &TokenSigner, role: Role) -> String {
    signer
        .issue(TokenSubject {
            user_id: UserId::generate(),
            email: "caller@example.com".to_string(),
            role,
        })
        .expect("issue")
        .access_token
}

#[tokio::test]
async fn missing_authorization_header_is_unauthorized() {
    let state = test_state(Arc::new(MemoryUserRepository::new()));
    let response = app(state)
        .oneshot(list_request(None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let state = test_state(Arc::new(MemoryUserRepository::new()));
    let response = app(state)
        .oneshot(list_request(Some("definitely.not.ajwt")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let state = test_state(Arc::new(MemoryUserRepository::new()));
    // Sign with the right secret but an expiry already in the past.
    let stale_signer = TokenSigner::new(TEST_SECRET, TokenConfig { ttl_seconds: -61 });
    let token = issue_token(&stale_signer, Role::Admin);

    let response = app(state)
        .oneshot(list_request(Some(&token)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn foreign_secret_token_is_unauthorized() {
    let state = test_state(Arc::new(MemoryUserRepository::new()));
    let foreign_signer = TokenSigner::new(b"other-secret", TokenConfig { ttl_seconds: 60 });
    let token = issue_token(&foreign_signer, Role::Admin);

    let response = app(state)
        .oneshot(list_request(Some(&token)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_with_wrong_role_is_forbidden() {
    let state = test_state(Arc::new(MemoryUserRepository::new()));
    let token = issue_token(&state.signer, Role::Editor);

    let body = serde_json::json!({
        "firstName": "No",
        "lastName": "Entry",
        "email": "noentry@example.com",
        "password": "pw",
        "role": "editor",
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request");

    let response = app(state).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn valid_token_with_allowed_role_passes_both_gates() {
    let state = test_state(Arc::new(MemoryUserRepository::new()));
    let token = issue_token(&state.signer, Role::Manager);

    let response = app(state)
        .oneshot(list_request(Some(&token)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}
