//! Web API Authentication Tests
//!
//! Integration tests for token issuance and bearer-token identity extraction.

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use fileshelf::config::FilesConfig;
use fileshelf::web::handlers::AppState;
use fileshelf::web::middleware::{JwtClaims, JwtState};
use fileshelf::web::router::{create_health_router, create_router, create_swagger_router};
use fileshelf::{Database, FileRepository, FileService, FileStorage};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

const JWT_SECRET: &str = "test-secret-key-for-testing-only";
const JWT_ISSUER: &str = "fileshelf-test";

/// Create a test server with an in-memory database.
async fn create_test_server() -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let storage = FileStorage::new(temp_dir.path()).expect("Failed to create test storage");

    let files = FileService::from_config(
        Arc::new(storage),
        Arc::new(FileRepository::new(db.pool().clone())),
        &FilesConfig::default(),
    )
    .expect("Failed to create file service");

    let app_state = Arc::new(AppState::new(Arc::new(files), JWT_SECRET, JWT_ISSUER, 900));
    let jwt_state = Arc::new(JwtState::new(JWT_SECRET, JWT_ISSUER));

    let router = create_router(app_state, jwt_state, &[])
        .merge(create_health_router())
        .merge(create_swagger_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, temp_dir)
}

/// Sign arbitrary claims with the given secret.
fn sign(secret: &str, uid: &str, issuer: &str, exp_offset: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        uid: uid.to_string(),
        iss: issuer.to_string(),
        aud: issuer.to_string(),
        iat: now as u64,
        exp: (now + exp_offset) as u64,
        jti: uuid::Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

// ============================================================================
// Token Issuance Tests
// ============================================================================

#[tokio::test]
async fn test_issue_token_success() {
    let (server, _dir) = create_test_server().await;

    let response = server
        .post("/api/v1/auth")
        .json(&json!({ "username": "alice", "password": "pw" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["data"]["access_token"].is_string());
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["expires_in"], 900);
}

#[tokio::test]
async fn test_issue_token_blank_credentials() {
    let (server, _dir) = create_test_server().await;

    let response = server
        .post("/api/v1/auth")
        .json(&json!({ "username": "  ", "password": "" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["username"].is_array());
    assert!(body["error"]["details"]["password"].is_array());
}

#[tokio::test]
async fn test_issue_token_malformed_body() {
    let (server, _dir) = create_test_server().await;

    let response = server
        .post("/api/v1/auth")
        .json(&json!({ "username": "alice" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Identity Extraction Tests
// ============================================================================

#[tokio::test]
async fn test_hand_signed_token_accepted() {
    let (server, _dir) = create_test_server().await;
    let token = sign(JWT_SECRET, "42", JWT_ISSUER, 3600);

    let response = server
        .get("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_non_numeric_uid_rejected() {
    let (server, _dir) = create_test_server().await;

    for uid in ["abc", "0", "-1", ""] {
        let token = sign(JWT_SECRET, uid, JWT_ISSUER, 3600);
        let response = server
            .get("/api/v1/files")
            .add_header(AUTHORIZATION, format!("Bearer {}", token))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let (server, _dir) = create_test_server().await;
    let token = sign(JWT_SECRET, "42", JWT_ISSUER, -3600);

    let response = server
        .get("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_wrong_secret_or_issuer_rejected() {
    let (server, _dir) = create_test_server().await;

    let wrong_secret = sign("another-secret", "42", JWT_ISSUER, 3600);
    let response = server
        .get("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", wrong_secret))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let wrong_issuer = sign(JWT_SECRET, "42", "someone-else", 3600);
    let response = server
        .get("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", wrong_issuer))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let (server, _dir) = create_test_server().await;
    let token = sign(JWT_SECRET, "42", JWT_ISSUER, 3600);

    let response = server
        .get("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Basic {}", token))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Ambient Routes
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (server, _dir) = create_test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let (server, _dir) = create_test_server().await;

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["paths"]["/files"].is_object());
    assert!(body["paths"]["/auth"].is_object());
}
