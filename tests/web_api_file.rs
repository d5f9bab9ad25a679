//! Web API File Tests
//!
//! Integration tests for the upload, list and download endpoints.

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use fileshelf::config::FilesConfig;
use fileshelf::web::handlers::AppState;
use fileshelf::web::middleware::JwtState;
use fileshelf::web::router::create_router;
use fileshelf::{Database, FileRepository, FileService, FileStorage};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

const JWT_SECRET: &str = "test-secret-key-for-testing-only";
const JWT_ISSUER: &str = "fileshelf-test";

/// Create a test server with an in-memory database and a temporary storage root.
async fn create_test_server(files_config: FilesConfig) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let storage = FileStorage::new(temp_dir.path().join("Storage"))
        .expect("Failed to create test storage");

    let files = FileService::from_config(
        Arc::new(storage),
        Arc::new(FileRepository::new(db.pool().clone())),
        &files_config,
    )
    .expect("Failed to create file service");

    let app_state = Arc::new(AppState::new(Arc::new(files), JWT_SECRET, JWT_ISSUER, 900));
    let jwt_state = Arc::new(JwtState::new(JWT_SECRET, JWT_ISSUER));

    let router = create_router(app_state, jwt_state, &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, temp_dir)
}

/// Files configuration accepting images and PDFs up to 1000 bytes.
fn small_files_config() -> FilesConfig {
    FilesConfig {
        max_file_size: 1000,
        allowed_file_types: "image,pdf".to_string(),
        ..Default::default()
    }
}

/// Obtain an access token for a credential pair.
async fn get_token(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/api/v1/auth")
        .json(&json!({ "username": username, "password": password }))
        .await;
    response.assert_status_ok();

    response.json::<Value>()["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

fn file_form(name: &str, mime: &str, content: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(content).file_name(name).mime_type(mime))
}

// ============================================================================
// Upload Tests
// ============================================================================

#[tokio::test]
async fn test_upload_returns_created_summary() {
    let (server, _dir) = create_test_server(small_files_config()).await;
    let token = get_token(&server, "alice", "pw").await;

    let response = server
        .post("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .multipart(file_form("test", "image/png", vec![7u8; 1000]))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["data"]["id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(body["data"]["fileName"], "test");
    assert_eq!(body["data"]["contentType"], "image/png");

    let location = response.header("location");
    assert_eq!(location.to_str().unwrap(), format!("/api/v1/files/{}", id));
}

#[tokio::test]
async fn test_upload_too_large_is_bad_request() {
    let (server, _dir) = create_test_server(small_files_config()).await;
    let token = get_token(&server, "alice", "pw").await;

    let response = server
        .post("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .multipart(file_form("test", "image/png", vec![7u8; 1001]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_upload_empty_file_is_bad_request() {
    let (server, _dir) = create_test_server(small_files_config()).await;
    let token = get_token(&server, "alice", "pw").await;

    let response = server
        .post("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .multipart(file_form("test", "image/png", Vec::new()))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_unsupported_type_is_bad_request() {
    let (server, _dir) = create_test_server(small_files_config()).await;
    let token = get_token(&server, "alice", "pw").await;

    let response = server
        .post("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .multipart(file_form("test", "document/docx", vec![1u8; 10]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("document/docx"));

    // Nothing was recorded
    let response = server
        .get("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;
    assert_eq!(response.json::<Value>()["data"], json!([]));
}

#[tokio::test]
async fn test_upload_without_file_field_is_bad_request() {
    let (server, _dir) = create_test_server(small_files_config()).await;
    let token = get_token(&server, "alice", "pw").await;

    let form = MultipartForm::new().add_text("description", "no file here");
    let response = server
        .post("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_requires_auth() {
    let (server, _dir) = create_test_server(small_files_config()).await;

    let response = server
        .post("/api/v1/files")
        .multipart(file_form("test", "image/png", vec![1u8; 10]))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// List and Read Tests
// ============================================================================

#[tokio::test]
async fn test_list_files_empty() {
    let (server, _dir) = create_test_server(FilesConfig::default()).await;
    let token = get_token(&server, "alice", "pw").await;

    let response = server
        .get("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"], json!([]));
}

#[tokio::test]
async fn test_upload_list_and_read_round_trip() {
    let (server, _dir) = create_test_server(FilesConfig::default()).await;
    let token = get_token(&server, "alice", "pw").await;
    let content = b"%PDF-1.4 minimal".to_vec();

    let response = server
        .post("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .multipart(file_form("report.pdf", "application/pdf", content.clone()))
        .await;
    response.assert_status(StatusCode::CREATED);
    let id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let response = server
        .get("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let files = body["data"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["id"], id);
    assert_eq!(files[0]["fileName"], "report.pdf");
    assert_eq!(files[0]["contentType"], "application/pdf");

    let response = server
        .get(&format!("/api/v1/files/{}", id))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "application/octet-stream"
    );
    assert_eq!(response.as_bytes().to_vec(), content);
}

#[tokio::test]
async fn test_files_are_isolated_between_owners() {
    let (server, _dir) = create_test_server(FilesConfig::default()).await;
    let alice = get_token(&server, "alice", "pw").await;
    let bob = get_token(&server, "bob", "pw").await;

    let response = server
        .post("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", alice))
        .multipart(file_form("a.pdf", "application/pdf", vec![1u8; 10]))
        .await;
    response.assert_status(StatusCode::CREATED);
    let id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    // Bob sees nothing
    let response = server
        .get("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", bob))
        .await;
    assert_eq!(response.json::<Value>()["data"], json!([]));

    // Bob's read of Alice's file looks exactly like a missing file
    let response = server
        .get(&format!("/api/v1/files/{}", id))
        .add_header(AUTHORIZATION, format!("Bearer {}", bob))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND");

    let response = server
        .get(&format!("/api/v1/files/{}", id + 1000))
        .add_header(AUTHORIZATION, format!("Bearer {}", alice))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_same_credentials_share_files() {
    let (server, _dir) = create_test_server(FilesConfig::default()).await;
    let first = get_token(&server, "alice", "pw").await;

    server
        .post("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", first))
        .multipart(file_form("a.pdf", "application/pdf", vec![1u8; 10]))
        .await
        .assert_status(StatusCode::CREATED);

    let second = get_token(&server, "alice", "pw").await;
    let response = server
        .get("/api/v1/files")
        .add_header(AUTHORIZATION, format!("Bearer {}", second))
        .await;

    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_requires_auth() {
    let (server, _dir) = create_test_server(FilesConfig::default()).await;

    let response = server.get("/api/v1/files").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/v1/files")
        .add_header(AUTHORIZATION, "Bearer not-a-jwt")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
