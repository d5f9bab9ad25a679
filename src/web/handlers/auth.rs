//! Token issuance and shared handler state.

use axum::{extract::State, Json};
use jsonwebtoken::{encode, EncodingKey, Header};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::file::FileService;
use crate::web::dto::{ApiResponse, LoginRequest, TokenEnvelope, TokenResponse, ValidatedJson};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::middleware::JwtClaims;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// File operations.
    pub files: Arc<FileService>,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Token issuer, also used as the audience.
    pub issuer: String,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(files: Arc<FileService>, jwt_secret: &str, issuer: &str, access_expiry: u64) -> Self {
        Self {
            files,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            issuer: issuer.to_string(),
            access_token_expiry: access_expiry,
        }
    }

    /// Generate an access token carrying `owner_id` as the `uid` claim.
    pub fn generate_access_token(&self, owner_id: i64) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            uid: owner_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(self.access_token_expiry),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }
}

/// Derive a stable, positive principal id from a credential pair.
///
/// There is no account store: the same username and password always map to
/// the same owner.
pub fn derive_owner_id(username: &str, password: &str) -> i64 {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let id = (u64::from_be_bytes(prefix) & i64::MAX as u64) as i64;

    if id == 0 {
        1
    } else {
        id
    }
}

/// POST /api/v1/auth - Issue an access token.
#[utoipa::path(
    post,
    path = "/auth",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenEnvelope),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 422, description = "Blank username or password", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenEnvelope>, ApiError> {
    let owner_id = derive_owner_id(&req.username, &req.password);
    let access_token = state.generate_access_token(owner_id)?;

    tracing::info!(owner_id, "Issued access token");

    Ok(Json(ApiResponse::new(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.access_token_expiry,
    })))
}
