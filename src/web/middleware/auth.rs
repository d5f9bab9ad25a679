//! Bearer-token identity extraction.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::web::error::ApiError;
use crate::ShelfError;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Principal id as a decimal string.
    pub uid: String,
    /// Issuer.
    pub iss: String,
    /// Audience (same as the issuer).
    pub aud: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
}

impl JwtClaims {
    /// Parse the `uid` claim as a positive owner id.
    pub fn owner_id(&self) -> Option<i64> {
        self.uid.trim().parse::<i64>().ok().filter(|id| *id > 0)
    }
}

/// Verification settings for bearer tokens.
#[derive(Clone)]
pub struct JwtState {
    /// Decoding key for JWT verification.
    pub decoding_key: DecodingKey,
    /// Validation settings.
    pub validation: Validation,
}

impl JwtState {
    /// Create a new JWT state checking signature, expiry, issuer and audience.
    pub fn new(secret: &str, issuer: &str) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[issuer]);

        Self {
            decoding_key,
            validation,
        }
    }
}

/// Extractor for the authenticated owner.
///
/// Rejects with 401 when the bearer token is missing, invalid, expired, or
/// carries a `uid` that is not a positive integer.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Owner id taken from the `uid` claim.
    pub owner_id: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or_else(|| ShelfError::Auth("Missing authorization".to_string()))?;

        // Set by the jwt_auth middleware
        let jwt_state = parts
            .extensions
            .get::<Arc<JwtState>>()
            .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

        let token_data =
            decode::<JwtClaims>(token, &jwt_state.decoding_key, &jwt_state.validation).map_err(
                |e| {
                    tracing::debug!("JWT validation failed: {}", e);
                    ShelfError::Auth("Invalid or expired token".to_string())
                },
            )?;

        let claims = token_data.claims;
        let owner_id = claims.owner_id().ok_or_else(|| {
            tracing::debug!(uid = %claims.uid, "Rejected token with unusable uid claim");
            ShelfError::Auth("Invalid user identity".to_string())
        })?;

        Ok(AuthUser { owner_id })
    }
}

/// Middleware function to inject JWT state into request extensions.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}
