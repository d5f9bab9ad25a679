//! Request DTOs for the HTTP API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::validation::not_empty_trimmed;

/// Token request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub password: String,
}
