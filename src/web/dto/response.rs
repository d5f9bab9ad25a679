//! Response DTOs for the HTTP API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::file::FileSummary;

/// Generic API response wrapper.
///
/// Each alias names one concrete envelope for the OpenAPI document.
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    FileListEnvelope = ApiResponse<Vec<FileSummary>>,
    FileEnvelope = ApiResponse<FileSummary>,
    TokenEnvelope = ApiResponse<TokenResponse>
)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Issued access token.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Access token expiry in seconds.
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_wraps_data() {
        let body: FileListEnvelope = ApiResponse::new(vec![FileSummary {
            id: 1,
            file_name: "a.pdf".to_string(),
            content_type: "application/pdf".to_string(),
        }]);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["data"][0]["id"], 1);
        assert_eq!(json["data"][0]["fileName"], "a.pdf");
        assert_eq!(json["data"][0]["contentType"], "application/pdf");
    }

    #[test]
    fn test_token_response_fields() {
        let body = TokenResponse {
            access_token: "t".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 7200,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["access_token"], "t");
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 7200);
    }
}
