use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The API error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorPayload {
    /// The error message
    pub message: String,
    /// The HTTP status code
    pub code: u16,
    /// The error type identifier
    pub r#type: String,
    /// Additional error details (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
