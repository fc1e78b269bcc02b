//! Wire DTOs for the extension handshake endpoints.
//!
//! Field names follow the extension-facing wire format (`extensionId`,
//! `redirectURL`), which predates this service and cannot change without
//! breaking deployed extensions.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Initiate request. An absent or empty `extensionId` is rejected as a
/// missing parameter by the handler rather than a validation rule, so both
/// cases surface as the same 400.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InitiateRequest {
    #[serde(rename = "extensionId")]
    #[schema(example = "chrome-ext-instance-42")]
    pub extension_id: String,

    #[serde(rename = "redirectURL", default)]
    #[schema(example = "https://extension.example/callback")]
    pub redirect_url: Option<String>,

    /// Optional pre-shared secret; only its hash is retained.
    #[serde(rename = "authToken", default)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InitiateResponse {
    #[schema(example = true)]
    pub success: bool,
    #[serde(rename = "authUrl")]
    #[schema(example = "/extension-auth?state=4fWk...&redirect_uri=")]
    pub auth_url: String,
    #[schema(example = "4fWkT3iJd8cQnA1yZ0x2bg")]
    pub state: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusQuery {
    pub state: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = true)]
    pub success: bool,
    #[serde(rename = "extensionId")]
    pub extension_id: String,
    #[serde(rename = "redirectURL")]
    pub redirect_url: Option<String>,
    #[schema(example = true)]
    pub valid: bool,
}

/// Error body for poll/verify misses; `valid:false` regardless of whether
/// the state never existed, was swept, or was mistyped.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvalidStateResponse {
    pub error: String,
    pub code: String,
    pub valid: bool,
}
