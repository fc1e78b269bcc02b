use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::SanitizedUser;
use crate::services::{HandoffRedirect, TokenResponse};

/// Login request. The two optional extension fields are attached by the
/// login surface when the user arrived via an extension handshake link.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,

    #[serde(rename = "extensionAuthState", default)]
    pub extension_auth_state: Option<String>,

    #[serde(rename = "extensionRedirectUri", default)]
    pub extension_redirect_uri: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub user: SanitizedUser,
    pub tokens: TokenResponse,
    /// Present only when the login completed an extension handshake; the
    /// browser should navigate to `extension_auth.redirectUrl` instead of
    /// the ordinary post-login destination.
    #[serde(rename = "extensionAuth", skip_serializing_if = "Option::is_none")]
    pub extension_auth: Option<HandoffRedirect>,
}
