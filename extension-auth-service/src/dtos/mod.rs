pub mod auth;
pub mod handshake;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Invalid or expired state parameter")]
    pub error: String,
    #[schema(example = "not_found")]
    pub code: String,
}
