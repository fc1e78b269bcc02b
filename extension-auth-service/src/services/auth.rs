//! Session/login facility.
//!
//! Authenticates credentials against the user store and establishes the
//! ordinary web session. The handshake coordinator consumes the
//! authenticated user this produces; it never reaches into the store itself.

use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::models::User;
use crate::services::{JwtService, UserStore};
use crate::utils::{verify_password, Password, PasswordHashString};
use service_core::error::AppError;

/// Web-session token response.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    /// Verify credentials and mint the web-session access token.
    ///
    /// Lookup failures from the store surface as upstream failures; the
    /// caller re-initiates rather than this service retrying.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, TokenResponse), AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "User store lookup failed during login");
                AppError::UpstreamFailure(format!("user store: {}", e))
            })?
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid email or password")))?;

        verify_password(
            &Password::new(password.to_string()),
            &PasswordHashString::new(user.password_hash.clone()),
        )
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid email or password")))?;

        let access_token = self
            .jwt
            .generate_access_token(&user.id.to_string(), &user.email)
            .map_err(|e| {
                tracing::error!(error = %e, "Access token signing failed");
                AppError::UpstreamFailure(format!("token signing: {}", e))
            })?;

        let tokens = TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry_seconds(),
        };

        Ok((user, tokens))
    }
}
