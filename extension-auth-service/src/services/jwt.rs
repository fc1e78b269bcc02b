use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::{User, UserRole};

/// JWT service for token generation and validation (HS256).
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    extension_token_expiry_hours: i64,
    access_token_expiry_minutes: i64,
}

/// Claims for the long-lived bearer credential handed to the extension.
///
/// Deliberately excludes secrets such as the password hash. The `state`
/// claim records which handshake the credential was minted for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Handshake state this credential was minted for
    pub state: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

/// Claims for ordinary web-session access tokens (short-lived).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        if config.secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT secret must be at least 32 bytes, got {}",
                config.secret.len()
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            extension_token_expiry_hours: config.extension_token_expiry_hours,
            access_token_expiry_minutes: config.access_token_expiry_minutes,
        })
    }

    /// Mint the long-lived extension credential for a user and handshake state.
    pub fn generate_extension_token(
        &self,
        user: &User,
        state: &str,
    ) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.extension_token_expiry_hours);

        let claims = ExtensionTokenClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone().unwrap_or_default(),
            role: user.role,
            state: state.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode extension token: {}", e))?;

        Ok(token)
    }

    pub fn validate_extension_token(
        &self,
        token: &str,
    ) -> Result<ExtensionTokenClaims, anyhow::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<ExtensionTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid extension token: {}", e))?;

        Ok(token_data.claims)
    }

    /// Generate a short-lived access token for the ordinary web session.
    pub fn generate_access_token(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_token_expiry_minutes);

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))?;

        Ok(token)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, anyhow::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid access token: {}", e))?;

        Ok(token_data.claims)
    }

    /// Get access token expiry in seconds (for client info)
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_expiry_minutes * 60
    }
}
