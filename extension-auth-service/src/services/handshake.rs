//! Handshake coordinator.
//!
//! Binds registry operations to the boundary operations: initiate, poll,
//! token-bound verify, and the authenticate-and-bind hand-off. Per state the
//! flow is PENDING (record exists) -> AUTHENTICATED (login completed,
//! `created_at` touched) -> swept after the TTL. An authenticated record
//! stays readable until swept so the completion page survives reloads.

use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::models::{PendingAuthRequest, SanitizedUser, User};
use crate::services::registry::{PendingRequestRegistry, TokenCheck};
use crate::services::{token_binding, JwtService};
use service_core::error::AppError;

/// Everything the login response needs to complete the hand-off: the
/// bridging URL the browser is sent to, plus the same payload fields for
/// callers that consume them directly.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HandoffRedirect {
    #[serde(rename = "redirectUrl")]
    pub redirect_url: String,
    pub token: String,
    #[serde(rename = "userData")]
    pub user_data: SanitizedUser,
    pub state: String,
    #[serde(rename = "dashboardUrl")]
    pub dashboard_url: String,
}

#[derive(Clone)]
pub struct HandshakeService {
    registry: Arc<PendingRequestRegistry>,
    jwt: JwtService,
    base_url: String,
    dashboard_path: String,
}

impl HandshakeService {
    pub fn new(
        registry: Arc<PendingRequestRegistry>,
        jwt: JwtService,
        base_url: String,
        dashboard_path: String,
    ) -> Self {
        Self {
            registry,
            jwt,
            base_url,
            dashboard_path,
        }
    }

    /// Start a handshake: hash the optional pre-shared secret, store the
    /// record, and return the state plus the login-surface URL that carries it.
    pub fn initiate(
        &self,
        extension_id: String,
        redirect_url: Option<String>,
        auth_token: Option<&str>,
    ) -> (String, String) {
        let token_hash = auth_token.map(token_binding::hash_token);
        let state = self
            .registry
            .create(extension_id, redirect_url.clone(), token_hash);

        let auth_url = format!(
            "/extension-auth?state={}&redirect_uri={}",
            urlencoding::encode(&state),
            urlencoding::encode(redirect_url.as_deref().unwrap_or(""))
        );

        tracing::info!(state = %state, "Extension handshake initiated");
        (state, auth_url)
    }

    /// Pre-login poll from the human browser. Touches the record so a
    /// multi-step login (page reloads included) does not age it out. The
    /// state itself is the capability; no authentication required.
    pub fn poll(&self, state: &str) -> Option<PendingAuthRequest> {
        self.registry.touch(state)
    }

    /// Token-bound status check from the extension's polling caller.
    pub fn verify(&self, state: &str, token: Option<&str>) -> TokenCheck {
        self.registry.check_token(state, token)
    }

    /// Complete the handshake for an authenticated user.
    ///
    /// Touches the record (it survives until swept), mints the long-lived
    /// extension credential, and builds the bridging-page URL. The
    /// login-supplied redirect wins over the one stored at initiate time;
    /// with neither, only the internal dashboard route is offered.
    pub fn bind(
        &self,
        state: &str,
        user: &User,
        override_redirect: Option<String>,
    ) -> Result<HandoffRedirect, AppError> {
        let record = self.registry.touch(state).ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Invalid or expired state parameter"))
        })?;

        let client_redirect = override_redirect.or(record.redirect_url);

        let token = self.jwt.generate_extension_token(user, state).map_err(|e| {
            tracing::error!(error = %e, state = %state, "Extension credential signing failed");
            AppError::UpstreamFailure(format!("credential signing: {}", e))
        })?;

        let user_data = user.sanitized();
        let user_data_json = serde_json::to_string(&user_data).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to serialize user snapshot: {}", e))
        })?;

        let dashboard_url = format!("{}{}", self.base_url, self.dashboard_path);
        let redirect_url = format!(
            "{}/extension-auth-success?token={}&user_data={}&state={}&client_redirect={}&dashboard_url={}",
            self.base_url,
            urlencoding::encode(&token),
            urlencoding::encode(&user_data_json),
            urlencoding::encode(state),
            urlencoding::encode(client_redirect.as_deref().unwrap_or("")),
            urlencoding::encode(&dashboard_url),
        );

        tracing::info!(state = %state, user_id = %user.id, "Extension handshake bound");

        Ok(HandoffRedirect {
            redirect_url,
            token,
            user_data,
            state: state.to_string(),
            dashboard_url,
        })
    }
}
