//! Login endpoint: ordinary web session, plus authenticate-and-bind when an
//! extension handshake state rides along with the submission.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    dtos::auth::{LoginRequest, LoginResponse},
    dtos::ErrorResponse,
    utils::ValidatedJson,
    AppState,
};
use service_core::error::AppError;

/// Login with email and password
///
/// When `extensionAuthState` is attached, a successful login also completes
/// the extension handshake: the response carries the hand-off redirect
/// (bridging page URL) instead of leaving the client on the ordinary
/// post-login path. A login-supplied `extensionRedirectUri` overrides the
/// redirect stored at initiate time.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 404, description = "Attached handshake state unknown or expired", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 502, description = "User store or signing failure", body = ErrorResponse),
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, tokens) = state.auth_service.login(&req.email, &req.password).await?;

    // The web session is established regardless of what happens to the
    // handshake below; a failed bind is retried by reloading the
    // extension-initiated link, not by logging in again.
    let extension_auth = match req.extension_auth_state.as_deref() {
        Some(handshake_state) => Some(state.handshake.bind(
            handshake_state,
            &user,
            req.extension_redirect_uri.clone(),
        )?),
        None => None,
    };

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            user: user.sanitized(),
            tokens,
            extension_auth,
        }),
    ))
}
