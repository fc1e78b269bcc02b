//! Extension handshake endpoints: initiate, poll, and token-bound verify.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    dtos::handshake::{
        InitiateRequest, InitiateResponse, InvalidStateResponse, StatusQuery, StatusResponse,
    },
    dtos::ErrorResponse,
    models::PendingAuthRequest,
    services::TokenCheck,
    utils::ValidatedJson,
    AppState,
};
use service_core::error::AppError;

/// Start a handshake for an extension instance
#[utoipa::path(
    post,
    path = "/auth/extension",
    request_body = InitiateRequest,
    responses(
        (status = 200, description = "Handshake created", body = InitiateResponse),
        (status = 400, description = "Missing or empty extensionId", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
    ),
    tag = "Extension Handshake"
)]
pub async fn initiate(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<InitiateRequest>,
) -> Result<impl IntoResponse, AppError> {
    // An empty extensionId is as useless as an absent one; same 400.
    if req.extension_id.is_empty() {
        return Err(AppError::MissingParameter("extensionId".to_string()));
    }

    let (handshake_state, auth_url) = state.handshake.initiate(
        req.extension_id,
        req.redirect_url,
        req.auth_token.as_deref(),
    );

    Ok((
        StatusCode::OK,
        Json(InitiateResponse {
            success: true,
            auth_url,
            state: handshake_state,
        }),
    ))
}

/// Pre-login poll from the human browser; refreshes the record's TTL anchor
#[utoipa::path(
    get,
    path = "/auth/extension/init",
    params(StatusQuery),
    responses(
        (status = 200, description = "Handshake is live", body = StatusResponse),
        (status = 400, description = "Missing state parameter", body = InvalidStateResponse),
        (status = 404, description = "Unknown or expired state", body = InvalidStateResponse),
    ),
    tag = "Extension Handshake"
)]
pub async fn poll(State(state): State<AppState>, Query(query): Query<StatusQuery>) -> Response {
    let Some(handshake_state) = query.state else {
        return no_store(handshake_error(AppError::MissingParameter(
            "state".to_string(),
        )));
    };

    let response = match state.handshake.poll(&handshake_state) {
        Some(record) => valid_response(record),
        None => {
            tracing::debug!(state = %handshake_state, "Poll for unknown or expired state");
            handshake_error(unknown_state())
        }
    };
    no_store(response)
}

/// Token-bound status check from the extension's polling caller
#[utoipa::path(
    get,
    path = "/auth/extension",
    params(StatusQuery),
    responses(
        (status = 200, description = "Handshake is live and binding satisfied", body = StatusResponse),
        (status = 400, description = "Missing state parameter", body = InvalidStateResponse),
        (status = 401, description = "Pre-shared token mismatch", body = InvalidStateResponse),
        (status = 404, description = "Unknown or expired state", body = InvalidStateResponse),
    ),
    tag = "Extension Handshake"
)]
pub async fn verify(State(state): State<AppState>, Query(query): Query<StatusQuery>) -> Response {
    let Some(handshake_state) = query.state else {
        return no_store(handshake_error(AppError::MissingParameter(
            "state".to_string(),
        )));
    };

    let response = match state
        .handshake
        .verify(&handshake_state, query.token.as_deref())
    {
        TokenCheck::Verified(record) => valid_response(record),
        TokenCheck::Mismatch => {
            tracing::warn!(state = %handshake_state, "Extension token verification failed");
            handshake_error(AppError::TokenMismatch)
        }
        TokenCheck::UnknownState => {
            tracing::debug!(state = %handshake_state, "Status check for unknown or expired state");
            handshake_error(unknown_state())
        }
    };
    no_store(response)
}

fn valid_response(record: PendingAuthRequest) -> Response {
    (
        StatusCode::OK,
        Json(StatusResponse {
            success: true,
            extension_id: record.extension_id,
            redirect_url: record.redirect_url,
            valid: true,
        }),
    )
        .into_response()
}

/// Never-existed, already-swept, and mistyped states are deliberately
/// indistinguishable.
fn unknown_state() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Invalid or expired state parameter"))
}

/// Status-endpoint failures keep the error taxonomy's machine code but carry
/// the extra `valid` flag the extension keys on.
fn handshake_error(err: AppError) -> Response {
    let (status, error) = match &err {
        AppError::MissingParameter(param) => (
            StatusCode::BAD_REQUEST,
            format!("Missing parameter: {}", param),
        ),
        AppError::TokenMismatch => (
            StatusCode::UNAUTHORIZED,
            "Invalid authentication token".to_string(),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            "Invalid or expired state parameter".to_string(),
        ),
    };
    (
        status,
        Json(InvalidStateResponse {
            error,
            code: err.code().to_string(),
            valid: false,
        }),
    )
        .into_response()
}

/// Handshake status is a moving target; never let intermediaries cache it.
fn no_store(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, max-age=0"),
    );
    response
}
