use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use service_core::error::AppError;

/// JSON extractor that also runs `validator` rules.
///
/// A body that fails to deserialize (absent required field, malformed JSON)
/// surfaces as 400 `missing_parameter`; a body that deserializes but fails a
/// validation rule surfaces as 422 `validation_error`.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::MissingParameter(e.body_text()))?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}
