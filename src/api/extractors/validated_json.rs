//! JSON extractor that runs `validator` rules before the handler sees
//! the payload.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

/// Deserialize a JSON body and apply its `#[validate]` rules.
///
/// Malformed JSON and failed rules both surface as a 400 validation
/// error, so handlers only ever receive well-formed payloads.
///
/// # Example
///
/// ```rust,ignore
/// use booknook_api::api::extractors::ValidatedJson;
/// use booknook_api::domain::CreateBook;
///
/// async fn create_book(ValidatedJson(book): ValidatedJson<CreateBook>) {
///     // book.title is non-empty and book.price is non-negative here
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        payload
            .validate()
            .map_err(|errors| AppError::validation(flatten_errors(&errors)))?;

        Ok(ValidatedJson(payload))
    }
}

/// Collapse per-field validation errors into one client-facing line.
fn flatten_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}
