/// HTTP surface: route builders and request handling helpers
pub mod auth;
pub mod platforms;
pub mod profiles;
pub mod response;

use axum::Router;
use validator::{Validate, ValidationErrors};

use crate::context::AppContext;
use crate::error::{AppError, AppResult};

/// All API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(auth::routes())
        .merge(platforms::routes())
        .merge(profiles::routes())
}

/// Run declarative DTO validation, flattening violations into field-level
/// messages for the envelope.
pub(crate) fn validate_request<T: Validate>(value: &T) -> AppResult<()> {
    value
        .validate()
        .map_err(|errors| AppError::Validation(flatten_errors(&errors)))
}

fn flatten_errors(errors: &ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, violations)| {
            violations.iter().map(move |violation| match &violation.message {
                Some(message) => message.to_string(),
                None => format!("Field '{}' is invalid.", field),
            })
        })
        .collect()
}
