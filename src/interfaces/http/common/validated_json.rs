//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>` but runs two checks on the
//! deserialized value before the handler sees it:
//!
//! 1. structural rules declared with `validator` derive attributes
//! 2. semantic rules from [`BusinessRules`] (trimmed values, etc.)
//!
//! Any failure, including malformed JSON, becomes a 400 problem response.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::Problem;

/// Semantic checks that run after structural validation passed.
///
/// Returns the first violated rule as a client-facing message.
pub trait BusinessRules {
    fn check_rules(&self) -> Result<(), String>;
}

/// An extractor that deserializes JSON and validates it.
///
/// ```ignore
/// async fn handler(ValidatedJson(body): ValidatedJson<CreateFooRequest>) {
///     // `body` passed both validation phases
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

/// Error type for `ValidatedJson` extraction failures.
#[derive(Debug)]
pub enum ValidatedJsonRejection {
    /// Body is not JSON or does not fit the request shape.
    JsonError(JsonRejection),
    /// Structural validation failed.
    ValidationError(ValidationErrors),
    /// A business rule was violated.
    RuleViolation(String),
}

impl ValidatedJsonRejection {
    pub fn detail(&self) -> String {
        match self {
            Self::JsonError(rejection) => format!("invalid JSON body: {}", rejection.body_text()),
            Self::ValidationError(errors) => describe_validation_errors(errors),
            Self::RuleViolation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        Problem::bad_request(self.detail()).into_response()
    }
}

/// Flattens field errors into one deterministic message.
///
/// Messages are ordered by field name and joined with `"; "`. Errors without a
/// custom message fall back to `"<field>: <code>"`.
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut entries: Vec<(String, String)> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: {}", field, e.code));
                (field.to_string(), msg)
            })
        })
        .collect();
    entries.sort();

    if entries.is_empty() {
        "validation failed".to_string()
    } else {
        entries
            .into_iter()
            .map(|(_, msg)| msg)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + BusinessRules,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;
        value
            .check_rules()
            .map_err(ValidatedJsonRejection::RuleViolation)?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────
