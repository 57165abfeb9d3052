use std::error::Error;
use std::fmt::Display;

use thiserror::Error;
use validator::ValidationErrors;

/// Closed error taxonomy shared by every use case.
///
/// Use cases surface the first failing step's error unchanged; there is no
/// retry or compensation at this layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed input or input outside of a configured policy.
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    /// Valid input that a domain rule disallows.
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),

    #[error("Invalid state transition for {entity}: {from} -> {to}")]
    InvalidStateTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn not_found(entity: &'static str, key: impl Display) -> Self {
        ApiError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn rule(message: impl Into<String>) -> Self {
        ApiError::BusinessRuleViolation(message.into())
    }

    pub fn transition(entity: &'static str, from: impl Display, to: impl Display) -> Self {
        ApiError::InvalidStateTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Wraps an adapter error raised by a repository.
    pub fn persistence(err: Box<dyn Error + Send + Sync>) -> Self {
        ApiError::PersistenceError(err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let codes: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{field}: {}", codes.join(", "))
            })
            .collect();
        fields.sort();
        if fields.is_empty() {
            // only nested struct or list errors
            return ApiError::ValidationError(errors.to_string());
        }
        ApiError::ValidationError(fields.join("; "))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
