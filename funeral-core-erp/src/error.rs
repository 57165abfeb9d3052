use funeral_core_api::ApiError;
use reqwest::StatusCode;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErpError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("ERP API error (status {status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error("Invalid ERP base URL '{0}'")]
    InvalidBaseUrl(String),
    #[error("Invalid document id '{0}'")]
    InvalidId(String),
}

impl ErpError {
    /// Maps an ERP failure on one document onto the shared taxonomy.
    ///
    /// 404 becomes `NotFound`, 409/422 a rule violation raised by the ERP,
    /// everything else a network error.
    pub fn into_api_error(self, entity: &'static str, key: impl Display) -> ApiError {
        match self {
            ErpError::Api { status, .. } if status == StatusCode::NOT_FOUND => ApiError::not_found(entity, key),
            ErpError::Api { status, message }
                if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY =>
            {
                ApiError::rule(format!("ERP rejected {entity} '{key}': {message}"))
            }
            ErpError::InvalidId(id) => ApiError::validation(format!("invalid {entity} id '{id}'")),
            other => ApiError::NetworkError(other.to_string()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ErpError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}
