//! JSON error responses for the API routes.

use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::response::{IntoResponse, Json, Response};
use crate::schema::SchemaError;
use crate::status::Status;
use crate::store::StoreError;

/// A failed API request. Renders as `{"error": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Schema failures on create report as 422; elsewhere they are 400.
    pub fn unprocessable(e: SchemaError) -> Self {
        Self::Unprocessable(e.to_string())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::BadRequest(_) => Status::BadRequest,
            Self::Unprocessable(_) => Status::UnprocessableContent,
            Self::NotFound(_) => Status::NotFound,
            Self::Internal(_) => Status::InternalServerError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Json::with_status(self.status(), json!({ "error": self.to_string() })).into_response()
    }
}

impl From<SchemaError> for ApiError {
    fn from(e: SchemaError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        error!("store error: {e}");
        Self::Internal(e.to_string())
    }
}
