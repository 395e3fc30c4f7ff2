//! API error responses
//!
//! Full error detail is logged here; callers only see an opaque message and
//! a stable code.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog_core::CatalogError;
use serde::Serialize;
use tracing::{debug, error};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub code: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("product not found")]
    NotFound,

    /// Body missing, not JSON, or lacking a required field.
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "product not found",
                    code: "not_found",
                },
            ),
            ApiError::InvalidBody(rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                (
                    rejection.status(),
                    ErrorBody {
                        error: "invalid request body",
                        code: "invalid_body",
                    },
                )
            }
            ApiError::Catalog(e) => {
                error!("Request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal server error",
                        code: e.code(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
