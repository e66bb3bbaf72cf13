use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cinemax_core::error::{ApiError, ErrorEnvelope};
use cinemax_metadata::MetadataError;

/// Newtype wrapper so we can implement `IntoResponse` in this crate.
pub struct AppError(pub ApiError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = ErrorEnvelope::from(&self.0);
        (status, Json(envelope)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<MetadataError> for AppError {
    fn from(e: MetadataError) -> Self {
        Self(match e {
            MetadataError::NotFound => ApiError::NotFound("title not found upstream".into()),
            MetadataError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            MetadataError::Provider(msg) | MetadataError::Network(msg) => {
                ApiError::BadGateway(msg)
            }
        })
    }
}
