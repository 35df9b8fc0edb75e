//! Errors surfaced to HTTP clients.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::http;

/// Request failures, each mapped to a status code and a `{"detail"}` body
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("invalid request body: {0}")]
    InvalidRequest(String),

    #[error("missing slide data")]
    MissingData,

    #[error("too many slides (max {max})")]
    TooManySlides { max: usize },

    #[error("request body too large (max {max} bytes)")]
    PayloadTooLarge { max: u64 },

    /// Anything that went wrong while building or saving the presentation
    #[error("failed to generate presentation: {0}")]
    GenerationFailed(String),

    #[error("file not found")]
    NotFound,
}

impl ServiceError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::MissingData | Self::TooManySlides { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::GenerationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        http::build_error_response(self.status(), &self.to_string())
    }
}

impl From<crate::pptx::Error> for ServiceError {
    fn from(err: crate::pptx::Error) -> Self {
        Self::GenerationFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::GenerationFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_detail() {
        let err = ServiceError::InvalidRequest("request body must be a JSON object".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "invalid request body: request body must be a JSON object"
        );

        assert_eq!(ServiceError::MissingData.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::NotFound.to_string(), "file not found");
        assert_eq!(
            ServiceError::PayloadTooLarge { max: 10 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ServiceError::TooManySlides { max: 500 }.to_string(),
            "too many slides (max 500)"
        );
    }

    #[test]
    fn test_builder_errors_become_generation_failures() {
        let err: ServiceError = crate::pptx::Error::MissingPart("ppt/presentation.xml".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "failed to generate presentation: missing package part: ppt/presentation.xml"
        );
    }
}
