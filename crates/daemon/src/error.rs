use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("Invalid status")]
    InvalidStatus,

    #[error("Invalid machineId")]
    InvalidMachineId,

    #[error("Device not found")]
    NotFound,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidStatus | ApiError::InvalidMachineId => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_http_codes() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidStatus.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidMachineId.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn response_carries_status() {
        let resp = ApiError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
