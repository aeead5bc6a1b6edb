//! Mapping from service errors to HTTP responses

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use rova_core::Error;

/// JSON body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// A request failure on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self(Error::InvalidInput(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the caller is told. Server-side details stay in the log.
    pub fn public_message(&self) -> String {
        match &self.0 {
            Error::InvalidInput(message) => message.clone(),
            Error::Timeout(_) => "the upstream model service timed out".to_string(),
            e if e.is_upstream() => "the upstream model service failed".to_string(),
            _ => "internal server error".to_string(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.0.kind(),
            message: self.public_message(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_input(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.0.kind(), status = status.as_u16(), error = %self.0, "Chat request failed");
        } else {
            warn!(kind = self.0.kind(), error = %self.0, "Rejected chat request");
        }
        (status, Json(self.body())).into_response()
    }
}
