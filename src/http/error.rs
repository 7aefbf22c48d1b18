//! Mapping of router errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{ExecutorError, RouterError};

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub RouterError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RouterError::NotFound(_) => StatusCode::NOT_FOUND,
            RouterError::DuplicateKey(_) => StatusCode::CONFLICT,
            RouterError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RouterError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RouterError::Executor(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<RouterError> for ApiError {
    fn from(err: RouterError) -> Self {
        Self(err)
    }
}

impl From<ExecutorError> for ApiError {
    fn from(err: ExecutorError) -> Self {
        Self(RouterError::Executor(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            RouterError::Unavailable { simulation_id } => json!({
                "error": self.0.to_string(),
                "simulationId": simulation_id,
            }),
            other => json!({ "error": other.to_string() }),
        };

        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self.0, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self.0, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (RouterError::NotFound("k".into()), StatusCode::NOT_FOUND),
            (RouterError::DuplicateKey("k".into()), StatusCode::CONFLICT),
            (
                RouterError::Unavailable {
                    simulation_id: "s".into(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (RouterError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (
                RouterError::Executor(ExecutorError::Timeout(5)),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).into_response().status(), expected);
        }
    }
}
