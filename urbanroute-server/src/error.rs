use axum::BoxError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use urbanroute_core::QueryError;

/// Startup failures of the binary.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to load dataset: {0}")]
    Dataset(#[from] urbanroute_core::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors returned to HTTP clients as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Core(#[from] urbanroute_core::Error),
    #[error("request timed out")]
    Timeout,
    #[error("server is overloaded, retry later")]
    Overloaded,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Query(_)
            | ApiError::BadRequest(_)
            | ApiError::Core(urbanroute_core::Error::InvalidQuery(_)) => StatusCode::BAD_REQUEST,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Core(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!("Rejected request: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Maps failures of the `tower` middleware stack onto [`ApiError`].
pub async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else if err.is::<tower::load_shed::error::Overloaded>() {
        ApiError::Overloaded
    } else {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_are_client_errors() {
        assert_eq!(
            ApiError::from(QueryError::SameEndpoints).status(),
            StatusCode::BAD_REQUEST
        );
        let wrapped = urbanroute_core::Error::InvalidQuery(QueryError::UnknownPlace("X".into()));
        assert_eq!(ApiError::from(wrapped).status(), StatusCode::BAD_REQUEST);
        let data = urbanroute_core::Error::InvalidData("broken".into());
        assert_eq!(
            ApiError::from(data).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn middleware_errors_map_to_status() {
        let timeout = handle_middleware_error(Box::new(tower::timeout::error::Elapsed::new())).await;
        assert_eq!(timeout.status(), StatusCode::REQUEST_TIMEOUT);
        let overloaded =
            handle_middleware_error(Box::new(tower::load_shed::error::Overloaded::new())).await;
        assert_eq!(overloaded.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
