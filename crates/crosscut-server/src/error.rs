//! HTTP error mapping.
//!
//! Every failure leaves the service as one status code and one plain
//! message; no backtraces cross the interface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crosscut_distributed::types::DistributedError;

/// A request failure, carried as the distributed-layer error it came from.
#[derive(Debug)]
pub struct ApiError(DistributedError);

impl ApiError {
    pub fn message(&self) -> String {
        self.0.to_string()
    }

    fn status(&self) -> StatusCode {
        match &self.0 {
            DistributedError::Configuration(_) => StatusCode::BAD_REQUEST,
            DistributedError::NotReady(_) => StatusCode::CONFLICT,
            DistributedError::ShardRequest { .. } => StatusCode::BAD_GATEWAY,
            DistributedError::ShardNotFound(_) | DistributedError::NodeNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
        }
    }
}

impl From<DistributedError> for ApiError {
    fn from(err: DistributedError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        tracing::debug!(%status, message, "request failed");
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: ApiError = DistributedError::Configuration("bad".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = DistributedError::NotReady("not yet".into()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError =
            DistributedError::ShardNotFound(crosscut_core::ShardId::new(9)).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
