//! HTTP client errors and their mapping onto service errors.

use checkout::{Collaborator, ServiceError};
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when calling a collaborator over HTTP.
#[derive(Debug, Error)]
pub enum ClientError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-2xx response.
    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http(e) => e.status(),
            ClientError::Status { status, .. } => Some(*status),
        }
    }

    /// Classifies the failure for `service`.
    ///
    /// Unreachable services and gateway errors are `Unavailable`; everything
    /// the service answered is `Upstream`. Callers map `404` and `402`
    /// themselves where those carry meaning.
    pub fn into_service_error(self, service: Collaborator) -> ServiceError {
        match &self {
            ClientError::Http(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                ServiceError::unavailable(service, self.to_string())
            }
            ClientError::Status { status, .. }
                if matches!(
                    *status,
                    StatusCode::BAD_GATEWAY
                        | StatusCode::SERVICE_UNAVAILABLE
                        | StatusCode::GATEWAY_TIMEOUT
                ) =>
            {
                ServiceError::unavailable(service, self.to_string())
            }
            _ => ServiceError::upstream(service, self.to_string()),
        }
    }
}
