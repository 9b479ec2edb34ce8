use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::ingest::IngestError;
use crate::service::ServiceError;

/// An error rendered as `{"detail": "..."}` with a status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Message shown to the caller.
    pub detail: String,
}

impl ApiError {
    /// A 400 response.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    /// A 500 response.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::Connect { .. } => ApiError::internal(err.to_string()),
            ServiceError::Execute { .. } => ApiError::bad_request(err.to_string()),
            ServiceError::Ingest {
                source: IngestError::InvalidIdentifier { .. },
            } => ApiError::bad_request(
                "Invalid table name. Use only letters, numbers, and underscores.",
            ),
            ServiceError::Ingest { source } => {
                ApiError::bad_request(format!("Error processing CSV: {source}"))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(status = %self.status, detail = %self.detail, "request failed");
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ExecError;

    #[test]
    fn execution_errors_are_client_errors_with_store_text() {
        let err = ServiceError::Execute {
            sql: "SELECT nope".into(),
            source: ExecError::Execution {
                message: "no such column: nope".into(),
            },
        };
        let api = ApiError::from(err);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.detail, "Query execution error: no such column: nope");
    }

    #[test]
    fn invalid_identifier_has_fixed_message() {
        let err = ServiceError::Ingest {
            source: IngestError::InvalidIdentifier {
                name: "a b".into(),
            },
        };
        let api = ApiError::from(err);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            api.detail,
            "Invalid table name. Use only letters, numbers, and underscores."
        );
    }

    #[test]
    fn csv_errors_are_prefixed() {
        let api = ApiError::from(ServiceError::Ingest {
            source: IngestError::NoColumns,
        });
        assert_eq!(api.detail, "Error processing CSV: no columns to parse from file");
    }
}
