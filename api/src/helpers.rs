use axum::http::StatusCode;
use axum::Json;
use sc_core::errors::{ErrorKind, ServiceError};

use crate::types::ApiError;

/// Maps a service error kind to the HTTP status the client should see.
pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds the error response tuple for a failed service call. Persistence
/// details stay in the logs; clients get a generic message.
pub(crate) fn error_response(err: &ServiceError) -> (StatusCode, Json<ApiError>) {
    let body = match err.kind() {
        ErrorKind::Persistence => ApiError::new("Internal server error"),
        _ => ApiError::new(err.message()),
    };
    (status_for(err.kind()), Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_expected_statuses() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(
            status_for(ErrorKind::Persistence),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn persistence_details_are_not_leaked_to_clients() {
        let err = ServiceError::persistence("KeyDB write failed: connection reset");
        let (status, Json(body)) = error_response(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");

        let err = ServiceError::not_found("Mission 7 not found");
        let (status, Json(body)) = error_response(&err);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Mission 7 not found");
    }
}
