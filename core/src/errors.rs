use std::fmt;

/// Coarse error category, used by callers to decide how to surface a failure
/// (HTTP status, retry policy) without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Mission or user-progress row does not exist.
    NotFound,
    /// Input rejected before any mutation took place.
    Validation,
    /// Duplicate active mission title at creation/rename time.
    Conflict,
    /// The storage backend failed; the atomic write group was not applied.
    Persistence,
}

/// Error type returned by the mission service and the stores behind it.
///
/// Validation and conflict errors are always raised before any write, so a
/// caller seeing one can assume no state changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Conflict,
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Persistence,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ServiceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_survives_construction_and_display_is_the_message() {
        let err = ServiceError::not_found("Mission 42 not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Mission 42 not found");

        let err = ServiceError::conflict("duplicate title");
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
