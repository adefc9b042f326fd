use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatabaseError {
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl DatabaseError {
    /// Whether repeating the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DatabaseError::Unavailable(_) | DatabaseError::Conflict(_))
    }

    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => DatabaseError::Unauthorized(body),
            404 => DatabaseError::NotFound(body),
            409 => DatabaseError::Conflict(body),
            500..=599 => DatabaseError::Unavailable(format!("upstream returned {}: {}", status, body)),
            _ => DatabaseError::Api { status, message: body },
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_variants() {
        assert_eq!(
            DatabaseError::from_status(409, "duplicate key".into()),
            DatabaseError::Conflict("duplicate key".into())
        );
        assert!(matches!(DatabaseError::from_status(503, String::new()), DatabaseError::Unavailable(_)));
        assert!(matches!(DatabaseError::from_status(422, String::new()), DatabaseError::Api { status: 422, .. }));
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(DatabaseError::Unavailable("timeout".into()).is_retryable());
        assert!(DatabaseError::Conflict("23505".into()).is_retryable());
        assert!(!DatabaseError::NotFound("x".into()).is_retryable());
    }
}
