use thiserror::Error;

/// Error taxonomy shared by the store, service and API layers.
///
/// `NotFound` and `InvalidInput` describe the caller's own request and are
/// safe to return verbatim. `Internal` wraps whatever went wrong underneath
/// and must never be shown to a client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{} with id {} not found", resource, id))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AppError::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("pet", "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "pet with id abc not found");
    }

    #[test]
    fn test_internal_wraps_anyhow_context() {
        let source: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        let err: AppError = source.context("Failed to save pet").unwrap_err().into();

        assert!(!err.is_not_found());
        assert!(!err.is_invalid_input());
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.to_string(), "Failed to save pet");
    }
}
