//! Centralized error types for the SkyCast client.
//!
//! The taxonomy follows how each failure is treated:
//! - `ValidationError` is raised before any request leaves the client
//! - `AuthError` ends the session and routes to the login entry point
//! - `RemoteError` and `NetworkError` become a display-only message
//! - `IntegrityError` marks malformed input handed to the aggregators

use thiserror::Error;

/// Result alias used across the client crates.
pub type Result<T> = std::result::Result<T, AppError>;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Data integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.user_message(),
            AppError::Auth(e) => e.user_message().to_string(),
            AppError::Remote(e) => e.user_message(),
            AppError::Network(e) => e.user_message().to_string(),
            AppError::Integrity(_) => "Some records are incomplete and were not charted.".to_string(),
            AppError::Config(e) => e.user_message().to_string(),
            AppError::Io(_) => "A file operation failed. Please try again.".to_string(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }

    /// True when the server rejected the credential; the session is over.
    pub fn is_session_terminal(&self) -> bool {
        matches!(self, AppError::Auth(AuthError::Rejected))
    }
}

/// Input rejected locally, before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::EmptyField(field) => format!("Please enter a {}.", field),
            ValidationError::TooLong { field, max } => {
                format!("The {} is too long (max {} characters).", field, max)
            }
            ValidationError::PasswordTooShort { min } => {
                format!("Password must be at least {} characters long.", min)
            }
            ValidationError::PasswordMismatch => "Passwords do not match.".to_string(),
        }
    }
}

/// Authentication errors (missing, rejected or unusable credentials).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No session")]
    NotAuthenticated,

    #[error("Token rejected by server")]
    Rejected,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Credential storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "Not signed in. Please log in.",
            AuthError::Rejected => "Your session has expired. Please log in again.",
            AuthError::InvalidCredentials => "Invalid credentials. Please check and try again.",
            AuthError::StorageError(_) => "Failed to access saved credentials. Please try again.",
        }
    }
}

/// Non-auth failures reported by the remote service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered successfully but declined the operation.
    #[error("Request refused: {0}")]
    Refused(String),

    /// The response body did not match the expected schema.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    pub fn user_message(&self) -> String {
        match self {
            RemoteError::Status { message, .. } if !message.is_empty() => message.clone(),
            RemoteError::Status { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later.".to_string()
            }
            RemoteError::Status { status: 404, .. } => "Not found.".to_string(),
            RemoteError::Status { .. } => "The request failed. Please try again.".to_string(),
            RemoteError::Refused(message) => message.clone(),
            RemoteError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again.".to_string()
            }
        }
    }
}

/// Transport-level failures (never retried).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("TLS/SSL error: {0}")]
    TlsError(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::TlsError(_) => "Secure connection failed. Check your network settings.",
        }
    }
}

/// Aggregation input that is missing a field it must carry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("Record {record} is missing {field}")]
    MissingField { record: String, field: &'static str },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_app_error(self) -> AppError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_app_error(self) -> AppError {
        if self.is_timeout() {
            NetworkError::Timeout.into()
        } else if self.is_decode() {
            RemoteError::InvalidResponse(self.to_string()).into()
        } else if let Some(status) = self.status() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                AuthError::Rejected.into()
            } else {
                RemoteError::Status {
                    status: status.as_u16(),
                    message: String::new(),
                }
                .into()
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string()).into()
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        e.into_app_error()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::InvalidResponse(e.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors: Vec<AppError> = vec![
            ValidationError::EmptyField("city").into(),
            AuthError::Rejected.into(),
            RemoteError::InvalidResponse("x".into()).into(),
            NetworkError::Timeout.into(),
            IntegrityError::MissingField {
                record: "a@b.c".into(),
                field: "preferred_temperature_unit",
            }
            .into(),
            ConfigError::Invalid("x".into()).into(),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty(), "{:?}", err);
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let app_err: AppError = AuthError::Rejected.into();
        assert!(matches!(app_err, AppError::Auth(AuthError::Rejected)));
        assert!(app_err.is_session_terminal());
    }

    #[test]
    fn test_only_rejection_is_terminal() {
        assert!(!AppError::Auth(AuthError::NotAuthenticated).is_session_terminal());
        assert!(!AppError::Remote(RemoteError::Status {
            status: 403,
            message: String::new(),
        })
        .is_session_terminal());
    }

    #[test]
    fn test_remote_message_is_surfaced() {
        let err = RemoteError::Status {
            status: 404,
            message: "City not found".into(),
        };
        assert_eq!(err.user_message(), "City not found");

        let err = RemoteError::Status {
            status: 502,
            message: String::new(),
        };
        assert!(err.user_message().contains("server"));
    }

    #[test]
    fn test_validation_message() {
        let err = ValidationError::PasswordTooShort { min: 8 };
        assert!(err.user_message().contains('8'));
    }
}
