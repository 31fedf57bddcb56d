//! Typed error hierarchy for the Code Rev client.
//!
//! Three top-level enums cover the three subsystems:
//! - `ApiError`: HTTP transport and backend failures
//! - `StorageError`: durable session storage failures
//! - `ConfigError`: `coderev.toml` loading and validation failures

use reqwest::StatusCode;
use thiserror::Error;

/// Fallback shown when the backend does not supply a `message`.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Errors from the HTTP client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Server { status: StatusCode, message: String },

    #[error("Invalid response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Invalid base URL '{url}'")]
    InvalidBaseUrl { url: String },
}

impl ApiError {
    /// The text a user should see for this failure.
    ///
    /// Backend errors carry the server's `message` field; anything else maps
    /// to a generic fallback so transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    /// HTTP status of a backend rejection, if the request reached the server.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// True when the backend rejected the session (401/403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

/// Errors from the durable session storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access session file at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file at {path} is not valid JSON: {source}")]
    Json {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from loading `coderev.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid environment '{0}'. Valid values: production, development")]
    InvalidEnvironment(String),

    #[error("Could not determine a configuration directory")]
    NoConfigDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_displays_backend_message() {
        let err = ApiError::Server {
            status: StatusCode::BAD_REQUEST,
            message: "Title is required".to_string(),
        };
        assert_eq!(err.to_string(), "Title is required");
        assert_eq!(err.user_message(), "Title is required");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn blank_server_message_falls_back_to_generic() {
        let err = ApiError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "   ".to_string(),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn decode_error_uses_generic_message() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::Decode(json_err);
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        assert!(err.status().is_none());
    }

    #[test]
    fn unauthorized_is_detected_for_401_and_403() {
        let unauthorized = ApiError::Server {
            status: StatusCode::UNAUTHORIZED,
            message: "Please login".into(),
        };
        let forbidden = ApiError::Server {
            status: StatusCode::FORBIDDEN,
            message: "Nope".into(),
        };
        let not_found = ApiError::Server {
            status: StatusCode::NOT_FOUND,
            message: "Missing".into(),
        };
        assert!(unauthorized.is_unauthorized());
        assert!(forbidden.is_unauthorized());
        assert!(!not_found.is_unauthorized());
    }

    #[test]
    fn storage_error_carries_path() {
        let path = std::path::PathBuf::from("/tmp/coderev/session.json");
        let err = StorageError::Io {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        match &err {
            StorageError::Io { path: p, source } => {
                assert_eq!(p, &path);
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected Io"),
        }
        assert!(err.to_string().contains("session.json"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&ApiError::InvalidBaseUrl { url: "x".into() });
        assert_std_error(&ConfigError::NoConfigDir);
        assert_std_error(&StorageError::Io {
            path: "x".into(),
            source: std::io::Error::other("x"),
        });
    }
}
