//! Error taxonomy shared by every part of the client.
//!
//! Network failures are classified in exactly one place
//! ([`crate::http::HttpClient::request`]); everything else only propagates.

use thiserror::Error;

/// Errors returned by the document client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The connection string (or config) is missing or malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The server could not be reached at all.
    #[error("Server refused connection. URL: {url}")]
    ServerRefused { url: String },

    /// The server answered 401 and no bearer token was configured.
    #[error("No auth provided")]
    NoAuthProvided,

    /// The server answered 401 even though a bearer token was sent.
    #[error("Invalid auth provided")]
    InvalidAuthProvided,

    /// The server answered 404.
    #[error("Not found: server responded with {status} {reason}. URL: {url}")]
    NotFound {
        status: u16,
        reason: String,
        url: String,
    },

    /// Any other non-2xx response.
    #[error("Server responded with {status} {reason}. URL: {url}")]
    ServerError {
        status: u16,
        reason: String,
        url: String,
    },

    /// Any other transport or processing failure.
    #[error("{message}")]
    Unknown { message: String },
}

impl Error {
    /// Returns the flat kind of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Config(_) => ErrorCode::ConfigError,
            Error::ServerRefused { .. } => ErrorCode::ServerRefused,
            Error::NoAuthProvided => ErrorCode::NoAuthProvided,
            Error::InvalidAuthProvided => ErrorCode::InvalidAuthProvided,
            Error::NotFound { .. } => ErrorCode::NotFound,
            Error::ServerError { .. } => ErrorCode::ServerError,
            Error::Unknown { .. } => ErrorCode::Unknown,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound { status, .. } | Error::ServerError { status, .. } => Some(*status),
            Error::NoAuthProvided | Error::InvalidAuthProvided => Some(401),
            _ => None,
        }
    }

    /// URL of the failed request, if known.
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::ServerRefused { url }
            | Error::NotFound { url, .. }
            | Error::ServerError { url, .. } => Some(url),
            _ => None,
        }
    }

    pub(crate) fn unknown(message: impl std::fmt::Display) -> Self {
        Error::Unknown {
            message: message.to_string(),
        }
    }
}

/// The kind of an [`Error`], as a plain enum.
///
/// Displays as the code string other clients of the same server use
/// (`"ServerRefused"`, `"NotFound"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigError,
    ServerRefused,
    NoAuthProvided,
    InvalidAuthProvided,
    NotFound,
    ServerError,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigError => "ConfigError",
            ErrorCode::ServerRefused => "ServerRefused",
            ErrorCode::NoAuthProvided => "NoAuthProvided",
            ErrorCode::InvalidAuthProvided => "InvalidAuthProvided",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::ServerError => "ServerError",
            ErrorCode::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Error::NoAuthProvided.code(), ErrorCode::NoAuthProvided);
        assert_eq!(
            Error::Config("missing".to_string()).code(),
            ErrorCode::ConfigError
        );
        assert_eq!(Error::unknown("boom").code(), ErrorCode::Unknown);
        assert_eq!(ErrorCode::InvalidAuthProvided.to_string(), "InvalidAuthProvided");
    }

    #[test]
    fn test_messages() {
        let err = Error::ServerRefused {
            url: "http://localhost:1/check_store".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Server refused connection. URL: http://localhost:1/check_store"
        );

        let err = Error::ServerError {
            status: 500,
            reason: "Internal Server Error".to_string(),
            url: "http://localhost/doc/new".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Server responded with 500 Internal Server Error. URL: http://localhost/doc/new"
        );

        assert_eq!(Error::unknown("boom").to_string(), "boom");
    }

    #[test]
    fn test_status_and_url() {
        let err = Error::NotFound {
            status: 404,
            reason: "Not Found".to_string(),
            url: "http://localhost/doc/x/auth".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.url(), Some("http://localhost/doc/x/auth"));

        assert_eq!(Error::InvalidAuthProvided.status(), Some(401));
        assert_eq!(Error::unknown("x").status(), None);
        assert_eq!(Error::NoAuthProvided.url(), None);
    }
}
