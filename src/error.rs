//! Error types for the Gini client

use std::{fmt, time::Duration};

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// The API call an [`ApiError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    OauthAuthCodeExchange,
    OauthCredentials,
    UploadFailed,
    DocumentGet,
    DocumentList,
    DocumentSearch,
    DocumentDelete,
    DocumentReport,
    DocumentLayout,
    DocumentExtractions,
    DocumentProcessed,
    DocumentFeedback,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ApiErrorKind::OauthAuthCodeExchange => "failed to exchange oauth2 auth code",
            ApiErrorKind::OauthCredentials => "failed to obtain token with username/password",
            ApiErrorKind::UploadFailed => "failed to upload document",
            ApiErrorKind::DocumentGet => "failed to GET document object",
            ApiErrorKind::DocumentList => "failed to get document list",
            ApiErrorKind::DocumentSearch => "failed to complete your search",
            ApiErrorKind::DocumentDelete => "failed to delete document",
            ApiErrorKind::DocumentReport => "failed to submit error report",
            ApiErrorKind::DocumentLayout => "failed to retrieve layout",
            ApiErrorKind::DocumentExtractions => "failed to retrieve extractions",
            ApiErrorKind::DocumentProcessed => "failed to retrieve processed document",
            ApiErrorKind::DocumentFeedback => "failed to submit feedback",
        };
        f.write_str(message)
    }
}

/// An unexpected HTTP status returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{kind} (HTTP status: {status}, RequestID: {}, DocumentID: {})",
    .request_id.as_deref().unwrap_or(""),
    .document_id.as_deref().unwrap_or("")
)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: u16,
    /// Value of the `X-Request-Id` response header, if any
    pub request_id: Option<String>,
    pub document_id: Option<String>,
}

/// Errors that can occur when using the Gini client
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to initialize config object: {0}")]
    ConfigInvalid(String),

    #[error("username or password cannot be empty in Oauth2 flow")]
    MissingCredentials,

    #[error("oauth2 authentication requires an auth code or username + password")]
    OAuthParametersMissing,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to parse document json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("response missing '{0}' header")]
    MissingHeader(&'static str),

    #[error("userIdentifier required (Authentication=BasicAuth)")]
    MissingUserIdentifier,

    #[error("failed to process document in time after {:.1}s", .0.as_secs_f64())]
    PollTimeout(Duration),
}

impl Error {
    /// HTTP status of an [`Error::Api`], if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(api) => Some(api.status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::PollTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_format() {
        let err = ApiError {
            kind: ApiErrorKind::DocumentGet,
            status: 404,
            request_id: Some("req-1".to_string()),
            document_id: None,
        };
        assert_eq!(
            err.to_string(),
            "failed to GET document object (HTTP status: 404, RequestID: req-1, DocumentID: )"
        );
    }

    #[test]
    fn test_status_and_timeout_helpers() {
        let api = Error::from(ApiError {
            kind: ApiErrorKind::DocumentDelete,
            status: 500,
            request_id: None,
            document_id: Some("abc".to_string()),
        });
        assert_eq!(api.status(), Some(500));
        assert!(!api.is_timeout());

        let timeout = Error::PollTimeout(Duration::from_millis(1500));
        assert!(timeout.is_timeout());
        assert_eq!(timeout.status(), None);
        assert_eq!(
            timeout.to_string(),
            "failed to process document in time after 1.5s"
        );
    }
}
