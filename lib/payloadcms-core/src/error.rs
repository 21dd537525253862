//! Error types for the Payload client.
//!
//! Every failure a call can hit lands in [`Error`]. Decode, protocol and API
//! failures keep the full [`Response`] so callers can still look at the status
//! line, headers and raw body after the call failed.

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::Response;

// ============================================================================
// API error records
// ============================================================================

/// A single error record reported by the Payload API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human readable message.
    pub message: String,
}

impl ApiError {
    /// Create an error record.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The list of errors from an error body.
///
/// ```json
/// { "errors": [ { "message": "You are not allowed to perform this action." } ] }
/// ```
///
/// Displays as the messages joined with `", "`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiErrors(pub Vec<ApiError>);

impl ApiErrors {
    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, ApiError> {
        self.0.iter()
    }

    /// The first record, if any.
    #[must_use]
    pub fn first(&self) -> Option<&ApiError> {
        self.0.first()
    }
}

impl std::fmt::Display for ApiErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&err.message)?;
        }
        Ok(())
    }
}

impl FromIterator<ApiError> for ApiErrors {
    fn from_iter<I: IntoIterator<Item = ApiError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ApiErrors {
    type Item = &'a ApiError;
    type IntoIter = std::slice::Iter<'a, ApiError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for Payload client operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The request body or upload metadata could not be serialized.
    #[display("failed to marshal JSON: {_0}")]
    #[from]
    Serialization(serde_json::Error),

    /// A JSON body did not match the requested type.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g. `docs[0].title`).
        path: String,
        /// Error message.
        message: String,
    },

    /// A 2xx body did not match the requested type. Keeps the response.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    Decode {
        /// JSON path to the error.
        path: String,
        /// Error message.
        message: String,
        /// The response envelope.
        #[error(not(source))]
        response: Box<Response>,
    },

    /// The request URL could not be built.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// The request could not be constructed.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// The client was configured incorrectly.
    #[display("invalid configuration: {_0}")]
    #[from(skip)]
    Config(#[error(not(source))] String),

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// The call did not finish in time.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The response body could not be read.
    #[display("failed to read response body: {_0}")]
    #[from(skip)]
    Read(#[error(not(source))] String),

    /// Local I/O failure while reading an upload source.
    #[display("I/O error: {_0}")]
    #[from]
    Io(std::io::Error),

    /// Non-2xx response without a body.
    #[display("received no body with status code: {status_line}")]
    #[from(skip)]
    NoBody {
        /// Status line, e.g. `405 Method Not Allowed`.
        status_line: String,
        /// The response envelope.
        #[error(not(source))]
        response: Box<Response>,
    },

    /// Non-2xx response whose body is not an error envelope.
    #[display("failed to unmarshal error response: {message}")]
    #[from(skip)]
    ErrorEnvelope {
        /// Decoder message.
        message: String,
        /// The response envelope.
        #[error(not(source))]
        response: Box<Response>,
    },

    /// Non-2xx response carrying a list of API errors.
    #[display("unexpected status code: {status}, errors: {errors}")]
    #[from(skip)]
    Api {
        /// HTTP status code.
        status: u16,
        /// Decoded error records.
        #[error(not(source))]
        errors: ApiErrors,
        /// The response envelope.
        #[error(not(source))]
        response: Box<Response>,
    },

    /// An upload was attempted without content.
    #[display("file is required")]
    #[from(skip)]
    FileRequired,

    /// No filename was supplied and none could be derived.
    #[display("no filename provided")]
    #[from(skip)]
    MissingFilename,

    /// No filename override was given and the URL's last segment has no `.`.
    #[display("no filename provided and couldn't extract from URL: {_0}")]
    #[from(skip)]
    FilenameNotInUrl(#[error(not(source))] String),

    /// A filename override carried an extension. Holds the extension.
    #[display("filename should not include extension, got: {_0}")]
    #[from(skip)]
    FilenameHasExtension(#[error(not(source))] String),

    /// A remote upload source kept redirecting.
    #[display("too many redirects ({count} exceeded max of {max})")]
    #[from(skip)]
    TooManyRedirects {
        /// Number of redirects followed.
        count: usize,
        /// Maximum allowed redirects.
        max: usize,
    },

    /// Fetching a remote upload source did not return `200 OK`.
    #[display("failed to download file: status code {_0}")]
    #[from(skip)]
    Download(#[error(not(source))] u16),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create a body read error.
    #[must_use]
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Attach the response a decode failure came from.
    ///
    /// Turns [`Error::JsonDeserialization`] into [`Error::Decode`]; any other
    /// error is returned unchanged.
    #[must_use]
    pub fn with_response(self, response: Response) -> Self {
        match self {
            Self::JsonDeserialization { path, message } => Self::Decode {
                path,
                message,
                response: Box::new(response),
            },
            other => other,
        }
    }

    /// Non-2xx response without a body.
    #[must_use]
    pub fn no_body(response: Response) -> Self {
        Self::NoBody {
            status_line: response.status_line(),
            response: Box::new(response),
        }
    }

    /// Non-2xx response with an undecodable body.
    #[must_use]
    pub fn error_envelope(message: impl Into<String>, response: Response) -> Self {
        Self::ErrorEnvelope {
            message: message.into(),
            response: Box::new(response),
        }
    }

    /// Non-2xx response with decoded API errors.
    #[must_use]
    pub fn api(response: Response) -> Self {
        Self::Api {
            status: response.status(),
            errors: response.errors().clone(),
            response: Box::new(response),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the API answered with a decoded error list.
    #[must_use]
    pub const fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// The response envelope for decode, protocol and API failures.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::NoBody { response, .. }
            | Self::Decode { response, .. }
            | Self::ErrorEnvelope { response, .. }
            | Self::Api { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Returns the HTTP status code when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Download(status) => Some(*status),
            _ => self.response().map(Response::status),
        }
    }

    /// The decoded API error records, if any.
    #[must_use]
    pub fn api_errors(&self) -> Option<&ApiErrors> {
        match self {
            Self::Api { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
