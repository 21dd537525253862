//! HTTP verbs used by the Payload REST API.

use derive_more::Display;

/// HTTP request method. Payload only exposes the verbs below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// Read a document, a list or a global.
    #[display("GET")]
    Get,
    /// Create a document, update a global or upload media.
    #[display("POST")]
    Post,
    /// Replace a document.
    #[display("PUT")]
    Put,
    /// Partially update a document.
    #[display("PATCH")]
    Patch,
    /// Delete a document.
    #[display("DELETE")]
    Delete,
}

impl Method {
    /// The verb as it appears on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}
