//! The pluggable HTTP transport.
//!
//! A [`Transport`] sends one [`Request`] and hands back the status, headers
//! and a body stream. Everything else (authentication, classification,
//! decoding) happens in the client on top of it.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;
use http::HeaderMap;

use crate::{Request, Result};

/// A response body delivered in chunks.
pub type Body = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Status, headers and an undrained body.
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body stream.
    pub body: Body,
}

impl RawResponse {
    /// A response with a body available in one piece.
    #[must_use]
    pub fn full(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        Self {
            status,
            headers,
            body: Box::pin(futures_util::stream::once(async move { Ok(body) })),
        }
    }

    /// `Location` target of a 301, 302, 303, 307 or 308 response.
    #[must_use]
    pub fn redirect_location(&self) -> Option<&str> {
        if !matches!(self.status, 301 | 302 | 303 | 307 | 308) {
            return None;
        }
        self.headers
            .get(http::header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    /// Drain the body stream into one buffer.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by the stream.
    pub async fn collect(self) -> Result<(u16, HeaderMap, Bytes)> {
        let Self {
            status,
            headers,
            mut body,
        } = self;

        let mut chunks: Vec<Bytes> = Vec::new();
        while let Some(chunk) = body.next().await {
            chunks.push(chunk?);
        }

        let content = match chunks.len() {
            0 => Bytes::new(),
            1 => chunks.pop().unwrap_or_default(),
            _ => Bytes::from(chunks.concat()),
        };
        Ok((status, headers, content))
    }
}

impl std::fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Sends a request and returns the raw response.
///
/// Implementations report dispatch failures as [`crate::Error::Connection`]
/// or [`crate::Error::Tls`] and body failures as [`crate::Error::Read`]
/// items in the stream. They must not interpret the status code.
pub trait Transport: Send + Sync {
    /// Send `request`.
    fn perform(&self, request: Request) -> impl Future<Output = Result<RawResponse>> + Send;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn perform(&self, request: Request) -> impl Future<Output = Result<RawResponse>> + Send {
        (**self).perform(request)
    }
}
