//! Core types for the Payload CMS client.
//!
//! This crate holds everything that does not need an HTTP stack:
//! - [`QueryBuilder`] and [`ListParams`] - `where` clause and list query encoding
//! - [`Request`] and [`RequestBuilder`] - outgoing requests
//! - [`Response`] and [`Decoded`] - the response envelope
//! - [`Error`] and [`Result`] - error handling
//! - [`Transport`] - the pluggable "send request, receive response" seam
//! - [`Form`] and [`Part`] - multipart bodies for media uploads
//! - [`sniff`] - content type detection for uploads
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)
//! - [`header`] - HTTP header names (re-exported from `http` crate)

mod body;
mod envelope;
mod error;
#[cfg(any(test, feature = "fakes"))]
pub mod fakes;
mod method;
mod multipart;
mod options;
mod params;
pub mod prelude;
mod query;
mod request;
mod response;
mod sniff;
mod transport;

pub use body::{ContentType, from_json, to_json};
pub use envelope::{
    Collection, CreateResponse, Global, ListResponse, UpdateResponse, decode_error_body,
};
pub use error::{ApiError, ApiErrors, Error, Result};
pub use method::Method;
pub use multipart::{Form, Part};
pub use options::RequestOption;
pub use params::ListParams;
pub use query::{Operator, QueryBuilder};
pub use request::{Request, RequestBuilder};
pub use response::{Decoded, Response};
pub use sniff::{SNIFF_LEN, Sniffed, sniff};
pub use transport::{Body, RawResponse, Transport};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
