//! Typed async client for the Payload CMS REST API.
//!
//! Collections, globals and media uploads over one request pipeline, with a
//! `where` query builder that encodes Payload's bracketed filter grammar.
//!
//! # Example
//!
//! ```ignore
//! use payloadcms::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! struct Post {
//!     id: u64,
//!     title: String,
//! }
//!
//! let client = Client::builder()
//!     .base_url("https://cms.example.com")
//!     .api_key("my-api-key")
//!     .build()?;
//!
//! let params = ListParams::new()
//!     .filter(QueryBuilder::new().equals("status", "published"))
//!     .sort("-createdAt")
//!     .limit(10);
//!
//! let page = client
//!     .collections()
//!     .list::<ListResponse<Post>>("posts", &params, &[])
//!     .await?;
//! for post in &page.value.docs {
//!     println!("{}", post.title);
//! }
//! ```

mod client;
mod collections;
mod config;
mod connector;
mod globals;
mod media;
mod path;
pub mod prelude;
mod transport;

pub use client::{Client, ClientBuilder, MAX_REDIRECTS};
pub use collections::Collections;
pub use config::{TransportConfig, TransportConfigBuilder};
pub use globals::Globals;
pub use media::{DEFAULT_MEDIA_COLLECTION, Media, MediaOptions};
pub use transport::HyperTransport;

// Re-export core types
pub use payloadcms_core::{
    ApiError, ApiErrors, Body, Collection, ContentType, CreateResponse, Decoded, Error, Form,
    Global, ListParams, ListResponse, Method, Operator, Part, RawResponse, QueryBuilder, Request,
    RequestBuilder, RequestOption, Response, Result, SNIFF_LEN, Sniffed, Transport,
    UpdateResponse, decode_error_body, from_json, sniff, to_json,
};

// Re-export http types for status codes and headers
pub use payloadcms_core::{StatusCode, header};

#[cfg(feature = "fakes")]
pub use payloadcms_core::fakes;
