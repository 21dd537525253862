//! Typed success bodies returned by the collection endpoints, and the slug
//! newtypes that address collections and globals.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::ApiErrors;

/// A collection slug, e.g. `posts`. Routes mount under `/api/<slug>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection(Cow<'static, str>);

impl Collection {
    /// The built-in users collection.
    pub const USERS: Self = Self::from_static("users");

    /// Wrap a collection slug.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(Cow::Owned(slug.into()))
    }

    /// Wrap a slug known at compile time.
    #[must_use]
    pub const fn from_static(slug: &'static str) -> Self {
        Self(Cow::Borrowed(slug))
    }

    /// The slug.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Collection {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Collection {
    fn from(slug: &str) -> Self {
        Self::new(slug)
    }
}

impl From<String> for Collection {
    fn from(slug: String) -> Self {
        Self::new(slug)
    }
}

/// A global slug, e.g. `settings`. Globals mount under `/api/globals/<slug>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Global(String);

impl Global {
    /// Wrap a global slug.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// The slug.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Global {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Global {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Global {
    fn from(slug: &str) -> Self {
        Self::new(slug)
    }
}

impl From<String> for Global {
    fn from(slug: String) -> Self {
        Self(slug)
    }
}

/// A page of documents from `GET /api/<collection>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Documents on this page.
    pub docs: Vec<T>,
    /// Total as reported by older API versions.
    #[serde(default)]
    pub total: u64,
    /// Total number of matching documents.
    #[serde(rename = "totalDocs")]
    pub total_docs: u64,
    /// Page size.
    pub limit: u64,
    /// Number of pages.
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    /// Current page.
    pub page: u64,
    /// Index of the first document on this page, 1-based.
    #[serde(rename = "pagingCounter")]
    pub paging_counter: u64,
    /// A previous page exists.
    #[serde(rename = "hasPrevPage")]
    pub has_prev_page: bool,
    /// A next page exists.
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    /// Previous page number, `null` on the first page.
    #[serde(rename = "prevPage")]
    pub prev_page: Option<u64>,
    /// Next page number, `null` on the last page.
    #[serde(rename = "nextPage")]
    pub next_page: Option<u64>,
}

/// Body of a successful `POST /api/<collection>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateResponse<T> {
    /// The created document.
    pub doc: T,
    /// Confirmation message.
    #[serde(default)]
    pub message: String,
    /// Field level errors.
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

/// Body of a successful update.
///
/// The API reports field errors under `error` here, not `errors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse<T> {
    /// The updated document.
    pub doc: T,
    /// Confirmation message.
    #[serde(default)]
    pub message: String,
    /// Field level errors.
    #[serde(default, rename = "error")]
    pub errors: Vec<serde_json::Value>,
}

/// The `{"errors": [...]}` body of a failed call.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) errors: ApiErrors,
}

/// Decode a failure body into its error list.
///
/// # Errors
///
/// Returns the decoder message when `content` is not an error envelope.
pub fn decode_error_body(content: &[u8]) -> std::result::Result<ApiErrors, String> {
    serde_json::from_slice::<ErrorBody>(content)
        .map(|body| body.errors)
        .map_err(|e| e.to_string())
}
