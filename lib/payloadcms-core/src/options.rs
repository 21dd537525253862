//! Per-request options applied to a built request before dispatch.

use crate::Request;

/// A mutation applied to a request after it is built.
///
/// Options run in the order given; a later option wins over an earlier one
/// only in the sense that its query pair comes last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOption {
    /// Append a query parameter.
    QueryParam(String, String),
    /// Append `depth=<n>`, controlling how many levels of relationships are
    /// populated in the response.
    Depth(u32),
}

impl RequestOption {
    /// Append `key=value` to the query string.
    #[must_use]
    pub fn query_param(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::QueryParam(key.into(), value.into())
    }

    /// Set the population depth.
    #[must_use]
    pub const fn depth(depth: u32) -> Self {
        Self::Depth(depth)
    }

    /// Apply the option to `request`.
    pub fn apply(&self, request: &mut Request) {
        match self {
            Self::QueryParam(key, value) => {
                request.url_mut().query_pairs_mut().append_pair(key, value);
            }
            Self::Depth(depth) => {
                request
                    .url_mut()
                    .query_pairs_mut()
                    .append_pair("depth", &depth.to_string());
            }
        }
    }
}
