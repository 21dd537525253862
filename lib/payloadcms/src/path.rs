//! API path construction.

use std::fmt::Display;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

// Unreserved characters and sub-delims pass through.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%');

fn segment(value: impl Display) -> String {
    utf8_percent_encode(&value.to_string(), PATH_SEGMENT).to_string()
}

/// `/api/{collection}`
pub(crate) fn collection(collection: &str) -> String {
    format!("/api/{}", segment(collection))
}

/// `/api/{collection}/{id}`
pub(crate) fn document(collection: &str, id: impl Display) -> String {
    format!("/api/{}/{}", segment(collection), segment(id))
}

/// `/api/{collection}/slug/{slug}`
pub(crate) fn slug(collection: &str, slug: &str) -> String {
    format!("/api/{}/slug/{}", segment(collection), segment(slug))
}

/// `/api/globals/{global}`
pub(crate) fn global(global: &str) -> String {
    format!("/api/globals/{}", segment(global))
}
