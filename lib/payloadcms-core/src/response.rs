//! The response envelope returned by every call.
//!
//! A [`Response`] keeps the raw body bytes next to the status and headers.
//! When the API answered with an error list, [`Response::errors`] holds the
//! decoded records; on success it is empty.
//!
//! # Example
//!
//! ```ignore
//! let response = client.get("/api/posts/1").await?;
//! let post: Post = response.json()?;
//! ```

use bytes::Bytes;
use http::HeaderMap;

use crate::ApiErrors;

/// HTTP response with status, headers, raw content and API errors.
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    content: Bytes,
    errors: ApiErrors,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, content: Bytes) -> Self {
        Self {
            status,
            headers,
            content,
            errors: ApiErrors::default(),
        }
    }

    /// Attach decoded API errors.
    #[must_use]
    pub fn with_errors(mut self, errors: ApiErrors) -> Self {
        self.errors = errors;
        self
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Status code followed by its canonical reason, e.g. `404 Not Found`.
    #[must_use]
    pub fn status_line(&self) -> String {
        let reason = http::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|code| code.canonical_reason());
        match reason {
            Some(reason) => format!("{} {reason}", self.status),
            None => self.status.to_string(),
        }
    }

    /// Response headers. Repeated headers keep every value.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Every value of a repeated header such as `set-cookie`, in order.
    pub fn header_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .get_all(name)
            .into_iter()
            .filter_map(|value| value.to_str().ok())
    }

    /// Raw body bytes, exactly as received.
    #[must_use]
    pub const fn content(&self) -> &Bytes {
        &self.content
    }

    /// Consume into the raw body.
    #[must_use]
    pub fn into_content(self) -> Bytes {
        self.content
    }

    /// Errors reported by the API. Empty on success.
    #[must_use]
    pub const fn errors(&self) -> &ApiErrors {
        &self.errors
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        crate::from_json(&self.content)
    }

    /// Get the body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.content.to_vec())
    }
}

/// A decoded success value together with the response it came from.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    /// The decoded body.
    pub value: T,
    /// The response envelope.
    pub response: Response,
}

impl<T> Decoded<T> {
    /// Consume into the decoded value.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }

    /// Transform the decoded value, keeping the response.
    pub fn map<U, F>(self, f: F) -> Decoded<U>
    where
        F: FnOnce(T) -> U,
    {
        Decoded {
            value: f(self.value),
            response: self.response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;

    #[test]
    fn status_line_has_reason() {
        let response = Response::new(405, HeaderMap::new(), Bytes::new());
        assert_eq!(response.status_line(), "405 Method Not Allowed");

        let response = Response::new(599, HeaderMap::new(), Bytes::new());
        assert_eq!(response.status_line(), "599");
    }

    #[test]
    fn success_range() {
        assert!(Response::new(200, HeaderMap::new(), Bytes::new()).is_success());
        assert!(Response::new(299, HeaderMap::new(), Bytes::new()).is_success());
        assert!(!Response::new(300, HeaderMap::new(), Bytes::new()).is_success());
        assert!(!Response::new(199, HeaderMap::new(), Bytes::new()).is_success());
    }

    #[test]
    fn json_borrows_content() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Resource {
            id: u64,
            name: String,
        }

        let body = Bytes::from_static(br#"{"id": 1, "name": "John Doe"}"#);
        let response = Response::new(200, HeaderMap::new(), body.clone());

        let resource: Resource = response.json().expect("deserialize");
        assert_eq!(
            resource,
            Resource {
                id: 1,
                name: "John Doe".to_string()
            }
        );
        assert_eq!(response.content(), &body);
    }

    #[test]
    fn errors_default_to_empty() {
        let response = Response::new(200, HeaderMap::new(), Bytes::new());
        assert!(response.errors().is_empty());

        let response = response.with_errors(ApiErrors(vec![ApiError::new("nope")]));
        assert_eq!(response.errors().to_string(), "nope");
    }

    #[test]
    fn repeated_headers_keep_every_value() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", "a=1".parse().expect("value"));
        headers.append("set-cookie", "b=2".parse().expect("value"));
        headers.insert("content-type", "application/json".parse().expect("value"));
        let response = Response::new(200, headers, Bytes::new());

        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("set-cookie"), Some("a=1"));
        assert_eq!(
            response.header_all("set-cookie").collect::<Vec<_>>(),
            vec!["a=1", "b=2"]
        );
        assert_eq!(response.header_all("x-missing").count(), 0);
    }

    #[test]
    fn decoded_map_keeps_response() {
        let decoded = Decoded {
            value: 21,
            response: Response::new(201, HeaderMap::new(), Bytes::from("21")),
        };
        let doubled = decoded.map(|v| v * 2);
        assert_eq!(doubled.value, 42);
        assert_eq!(doubled.response.status(), 201);
    }
}
