//! In-memory [`Transport`] for tests.
//!
//! Enabled with the `fakes` feature.
//!
//! ```
//! use payloadcms_core::fakes::FakeTransport;
//!
//! let transport = FakeTransport::new()
//!     .reply(200, r#"{"id":1}"#)
//!     .reply(404, "");
//! assert_eq!(transport.request_count(), 0);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use http::HeaderMap;

use crate::{Error, RawResponse, Request, Result, Transport};

enum Reply {
    Full {
        status: u16,
        headers: HeaderMap,
        body: Bytes,
    },
    BrokenBody {
        status: u16,
    },
    Refused(String),
}

#[derive(Default)]
struct State {
    replies: VecDeque<Reply>,
    requests: Vec<Request>,
}

/// Records every request and answers from a queue of canned replies.
///
/// Replies are consumed in order. Once the queue is empty every request gets
/// `200 OK` with an empty body. Clones share the same queue and log.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    /// A transport with no queued replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply with `status` and `body`.
    #[must_use]
    pub fn reply(self, status: u16, body: impl Into<Bytes>) -> Self {
        self.reply_with_headers(status, HeaderMap::new(), body)
    }

    /// Queue a reply with headers.
    #[must_use]
    pub fn reply_with_headers(
        self,
        status: u16,
        headers: HeaderMap,
        body: impl Into<Bytes>,
    ) -> Self {
        self.push(Reply::Full {
            status,
            headers,
            body: body.into(),
        });
        self
    }

    /// Queue a redirect to `location`.
    #[must_use]
    pub fn redirect(self, status: u16, location: &str) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = location.parse() {
            headers.insert(http::header::LOCATION, value);
        }
        self.reply_with_headers(status, headers, Bytes::new())
    }

    /// Queue a reply whose body stream fails on first read.
    #[must_use]
    pub fn reply_broken_body(self, status: u16) -> Self {
        self.push(Reply::BrokenBody { status });
        self
    }

    /// Queue a dispatch failure.
    #[must_use]
    pub fn refuse(self, message: impl Into<String>) -> Self {
        self.push(Reply::Refused(message.into()));
        self
    }

    /// Every request performed so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<Request> {
        self.lock().requests.last().cloned()
    }

    /// Number of requests performed.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn push(&self, reply: Reply) {
        self.lock().replies.push_back(reply);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FakeTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("FakeTransport")
            .field("queued", &state.replies.len())
            .field("requests", &state.requests.len())
            .finish()
    }
}

impl Transport for FakeTransport {
    async fn perform(&self, request: Request) -> Result<RawResponse> {
        let reply = {
            let mut state = self.lock();
            state.requests.push(request);
            state.replies.pop_front()
        };

        match reply {
            None => Ok(RawResponse::full(200, HeaderMap::new(), Bytes::new())),
            Some(Reply::Full {
                status,
                headers,
                body,
            }) => Ok(RawResponse::full(status, headers, body)),
            Some(Reply::BrokenBody { status }) => Ok(RawResponse {
                status,
                headers: HeaderMap::new(),
                body: Box::pin(futures_util::stream::once(async {
                    Err(Error::read("connection reset"))
                })),
            }),
            Some(Reply::Refused(message)) => Err(Error::connection(message)),
        }
    }
}
