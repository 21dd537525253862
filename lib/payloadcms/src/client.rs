//! The Payload client and its request pipeline.
//!
//! Every call goes through the same steps: build an authenticated request,
//! apply request options, dispatch through the [`Transport`], drain the body
//! and classify the response. Non-2xx responses become errors that still
//! carry the [`Response`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{
    ContentType, Decoded, Error, HyperTransport, Method, Request, RequestOption, Response, Result,
    Transport, TransportConfig, TransportConfigBuilder, collections::Collections,
    decode_error_body, globals::Globals, media::Media, to_json,
};

const EMPTY_OBJECT: &[u8] = b"{}";

/// Redirect hops followed when downloading a remote upload source.
pub const MAX_REDIRECTS: usize = 10;

struct Inner<T> {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    transport: T,
}

/// Client for the Payload REST API.
///
/// Cheap to clone; clones share the transport and its connection pool.
///
/// # Example
///
/// ```ignore
/// use payloadcms::Client;
///
/// let client = Client::builder()
///     .base_url("https://cms.example.com")
///     .api_key(std::env::var("PAYLOAD_API_KEY")?)
///     .build()?;
///
/// let post = client
///     .collections()
///     .find_by_id::<Post>("posts", 1, &[])
///     .await?;
/// ```
pub struct Client<T = HyperTransport> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("api_key", &self.inner.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }
}

impl<T: Transport> Client<T> {
    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The transport requests are dispatched through.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Per-call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Collection endpoints.
    #[must_use]
    pub const fn collections(&self) -> Collections<'_, T> {
        Collections::new(self)
    }

    /// Global endpoints.
    #[must_use]
    pub const fn globals(&self) -> Globals<'_, T> {
        Globals::new(self)
    }

    /// Media uploads.
    #[must_use]
    pub const fn media(&self) -> Media<'_, T> {
        Media::new(self)
    }

    // ========================================================================
    // Request construction
    // ========================================================================

    fn url(&self, path: &str) -> Result<url::Url> {
        let path = path.strip_prefix('/').unwrap_or(path);
        Ok(url::Url::parse(&format!("{}/{path}", self.inner.base_url))?)
    }

    /// Build an authenticated JSON request for `path` without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn new_request(&self, method: Method, path: &str, body: Option<Bytes>) -> Result<Request> {
        let mut builder = Request::builder(method, self.url(path)?)
            .header("Content-Type", ContentType::Json.as_str());
        if let Some(key) = &self.inner.api_key {
            builder = builder.header("Authorization", format!("users API-Key {key}"));
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        Ok(builder.build())
    }

    /// Like [`Client::new_request`], with `content_type` replacing the JSON
    /// content type. Used for multipart uploads.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn new_form_request(
        &self,
        method: Method,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<Request> {
        let mut request = self.new_request(method, path, Some(body))?;
        request
            .headers_mut()
            .insert("Content-Type".to_string(), content_type.to_string());
        Ok(request)
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Send `body` as JSON to `path` and return the raw response.
    ///
    /// A `None` body is sent as `{}`. Options are applied in order.
    ///
    /// # Errors
    ///
    /// Fails on serialization, URL, transport, timeout or read errors, and on
    /// any non-2xx status (see [`Error::NoBody`], [`Error::ErrorEnvelope`] and
    /// [`Error::Api`]).
    pub async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: &[RequestOption],
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let body = match body {
            Some(body) => to_json(body)?,
            None => Bytes::from_static(EMPTY_OBJECT),
        };

        let mut request = self.new_request(method, path, Some(body))?;
        for option in options {
            option.apply(&mut request);
        }
        self.execute_request(request).await
    }

    /// [`Client::execute`], then decode the 2xx body into `D`.
    ///
    /// # Errors
    ///
    /// As [`Client::execute`], plus [`Error::Decode`] when the body does not
    /// match `D`. The error still carries the response.
    pub async fn execute_json<D, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: &[RequestOption],
    ) -> Result<Decoded<D>>
    where
        D: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.execute(method, path, body, options).await?;
        decode(response)
    }

    /// Dispatch a pre-built request and classify the response.
    ///
    /// # Errors
    ///
    /// Same failures as [`Client::execute`], minus serialization.
    pub async fn execute_request(&self, request: Request) -> Result<Response> {
        let span = info_span!("cms_request", method = %request.method(), url = %request.url());

        async move {
            let start = Instant::now();
            debug!("dispatching request");

            let result = tokio::time::timeout(self.inner.timeout, self.dispatch(request))
                .await
                .unwrap_or_else(|_| Err(Error::Timeout));

            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            match &result {
                Ok(response) => info!(status = response.status(), elapsed_ms, "request completed"),
                Err(err) => warn!(status = err.status(), error = %err, elapsed_ms, "request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// [`Client::execute_request`], then decode the 2xx body into `D`.
    ///
    /// # Errors
    ///
    /// As [`Client::execute_request`], plus decode failures.
    pub async fn execute_request_json<D: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<Decoded<D>> {
        let response = self.execute_request(request).await?;
        decode(response)
    }

    async fn dispatch(&self, request: Request) -> Result<Response> {
        let raw = self.inner.transport.perform(request).await?;
        let (status, headers, content) = raw.collect().await?;
        classify(Response::new(status, headers, content))
    }

    /// Fetch `url` without authentication and return the body of a `200`.
    ///
    /// Redirects are followed up to [`MAX_REDIRECTS`] hops, each `Location`
    /// resolved against the URL that answered with it.
    pub(crate) async fn download(&self, url: url::Url) -> Result<Bytes> {
        let fetch = async {
            let mut current = url;
            let mut redirects = 0;
            loop {
                let request = Request::builder(Method::Get, current.clone()).build();
                let raw = self.inner.transport.perform(request).await?;

                if let Some(location) = raw.redirect_location() {
                    if redirects >= MAX_REDIRECTS {
                        return Err(Error::TooManyRedirects {
                            count: redirects,
                            max: MAX_REDIRECTS,
                        });
                    }
                    let next = current.join(location)?;
                    debug!(from = %current, to = %next, "following download redirect");
                    current = next;
                    redirects += 1;
                    continue;
                }

                if raw.status != 200 {
                    return Err(Error::Download(raw.status));
                }
                let (_, _, content) = raw.collect().await?;
                return Ok(content);
            }
        };

        tokio::time::timeout(self.inner.timeout, fetch)
            .await
            .unwrap_or_else(|_| Err(Error::Timeout))
    }

    // ========================================================================
    // Convenience verbs
    // ========================================================================

    /// `GET path`, decoding the body into `D`.
    ///
    /// # Errors
    ///
    /// See [`Client::execute_json`].
    pub async fn get<D: DeserializeOwned>(&self, path: &str) -> Result<Decoded<D>> {
        self.execute_json::<D, ()>(Method::Get, path, None, &[]).await
    }

    /// `POST path` with `body` as JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::execute`].
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.execute(Method::Post, path, Some(body), &[]).await
    }

    /// `PUT path` with `body` as JSON.
    ///
    /// # Errors
    ///
    /// See [`Client::execute`].
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.execute(Method::Put, path, Some(body), &[]).await
    }

    /// `DELETE path`, decoding the body into `D`.
    ///
    /// # Errors
    ///
    /// See [`Client::execute_json`].
    pub async fn delete<D: DeserializeOwned>(&self, path: &str) -> Result<Decoded<D>> {
        self.execute_json::<D, ()>(Method::Delete, path, None, &[]).await
    }
}

/// Turn a non-2xx response into the matching error.
fn classify(response: Response) -> Result<Response> {
    if response.is_success() {
        return Ok(response);
    }
    if response.content().is_empty() {
        return Err(Error::no_body(response));
    }
    match decode_error_body(response.content()) {
        Ok(errors) => Err(Error::api(response.with_errors(errors))),
        Err(message) => Err(Error::error_envelope(message, response)),
    }
}

fn decode<D: DeserializeOwned>(response: Response) -> Result<Decoded<D>> {
    match response.json() {
        Ok(value) => Ok(Decoded { value, response }),
        Err(err) => Err(err.with_response(response)),
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Client`]. The last call to each setter wins.
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    config: TransportConfigBuilder,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("config", &self.config)
            .finish()
    }
}

impl ClientBuilder {
    /// Set the base URL of the Payload instance, e.g. `https://cms.example.com`.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the API key sent as `Authorization: users API-Key <key>`.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the per-call timeout, covering dispatch and body read.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the connection timeout of the default transport.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Set the maximum idle connections per host of the default transport.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// Set the idle connection timeout of the default transport.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Build a client on the default hyper transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no base URL was set and
    /// [`Error::InvalidUrl`] when it does not parse.
    pub fn build(self) -> Result<Client> {
        let (base_url, api_key, config) = self.finish()?;
        let timeout = config.timeout;
        Ok(Client::from_parts(
            base_url,
            api_key,
            timeout,
            HyperTransport::new(config),
        ))
    }

    /// Build a client on a caller-supplied transport.
    ///
    /// Only the timeout applies; pool settings belong to the transport.
    ///
    /// # Errors
    ///
    /// Same as [`ClientBuilder::build`].
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<Client<T>> {
        let (base_url, api_key, config) = self.finish()?;
        Ok(Client::from_parts(base_url, api_key, config.timeout, transport))
    }

    fn finish(self) -> Result<(String, Option<String>, TransportConfig)> {
        let base_url = self
            .base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::config("base URL is required"))?;
        url::Url::parse(&base_url)?;

        Ok((base_url, self.api_key, self.config.build()))
    }
}

impl<T> Client<T> {
    fn from_parts(base_url: String, api_key: Option<String>, timeout: Duration, transport: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                base_url,
                api_key,
                timeout,
                transport,
            }),
        }
    }
}
