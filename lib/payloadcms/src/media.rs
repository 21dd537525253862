//! Media uploads: `POST /api/{collection}` as `multipart/form-data`.
//!
//! The form carries the content under `file` and the JSON metadata under
//! `_payload`. The file's content type and extension are detected from its
//! bytes; a caller only ever supplies the base name.

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::{
    Client, Decoded, Error, Form, Method, Part, Request, Response, Result, Transport, path, sniff,
    to_json,
};

/// Collection uploads go to when [`MediaOptions::collection`] is not set.
pub const DEFAULT_MEDIA_COLLECTION: &str = "media";

/// Options for an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaOptions {
    /// Target upload collection, `media` when unset.
    pub collection: Option<String>,
    /// Filename without extension. The extension is appended from the
    /// detected content type.
    pub file_name: Option<String>,
}

impl MediaOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload to `collection` instead of `media`.
    #[must_use]
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Set the base filename.
    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    fn collection_or_default(&self) -> &str {
        self.collection
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_MEDIA_COLLECTION)
    }

    fn file_name_or_none(&self) -> Option<&str> {
        self.file_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Upload operations. Obtained from [`Client::media`].
#[derive(Debug)]
pub struct Media<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T> Media<'a, T> {
    pub(crate) const fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }
}

impl<T: Transport> Media<'_, T> {
    /// Upload the content of `source` with `metadata`.
    ///
    /// `options.file_name` is required and must not carry an extension.
    /// The whole source is read before anything is sent.
    ///
    /// # Errors
    ///
    /// - [`Error::FileRequired`] when `source` is `None`; nothing is sent.
    /// - [`Error::Serialization`] when `metadata` cannot be encoded.
    /// - [`Error::Io`] when reading `source` fails.
    /// - [`Error::MissingFilename`] / [`Error::FilenameHasExtension`] for a
    ///   missing or invalid filename.
    /// - Any pipeline error from the upload request itself.
    pub async fn upload<R, M>(
        &self,
        source: Option<R>,
        metadata: &M,
        options: &MediaOptions,
    ) -> Result<Response>
    where
        R: AsyncRead + Unpin + Send,
        M: Serialize + ?Sized,
    {
        let request = self.upload_request(source, metadata, options).await?;
        self.client.execute_request(request).await
    }

    /// [`Media::upload`], decoding the created document into `D`.
    ///
    /// Decode into [`crate::CreateResponse`] to get `doc` and `message`.
    ///
    /// # Errors
    ///
    /// Same as [`Media::upload`], plus [`Error::Decode`] when the body does
    /// not match `D`.
    pub async fn upload_json<D, R, M>(
        &self,
        source: Option<R>,
        metadata: &M,
        options: &MediaOptions,
    ) -> Result<Decoded<D>>
    where
        D: DeserializeOwned,
        R: AsyncRead + Unpin + Send,
        M: Serialize + ?Sized,
    {
        let request = self.upload_request(source, metadata, options).await?;
        self.client.execute_request_json(request).await
    }

    async fn upload_request<R, M>(
        &self,
        source: Option<R>,
        metadata: &M,
        options: &MediaOptions,
    ) -> Result<Request>
    where
        R: AsyncRead + Unpin + Send,
        M: Serialize + ?Sized,
    {
        let mut source = source.ok_or(Error::FileRequired)?;
        let payload = to_json(metadata)?;

        let mut content = Vec::new();
        source.read_to_end(&mut content).await?;

        let form = stage(Bytes::from(content), payload, options.file_name_or_none())?;
        let collection = options.collection_or_default();
        let (content_type, body) = form.into_body();

        self.client.new_form_request(
            Method::Post,
            &path::collection(collection),
            body,
            &content_type,
        )
    }

    /// Upload a local file. Without a filename override, the file stem is
    /// used as the base name.
    ///
    /// # Errors
    ///
    /// Same as [`Media::upload`], plus [`Error::Io`] if the file cannot be
    /// opened.
    pub async fn upload_file<M: Serialize + ?Sized>(
        &self,
        file: impl AsRef<Path>,
        metadata: &M,
        options: &MediaOptions,
    ) -> Result<Response> {
        let file = file.as_ref();
        let mut options = options.clone();
        if options.file_name_or_none().is_none() {
            options.file_name = file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }

        let source = tokio::fs::File::open(file).await?;
        self.upload(Some(source), metadata, &options).await
    }

    /// Download `file_url` and upload its content.
    ///
    /// Without a filename override, the base name comes from the last URL
    /// path segment, which must contain a `.`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] when `file_url` does not parse.
    /// - [`Error::Download`] when the download is not `200 OK` once
    ///   redirects are followed.
    /// - [`Error::TooManyRedirects`] past [`crate::MAX_REDIRECTS`] hops.
    /// - [`Error::FilenameNotInUrl`] when no filename can be derived.
    /// - Any error from [`Media::upload`].
    pub async fn upload_from_url<M: Serialize + ?Sized>(
        &self,
        file_url: &str,
        metadata: &M,
        options: &MediaOptions,
    ) -> Result<Response> {
        let parsed = url::Url::parse(file_url)?;
        let content = self.client.download(parsed.clone()).await?;

        let mut options = options.clone();
        if options.file_name_or_none().is_none() {
            let name = file_name_from_url(&parsed)
                .ok_or_else(|| Error::FilenameNotInUrl(file_url.to_string()))?;
            options.file_name = Some(strip_extension(name).to_string());
        }

        let content: &[u8] = &content;
        self.upload(Some(content), metadata, &options).await
    }
}

/// Build the two-part upload form.
fn stage(content: Bytes, payload: Bytes, file_name: Option<&str>) -> Result<Form> {
    let sniffed = sniff(&content);

    let base = file_name.ok_or(Error::MissingFilename)?;
    let ext = extension(base);
    if !ext.is_empty() {
        return Err(Error::FilenameHasExtension(ext.to_string()));
    }

    let file_name = format!("{base}{}", sniffed.extension);
    debug!(file_name = %file_name, mime = sniffed.mime, size = content.len(), "staging upload");

    Ok(Form::new()
        .part(Part::file("file", file_name, sniffed.mime, content))
        .part(Part::field("_payload", payload)))
}

/// The extension of the last path element, dot included, or `""`.
fn extension(name: &str) -> &str {
    let base = name.rsplit('/').next().unwrap_or(name);
    base.rfind('.')
        .and_then(|idx| base.get(idx..))
        .unwrap_or("")
}

fn strip_extension(name: &str) -> &str {
    name.strip_suffix(extension(name)).unwrap_or(name)
}

/// Last path segment of `url` if it contains a `.`.
fn file_name_from_url(url: &url::Url) -> Option<&str> {
    url.path_segments()?
        .next_back()
        .filter(|segment| segment.contains('.'))
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use payloadcms_core::fakes::FakeTransport;

    use super::*;

    fn client(transport: FakeTransport) -> Client<FakeTransport> {
        Client::builder()
            .base_url("https://cms.example.com")
            .build_with_transport(transport)
            .expect("client")
    }

    #[test]
    fn extension_of_name() {
        check!(extension("photo") == "");
        check!(extension("photo.png") == ".png");
        check!(extension("archive.tar.gz") == ".gz");
        check!(extension("dir.v2/photo") == "");
        check!(strip_extension("photo.png") == "photo");
        check!(strip_extension("photo") == "photo");
    }

    #[test]
    fn name_from_url() {
        let url = url::Url::parse("https://cdn.example.com/images/logo.png?size=2").expect("url");
        check!(file_name_from_url(&url) == Some("logo.png"));

        let url = url::Url::parse("https://cdn.example.com/images/logo").expect("url");
        check!(file_name_from_url(&url).is_none());
    }

    #[test]
    fn stage_sniffs_and_appends_extension() {
        let form = stage(
            Bytes::from_static(b"This is a test file content"),
            Bytes::from_static(b"{}"),
            Some("notes"),
        )
        .expect("form");

        let_assert!([file, payload] = form.parts());
        check!(file.name() == "file");
        check!(file.filename() == Some("notes.txt"));
        check!(file.content_type() == Some("text/plain; charset=utf-8"));
        check!(payload.name() == "_payload");
        check!(payload.content_type().is_none());
    }

    #[test]
    fn stage_rejects_bad_names() {
        let_assert!(
            Err(Error::MissingFilename) =
                stage(Bytes::from_static(b"x"), Bytes::from_static(b"{}"), None)
        );
        let_assert!(
            Err(Error::FilenameHasExtension(ext)) =
                stage(Bytes::from_static(b"x"), Bytes::from_static(b"{}"), Some("file.txt"))
        );
        check!(ext == ".txt");
    }

    #[tokio::test]
    async fn missing_source_sends_nothing() {
        let transport = FakeTransport::new();
        let client = client(transport.clone());

        let result = client
            .media()
            .upload(None::<&[u8]>, &serde_json::json!({"alt": "x"}), &MediaOptions::new())
            .await;

        let_assert!(Err(Error::FileRequired) = result);
        check!(transport.request_count() == 0);
    }

    #[tokio::test]
    async fn filename_with_extension_sends_nothing() {
        let transport = FakeTransport::new();
        let client = client(transport.clone());

        let result = client
            .media()
            .upload(
                Some(b"hello".as_slice()),
                &serde_json::json!({}),
                &MediaOptions::new().file_name("file.txt"),
            )
            .await;

        let_assert!(Err(err) = result);
        check!(err.to_string() == "filename should not include extension, got: .txt");
        check!(transport.request_count() == 0);
    }

    #[tokio::test]
    async fn download_failure_stops_upload() {
        let transport = FakeTransport::new().reply(404, "");
        let client = client(transport.clone());

        let result = client
            .media()
            .upload_from_url(
                "https://cdn.example.com/a.png",
                &serde_json::json!({}),
                &MediaOptions::new(),
            )
            .await;

        let_assert!(Err(Error::Download(404)) = result);
        check!(transport.request_count() == 1);
    }

    #[tokio::test]
    async fn url_without_filename_is_rejected() {
        let transport = FakeTransport::new().reply(200, "content");
        let client = client(transport);

        let result = client
            .media()
            .upload_from_url(
                "https://cdn.example.com/download",
                &serde_json::json!({}),
                &MediaOptions::new(),
            )
            .await;

        let_assert!(Err(Error::FilenameNotInUrl(url)) = result);
        check!(url == "https://cdn.example.com/download");
    }

    #[tokio::test]
    async fn download_follows_relative_redirects() {
        let transport = FakeTransport::new()
            .redirect(301, "/v2/logo.png")
            .redirect(307, "final/logo.png")
            .reply(200, "hello")
            .reply(201, r#"{"doc":{"id":"m1"}}"#);
        let client = client(transport.clone());

        let response = client
            .media()
            .upload_from_url(
                "https://cdn.example.com/v1/logo.png",
                &serde_json::json!({}),
                &MediaOptions::new(),
            )
            .await
            .expect("upload");
        check!(response.status() == 201);

        let urls: Vec<_> = transport
            .requests()
            .iter()
            .map(|request| request.url().to_string())
            .collect();
        check!(
            urls == [
                "https://cdn.example.com/v1/logo.png",
                "https://cdn.example.com/v2/logo.png",
                "https://cdn.example.com/v2/final/logo.png",
                "https://cms.example.com/api/media",
            ]
        );
    }

    #[tokio::test]
    async fn redirect_loop_is_bounded() {
        let transport = (0..=crate::MAX_REDIRECTS)
            .fold(FakeTransport::new(), |fake, _| fake.redirect(302, "/again.png"));
        let client = client(transport.clone());

        let result = client
            .media()
            .upload_from_url(
                "https://cdn.example.com/again.png",
                &serde_json::json!({}),
                &MediaOptions::new(),
            )
            .await;

        let_assert!(Err(Error::TooManyRedirects { count, max }) = result);
        check!(count == 10);
        check!(max == 10);
        check!(transport.request_count() == 11);
    }

    #[tokio::test]
    async fn redirect_without_location_is_a_download_error() {
        let transport = FakeTransport::new().reply(302, "");
        let client = client(transport);

        let result = client
            .media()
            .upload_from_url(
                "https://cdn.example.com/a.png",
                &serde_json::json!({}),
                &MediaOptions::new(),
            )
            .await;

        let_assert!(Err(Error::Download(302)) = result);
    }

    #[tokio::test]
    async fn upload_json_decodes_created_document() {
        let transport = FakeTransport::new()
            .reply(201, r#"{"doc":{"id":"m1","filename":"notes.txt"},"message":"ok"}"#);
        let client = client(transport.clone());

        let created = client
            .media()
            .upload_json::<crate::CreateResponse<serde_json::Value>, _, _>(
                Some(b"plain notes".as_slice()),
                &serde_json::json!({"alt": "notes"}),
                &MediaOptions::new().file_name("notes"),
            )
            .await
            .expect("upload");

        check!(created.response.status() == 201);
        check!(created.value.doc["filename"] == "notes.txt");
        let_assert!(Some(request) = transport.last_request());
        check!(request.url().path() == "/api/media");
    }

    #[tokio::test]
    async fn upload_json_keeps_response_on_shape_mismatch() {
        let transport = FakeTransport::new().reply(201, r#"{"doc":{},"message":5}"#);
        let client = client(transport);

        let result = client
            .media()
            .upload_json::<crate::CreateResponse<serde_json::Value>, _, _>(
                Some(b"plain notes".as_slice()),
                &serde_json::json!({}),
                &MediaOptions::new().file_name("notes"),
            )
            .await;

        let_assert!(Err(err) = result);
        let_assert!(Error::Decode { .. } = &err);
        let_assert!(Some(response) = err.response());
        check!(response.content().as_ref() == br#"{"doc":{},"message":5}"#);
    }
}
