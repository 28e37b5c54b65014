//! Values exchanged between the resolver and its collaborators.

use std::fmt;

use bytes::{Bytes, BytesMut};
use futures::{StreamExt, stream::BoxStream};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Lazily produced sequence of byte chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// Opaque CMS-supplied values handed through to renderers.
pub type RenderContext = serde_json::Value;
pub type RenderData = serde_json::Value;

/// Build a single-chunk stream over an in-memory payload.
pub fn byte_stream(bytes: impl Into<Bytes>) -> ByteStream {
    let bytes = bytes.into();
    futures::stream::once(async move { Ok(bytes) }).boxed()
}

async fn drain(mut stream: ByteStream) -> Result<Bytes, std::io::Error> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);
    }
    Ok(buffer.freeze())
}

/// Body of a rendered result.
///
/// Ownership moves to whoever receives the enclosing [`RenderedResult`]; nothing
/// upstream keeps a handle to the stream.
pub enum RenderedBody {
    Stream(ByteStream),
    Text(String),
    /// Neither a custom nor a default error page was available.
    Empty,
}

impl RenderedBody {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Stream(byte_stream(bytes))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Consume the body, draining the stream if there is one.
    pub async fn into_bytes(self) -> Result<Bytes, std::io::Error> {
        match self {
            Self::Stream(stream) => drain(stream).await,
            Self::Text(text) => Ok(Bytes::from(text)),
            Self::Empty => Ok(Bytes::new()),
        }
    }
}

impl fmt::Debug for RenderedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

impl From<String> for RenderedBody {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Option<String>> for RenderedBody {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Empty, Self::Text)
    }
}

/// Outcome of resolving one request path.
#[derive(Debug)]
pub struct RenderedResult {
    pub rendered: RenderedBody,
    pub http_content_type: String,
    /// `None` means success.
    pub http_status: Option<u16>,
}

impl RenderedResult {
    pub const DEFAULT_STATUS: u16 = 200;

    pub fn ok(rendered: impl Into<RenderedBody>, content_type: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
            http_content_type: content_type.into(),
            http_status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn status_or_default(&self) -> u16 {
        self.http_status.unwrap_or(Self::DEFAULT_STATUS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub key: String,
    pub content_type: String,
    pub size: Option<u64>,
}

/// A bundle entry handed out by a [`BundleRetrieval`](crate::application::bundle::BundleRetrieval).
pub struct FileRecord {
    pub stream: ByteStream,
    pub metadata: FileMetadata,
}

impl FileRecord {
    pub fn new(stream: ByteStream, metadata: FileMetadata) -> Self {
        Self { stream, metadata }
    }

    pub fn from_bytes(
        key: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        let metadata = FileMetadata {
            key: key.into(),
            content_type: content_type.into(),
            size: Some(bytes.len() as u64),
        };
        Self::new(byte_stream(bytes), metadata)
    }

    pub fn key(&self) -> &str {
        &self.metadata.key
    }

    pub fn content_type(&self) -> &str {
        &self.metadata.content_type
    }

    pub async fn into_bytes(self) -> Result<Bytes, DomainError> {
        let Self { stream, metadata } = self;
        drain(stream)
            .await
            .map_err(|err| DomainError::stream(metadata.key, err))
    }

    pub async fn into_text(self) -> Result<String, DomainError> {
        let key = self.metadata.key.clone();
        let bytes = self.into_bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DomainError::encoding(key))
    }
}

impl fmt::Debug for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRecord")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// What the CMS knows about a request path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescriptor {
    pub template_uid: String,
    #[serde(default)]
    pub render_context: RenderContext,
    #[serde(default)]
    pub render_data: RenderData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stream_body_drains_all_chunks() {
        let chunks = vec![Ok(Bytes::from_static(b"he")), Ok(Bytes::from_static(b"llo"))];
        let body = RenderedBody::Stream(futures::stream::iter(chunks).boxed());
        assert!(body.is_stream());
        assert_eq!(body.into_bytes().await.expect("drain"), "hello");
    }

    #[tokio::test]
    async fn empty_body_yields_no_bytes() {
        let body = RenderedBody::from(None::<String>);
        assert!(body.into_bytes().await.expect("drain").is_empty());
    }

    #[test]
    fn missing_status_defaults_to_ok() {
        let result = RenderedResult::ok("hi".to_string(), "text/plain");
        assert_eq!(result.status_or_default(), 200);
        assert_eq!(result.with_status(404).status_or_default(), 404);
    }

    #[tokio::test]
    async fn non_utf8_template_is_rejected() {
        let record = FileRecord::from_bytes("t", "text/markdown", vec![0xff, 0xfe]);
        let err = record.into_text().await.expect_err("invalid utf-8");
        assert!(matches!(err, DomainError::Encoding { key } if key == "t"));
    }

    #[tokio::test]
    async fn stream_error_carries_key() {
        let failing = futures::stream::once(async {
            Err(std::io::Error::other("disk gone"))
        })
        .boxed();
        let record = FileRecord::new(
            failing,
            FileMetadata {
                key: "broken".into(),
                content_type: "text/html".into(),
                size: None,
            },
        );
        let err = record.into_bytes().await.expect_err("stream failure");
        assert!(matches!(err, DomainError::Stream { key, .. } if key == "broken"));
    }

    #[test]
    fn descriptor_uses_camel_case_fields() {
        let descriptor: ContentDescriptor = serde_json::from_str(
            r#"{"templateUid":"pages/home.md","renderData":{"title":"Home"}}"#,
        )
        .expect("decode");
        assert_eq!(descriptor.template_uid, "pages/home.md");
        assert_eq!(descriptor.render_data["title"], "Home");
        assert!(descriptor.render_context.is_null());
    }
}
