//! In-memory bundle, used for embedding small bundles and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;

use crate::application::{bundle::BundleRetrieval, error::RenderError};
use crate::domain::entities::FileRecord;

#[derive(Debug, Clone)]
struct Entry {
    content_type: String,
    contents: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    entries: HashMap<String, Entry>,
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        content_type: impl Into<String>,
        contents: impl Into<Bytes>,
    ) -> &mut Self {
        self.entries.insert(
            key.into(),
            Entry {
                content_type: content_type.into(),
                contents: contents.into(),
            },
        );
        self
    }

    pub fn with_file(
        mut self,
        key: impl Into<String>,
        content_type: impl Into<String>,
        contents: impl Into<Bytes>,
    ) -> Self {
        self.insert(key, content_type, contents);
        self
    }
}

#[async_trait]
impl BundleRetrieval for MemoryBundle {
    async fn retrieve_file(&self, key: &str) -> Result<Option<FileRecord>, RenderError> {
        Ok(self.entries.get(key).map(|entry| {
            FileRecord::from_bytes(key, entry.content_type.clone(), entry.contents.clone())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn each_retrieval_gets_a_fresh_stream() {
        let bundle = MemoryBundle::new().with_file("404.html", "text/html", "<p>lost</p>");

        for _ in 0..2 {
            let file = bundle
                .retrieve_file("404.html")
                .await
                .expect("retrieve")
                .expect("present");
            assert_eq!(file.key(), "404.html");
            assert_eq!(file.into_bytes().await.expect("bytes"), "<p>lost</p>");
        }
        assert!(bundle.retrieve_file("500.html").await.expect("ok").is_none());
    }
}
