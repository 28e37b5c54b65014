//! Bundle backed by a directory tree on the local filesystem.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_stream::stream;
use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use tokio::{fs, io::AsyncReadExt};
use tracing::{debug, warn};

use crate::application::{bundle::BundleRetrieval, error::RenderError};
use crate::domain::entities::{ByteStream, FileMetadata, FileRecord};

use super::{BundleError, FALLBACK_CONTENT_TYPE};

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Serves bundle keys as paths relative to `root`.
///
/// Files are streamed in chunks; nothing is buffered whole.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
    content_types: HashMap<String, String>,
    chunk_size: usize,
}

impl DirectoryBundle {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, BundleError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(BundleError::InvalidRoot {
                path: root.display().to_string(),
            });
        }

        Ok(Self {
            root,
            content_types: HashMap::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    /// Extension → content type entries consulted before guessing from the extension.
    pub fn with_content_types<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (extension, content_type) in entries {
            let extension = extension
                .as_ref()
                .trim_start_matches('.')
                .to_ascii_lowercase();
            self.content_types.insert(extension, content_type.into());
        }
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key);
        if key.contains('\0')
            || relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
        {
            return None;
        }

        Some(self.root.join(relative))
    }

    fn content_type_for(&self, key: &str) -> String {
        let extension = Path::new(key)
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);

        if let Some(content_type) = extension
            .as_deref()
            .and_then(|extension| self.content_types.get(extension))
        {
            return content_type.clone();
        }

        mime_guess::from_path(key)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
    }
}

#[async_trait]
impl BundleRetrieval for DirectoryBundle {
    async fn retrieve_file(&self, key: &str) -> Result<Option<FileRecord>, RenderError> {
        let Some(path) = self.resolve(key) else {
            // Traversal attempts and unrepresentable keys are treated like any other missing entry.
            warn!(key, "rejected bundle key that does not name a file under the root");
            return Ok(None);
        };

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(err) if is_absent(&err) => return Ok(None),
            Err(source) => {
                return Err(BundleError::Io {
                    key: key.to_string(),
                    source,
                }
                .into());
            }
        };

        if !metadata.is_file() {
            return Ok(None);
        }

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(err) if is_absent(&err) => return Ok(None),
            Err(source) => {
                return Err(BundleError::Io {
                    key: key.to_string(),
                    source,
                }
                .into());
            }
        };

        let content_type = self.content_type_for(key);
        debug!(key, content_type = %content_type, size = metadata.len(), "bundle entry found");

        Ok(Some(FileRecord::new(
            file_stream(file, self.chunk_size),
            FileMetadata {
                key: key.to_string(),
                content_type,
                size: Some(metadata.len()),
            },
        )))
    }
}

fn is_absent(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

fn file_stream(mut file: fs::File, chunk_size: usize) -> ByteStream {
    stream! {
        loop {
            let mut buffer = BytesMut::with_capacity(chunk_size);
            match file.read_buf(&mut buffer).await {
                Ok(0) => break,
                Ok(_) => yield Ok(buffer.freeze()),
                Err(err) => {
                    yield Err(err);
                    break;
                }
            }
        }
    }
    .boxed()
}
