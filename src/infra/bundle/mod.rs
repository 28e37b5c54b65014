//! Bundle storage backends.

mod directory;
mod memory;

use thiserror::Error;

use crate::application::error::RenderError;

pub use directory::DirectoryBundle;
pub use memory::MemoryBundle;

pub(crate) const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("bundle root `{path}` is not a directory")]
    InvalidRoot { path: String },
    #[error("failed to read bundle entry `{key}`")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<BundleError> for RenderError {
    fn from(error: BundleError) -> Self {
        RenderError::fatal("bundle retrieval", error)
    }
}
