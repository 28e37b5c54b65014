//! CMS connections.

mod manifest;
mod remote;

use thiserror::Error;

use crate::application::error::RenderError;

pub use manifest::ManifestCms;
pub use remote::RemoteCms;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("failed to read content manifest `{path}`")]
    ManifestIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),
    #[error("content manifest declares `{path}` more than once")]
    DuplicateRoute { path: String },
    #[error("invalid CMS endpoint `{url}`: {reason}")]
    Endpoint { url: String, reason: String },
    #[error("CMS request failed")]
    Transport(#[source] reqwest::Error),
    #[error("CMS answered with status {status}")]
    Status { status: u16 },
    #[error("CMS response could not be decoded")]
    Decode(#[source] reqwest::Error),
}

impl From<CmsError> for RenderError {
    fn from(error: CmsError) -> Self {
        RenderError::fatal("cms lookup", error)
    }
}

/// Canonical form of a request path used for CMS lookups: no leading or trailing `/`.
pub(crate) fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}
