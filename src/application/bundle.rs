//! Key → file lookup over a content bundle.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::error::RenderError;
use crate::domain::entities::FileRecord;

/// Storage of static files, templates and custom error pages.
///
/// A missing key is `Ok(None)`, never an error. Failures are reserved for
/// faults such as unreadable storage.
#[async_trait]
pub trait BundleRetrieval: Send + Sync {
    async fn retrieve_file(&self, key: &str) -> Result<Option<FileRecord>, RenderError>;
}

#[async_trait]
impl<T> BundleRetrieval for Arc<T>
where
    T: BundleRetrieval + ?Sized,
{
    async fn retrieve_file(&self, key: &str) -> Result<Option<FileRecord>, RenderError> {
        (**self).retrieve_file(key).await
    }
}
