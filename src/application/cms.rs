//! Path → content lookup against the CMS.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::error::RenderError;
use crate::domain::entities::ContentDescriptor;

/// Resolves a request path to the template and inputs that render it.
///
/// Implementations decide how "unknown path" is reported; raising
/// [`RenderError::Http`] turns it into an error page, anything else is fatal.
#[async_trait]
pub trait CmsConnection: Send + Sync {
    async fn content_for_path(&self, path: &str) -> Result<ContentDescriptor, RenderError>;
}

#[async_trait]
impl<T> CmsConnection for Arc<T>
where
    T: CmsConnection + ?Sized,
{
    async fn content_for_path(&self, path: &str) -> Result<ContentDescriptor, RenderError> {
        (**self).content_for_path(path).await
    }
}
