use async_trait::async_trait;
use tracing::debug;

use crate::application::{bundle::BundleRetrieval, error::RenderError};
use crate::domain::entities::{
    FileRecord, RenderContext, RenderData, RenderedBody, RenderedResult,
};

use super::{HTML_CONTENT_TYPE, Renderer};

/// Serves an HTML template as-is, streaming it without buffering.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

#[async_trait]
impl Renderer for HtmlRenderer {
    async fn render(
        &self,
        template: FileRecord,
        _data: RenderData,
        _context: RenderContext,
        _bundle: &dyn BundleRetrieval,
    ) -> Result<RenderedResult, RenderError> {
        debug!(template = template.key(), "streaming html template");
        Ok(RenderedResult::ok(
            RenderedBody::Stream(template.stream),
            HTML_CONTENT_TYPE,
        ))
    }
}
