//! Content-type keyed renderer dispatch.
//!
//! Every template in the bundle declares a content type; the [`RendererMap`]
//! decides which [`Renderer`] turns it into a page. The map is an explicit table
//! built at startup; nothing is looked up by name at request time.

mod html;
mod markdown;

use std::{collections::BTreeMap, fmt, sync::Arc};

use async_trait::async_trait;

use crate::application::{bundle::BundleRetrieval, error::RenderError};
use crate::domain::entities::{FileRecord, RenderContext, RenderData, RenderedResult};

pub use html::HtmlRenderer;
pub use markdown::MarkdownRenderer;

pub const HTML_CONTENT_TYPE: &str = "text/html";
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

/// Turns a template plus CMS inputs into a rendered result.
///
/// Renderers receive the bundle so they can pull auxiliary entries themselves.
/// Raising [`RenderError::Http`] lets the resolver substitute an error page.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        template: FileRecord,
        data: RenderData,
        context: RenderContext,
        bundle: &dyn BundleRetrieval,
    ) -> Result<RenderedResult, RenderError>;
}

#[derive(Clone, Default)]
pub struct RendererMap {
    renderers: BTreeMap<String, Arc<dyn Renderer>>,
}

impl RendererMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with the renderers shipped in this crate.
    pub fn with_builtin() -> Self {
        let mut map = Self::new();
        map.register(HTML_CONTENT_TYPE, HtmlRenderer);
        map.register(MARKDOWN_CONTENT_TYPE, MarkdownRenderer::new());
        map
    }

    /// Register `renderer` for `content_type`, replacing any previous entry.
    pub fn register(&mut self, content_type: &str, renderer: impl Renderer + 'static) -> &mut Self {
        self.renderers
            .insert(normalize_content_type(content_type), Arc::new(renderer));
        self
    }

    pub fn get(&self, content_type: &str) -> Option<Arc<dyn Renderer>> {
        self.renderers
            .get(&normalize_content_type(content_type))
            .cloned()
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }
}

impl fmt::Debug for RendererMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.renderers.keys()).finish()
    }
}

/// Drop media type parameters and case differences: `Text/HTML; charset=utf-8` → `text/html`.
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_map_covers_html_and_markdown() {
        let map = RendererMap::with_builtin();
        let types: Vec<_> = map.content_types().collect();
        assert_eq!(types, vec!["text/html", "text/markdown"]);
    }

    #[test]
    fn lookup_ignores_parameters_and_case() {
        let map = RendererMap::with_builtin();
        assert!(map.get("Text/HTML; charset=utf-8").is_some());
        assert!(map.get("text/markdown").is_some());
        assert!(map.get("application/json").is_none());
        assert!(map.get("").is_none());
    }

    #[test]
    fn register_replaces_existing_entry() {
        let mut map = RendererMap::new();
        map.register("text/html", HtmlRenderer)
            .register("TEXT/HTML", HtmlRenderer);
        assert_eq!(map.content_types().count(), 1);
    }
}
