use std::collections::HashSet;
use std::path::Path;

use ammonia::Builder as AmmoniaBuilder;
use async_trait::async_trait;
use comrak::{markdown_to_html, options::Options};
use serde_json::Value;
use tracing::debug;

use crate::application::{bundle::BundleRetrieval, error::RenderError};
use crate::domain::entities::{FileRecord, RenderContext, RenderData, RenderedResult};
use crate::presentation::views::{PageTemplate, PageView, render_template};

use super::{HTML_CONTENT_TYPE, Renderer};

const SOURCE: &str = "application::render::MarkdownRenderer";
const DEFAULT_LANG: &str = "en";

/// Comrak-based markdown renderer with Ammonia sanitisation.
///
/// The sanitised fragment is wrapped in the built-in page layout. The page title
/// comes from `data.title`, the document language from `context.lang` and the
/// site name from `context.site_name`.
pub struct MarkdownRenderer {
    options: Options<'static>,
    sanitizer: AmmoniaBuilder<'static>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            options: default_options(),
            sanitizer: build_sanitizer(),
        }
    }

    pub fn render_fragment(&self, markdown: &str) -> String {
        let html = markdown_to_html(markdown, &self.options);
        self.sanitizer.clean(&html).to_string()
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Renderer for MarkdownRenderer {
    async fn render(
        &self,
        template: FileRecord,
        data: RenderData,
        context: RenderContext,
        _bundle: &dyn BundleRetrieval,
    ) -> Result<RenderedResult, RenderError> {
        let key = template.key().to_string();
        let markdown = template.into_text().await?;
        debug!(template = %key, bytes = markdown.len(), "rendering markdown template");

        let view = PageView {
            lang: string_field(&context, "lang").unwrap_or_else(|| DEFAULT_LANG.to_string()),
            title: string_field(&data, "title").unwrap_or_else(|| fallback_title(&key)),
            site_name: string_field(&context, "site_name"),
            content_html: self.render_fragment(&markdown),
        };

        let page =
            render_template(PageTemplate { view }).map_err(|err| RenderError::fatal(SOURCE, err))?;
        Ok(RenderedResult::ok(page, HTML_CONTENT_TYPE))
    }
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn fallback_title(key: &str) -> String {
    Path::new(key)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(key)
        .to_string()
}

fn default_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.tagfilter = false;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.superscript = true;
    ext.footnotes = true;
    ext.description_lists = true;
    ext.front_matter_delimiter = Some("---".to_string());

    let render = &mut options.render;
    render.github_pre_lang = true;
    render.tasklist_classes = true;
    render.r#unsafe = true;
    render.sourcepos = false;

    options
}

fn build_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "blockquote",
        "br",
        "code",
        "dd",
        "del",
        "div",
        "dl",
        "dt",
        "em",
        "figcaption",
        "figure",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "input",
        "kbd",
        "li",
        "ol",
        "p",
        "pre",
        "s",
        "section",
        "span",
        "strong",
        "sub",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from([
        "class",
        "id",
        "title",
        "lang",
        "dir",
        "aria-hidden",
        "aria-label",
        "role",
        "data-footnote-ref",
        "data-footnotes",
        "data-footnote-backref",
    ]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("img", &["title", "width", "height", "alt", "loading"]);
    builder.add_tag_attributes("code", &["data-language", "class"]);
    builder.add_tag_attributes("pre", &["class", "lang", "data-language"]);
    builder.add_tag_attributes("th", &["align", "colspan", "rowspan", "scope"]);
    builder.add_tag_attributes("td", &["align", "colspan", "rowspan"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled", "class"]);
    builder.add_url_schemes(["http", "https", "mailto", "tel"].iter().copied());

    builder
}
