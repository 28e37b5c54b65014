//! Path resolution: static file, then CMS template, then error page.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use crate::application::{
    bundle::BundleRetrieval,
    cms::CmsConnection,
    error::{HttpError, RenderError},
    render::RendererMap,
};
use crate::domain::entities::{RenderedBody, RenderedResult};
use crate::domain::keys::{error_page_key, static_file_key};

const SOURCE: &str = "application::resolver::Resolver";
const ERROR_PAGE_CONTENT_TYPE: &str = "text/html";

/// Turns a request path into a [`RenderedResult`].
///
/// Lookups run strictly in order and the first hit wins:
///
/// 1. `public/<path>` in the bundle, returned verbatim;
/// 2. the CMS descriptor for `path`;
/// 3. the descriptor's template in the bundle;
/// 4. the renderer registered for the template's content type;
/// 5. the renderer's output, returned unchanged.
///
/// HTTP-classed failures from steps 2-5 become an HTML error page: the bundle's
/// `<status>.html` if present, otherwise the error's default page. Every other
/// failure is returned to the caller as-is.
#[derive(Clone, Debug)]
pub struct Resolver {
    renderers: Arc<RendererMap>,
}

impl Resolver {
    pub fn new(renderers: Arc<RendererMap>) -> Self {
        Self { renderers }
    }

    pub fn renderers(&self) -> &RendererMap {
        &self.renderers
    }

    pub async fn render(
        &self,
        path: &str,
        bundle: &dyn BundleRetrieval,
        cms: &dyn CmsConnection,
    ) -> Result<RenderedResult, RenderError> {
        match self.resolve(path, bundle, cms).await {
            Ok(result) => Ok(result),
            Err(RenderError::Http(error)) => self.error_page(path, error, bundle).await,
            Err(error) => Err(error),
        }
    }

    async fn resolve(
        &self,
        path: &str,
        bundle: &dyn BundleRetrieval,
        cms: &dyn CmsConnection,
    ) -> Result<RenderedResult, RenderError> {
        if let Some(file) = bundle.retrieve_file(&static_file_key(path)).await? {
            debug!(path, content_type = file.content_type(), "serving static file");
            counter!("rendition_resolve_total", "outcome" => "static").increment(1);
            return Ok(RenderedResult::ok(
                RenderedBody::Stream(file.stream),
                file.metadata.content_type,
            ));
        }

        let descriptor = cms.content_for_path(path).await?;
        let template_uid = descriptor.template_uid;

        let Some(template) = bundle.retrieve_file(&template_uid).await? else {
            return Err(HttpError::not_found(
                SOURCE,
                format!("Template does not exist, template: {template_uid}"),
            )
            .into());
        };

        let Some(renderer) = self.renderers.get(template.content_type()) else {
            return Err(HttpError::not_found(
                SOURCE,
                format!("Renderer for template does not exist, template: {template_uid}"),
            )
            .into());
        };

        debug!(
            path,
            template = %template_uid,
            content_type = template.content_type(),
            "rendering template"
        );
        let result = renderer
            .render(
                template,
                descriptor.render_data,
                descriptor.render_context,
                bundle,
            )
            .await?;
        counter!("rendition_resolve_total", "outcome" => "rendered").increment(1);
        Ok(result)
    }

    async fn error_page(
        &self,
        path: &str,
        error: HttpError,
        bundle: &dyn BundleRetrieval,
    ) -> Result<RenderedResult, RenderError> {
        let status = error.status_code();
        warn!(
            path,
            status,
            origin = error.report().source,
            detail = error.report().detail(),
            "serving error page"
        );

        let custom = bundle.retrieve_file(&error_page_key(status)).await?;
        let (rendered, page) = match custom {
            Some(file) => (RenderedBody::Stream(file.stream), "custom"),
            None => (RenderedBody::from(error.into_default_page()), "default"),
        };

        counter!("rendition_resolve_total", "outcome" => "error_page").increment(1);
        counter!(
            "rendition_error_page_total",
            "status" => status.to_string(),
            "page" => page
        )
        .increment(1);

        Ok(RenderedResult {
            rendered,
            http_content_type: ERROR_PAGE_CONTENT_TYPE.to_string(),
            http_status: Some(status),
        })
    }
}
