use askama::{Error as AskamaError, Template};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

pub fn render_template<T: Template>(template: T) -> Result<String, TemplateRenderError> {
    template.render().map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
    })
}

pub struct ErrorPageView {
    pub status_code: u16,
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn for_status(status_code: u16) -> Self {
        let (title, message) = match status_code {
            400 => ("Bad Request", "The request could not be understood."),
            401 => ("Unauthorized", "You need to sign in to view this page."),
            403 => ("Forbidden", "You do not have access to this page."),
            404 => (
                "Page Not Found",
                "The page you requested does not exist. Try returning to the homepage to continue exploring.",
            ),
            410 => ("Gone", "This page has been removed."),
            500 => ("Internal Server Error", "Something went wrong on our side."),
            502 => ("Bad Gateway", "An upstream service returned an invalid response."),
            503 => (
                "Service Unavailable",
                "The site is temporarily unavailable. Please try again shortly.",
            ),
            _ if status_code >= 500 => ("Server Error", "Something went wrong on our side."),
            _ => ("Request Error", "The request could not be completed."),
        };

        Self {
            status_code,
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: ErrorPageView,
}

/// Built-in HTML error page for `status_code`.
pub fn render_error_page(status_code: u16) -> String {
    let view = ErrorPageView::for_status(status_code);
    match render_template(ErrorTemplate { view }) {
        Ok(html) => html,
        Err(err) => {
            error!(
                status_code,
                source = err.source,
                error = %err.error,
                "built-in error page failed to render"
            );
            format!("<!doctype html><title>{status_code}</title><h1>{status_code}</h1>")
        }
    }
}

pub struct PageView {
    pub lang: String,
    pub title: String,
    pub site_name: Option<String>,
    pub content_html: String,
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub view: PageView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_page_mentions_status_and_title() {
        let html = render_error_page(404);
        assert!(html.contains("404 Page Not Found"));
        assert!(html.contains("data-status=\"404\""));
    }

    #[test]
    fn unknown_server_status_uses_generic_copy() {
        let view = ErrorPageView::for_status(599);
        assert_eq!(view.title, "Server Error");
    }

    #[test]
    fn page_layout_escapes_title_but_not_content() {
        let view = PageView {
            lang: "en".into(),
            title: "Hello <world>".into(),
            site_name: Some("Docs".into()),
            content_html: "<p>body</p>".into(),
        };
        let html = render_template(PageTemplate { view }).expect("render");
        assert!(!html.contains("<world>"));
        assert!(html.contains(" · Docs</title>"));
        assert!(html.contains("<p>body</p>"));
    }
}
