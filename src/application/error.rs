use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::{
    domain::error::DomainError, infra::error::InfraError, presentation::views::render_error_page,
};

pub type BoxError = Box<dyn StdError + Send + Sync>;

pub const NOT_FOUND: u16 = 404;

/// Diagnostic chain captured where an error was raised.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: u16,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_message(source: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    /// First message, which is the one raised at the failure site.
    pub fn detail(&self) -> &str {
        self.messages.first().map(String::as_str).unwrap_or_default()
    }
}

/// An error that maps onto an HTTP status and an HTML error page.
#[derive(Debug)]
pub struct HttpError {
    status_code: u16,
    default_page: Option<String>,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(source: &'static str, status_code: u16, detail: impl Into<String>) -> Self {
        Self {
            status_code,
            default_page: Some(render_error_page(status_code)),
            report: ErrorReport::from_message(source, status_code, detail),
        }
    }

    pub fn not_found(source: &'static str, detail: impl Into<String>) -> Self {
        Self::new(source, NOT_FOUND, detail)
    }

    pub fn with_default_page(mut self, html: impl Into<String>) -> Self {
        self.default_page = Some(html.into());
        self
    }

    pub fn without_default_page(mut self) -> Self {
        self.default_page = None;
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn default_page(&self) -> Option<&str> {
        self.default_page.as_deref()
    }

    pub fn report(&self) -> &ErrorReport {
        &self.report
    }

    pub fn into_default_page(self) -> Option<String> {
        self.default_page
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status_code, self.report.detail())
    }
}

impl StdError for HttpError {}

/// Failure raised while resolving a path.
///
/// `Http` failures are turned into error pages by the resolver. `Fatal` ones
/// escape to the caller untouched.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("{origin} failed")]
    Fatal {
        origin: &'static str,
        #[source]
        source: BoxError,
    },
}

impl RenderError {
    pub fn fatal(origin: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Fatal {
            origin,
            source: source.into(),
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(err) => Some(err),
            Self::Fatal { .. } => None,
        }
    }
}

impl From<DomainError> for RenderError {
    fn from(error: DomainError) -> Self {
        Self::fatal("domain", error)
    }
}

/// Top-level failure of the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
