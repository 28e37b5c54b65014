//! Bundle key construction shared by the resolver and its collaborators.
//!
//! Static files, templates and custom error pages all live in one key space.
//! Templates are addressed by the raw `template_uid` the CMS hands back.

const STATIC_PREFIX: &str = "public/";
const ERROR_PAGE_SUFFIX: &str = ".html";

/// Key probed for a static file serving `path`.
///
/// The path is appended verbatim; no normalisation happens here.
pub fn static_file_key(path: &str) -> String {
    format!("{STATIC_PREFIX}{path}")
}

/// Key of the deployment-supplied error page for `status_code`, e.g. `404.html`.
pub fn error_page_key(status_code: u16) -> String {
    format!("{status_code}{ERROR_PAGE_SUFFIX}")
}
