//! CMS reached over HTTP.
//!
//! Issues `GET {base}/content?path=<path>` and expects a JSON body of the form
//! `{ "templateUid": .., "renderContext": .., "renderData": .. }`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::application::{
    cms::CmsConnection,
    error::{HttpError, RenderError},
};
use crate::domain::entities::ContentDescriptor;

use super::CmsError;

const SOURCE: &str = "infra::cms::RemoteCms";
const CONTENT_ENDPOINT: &str = "content";

#[derive(Debug, Clone)]
pub struct RemoteCms {
    client: Client,
    endpoint: Url,
}

impl RemoteCms {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CmsError> {
        let endpoint = content_endpoint(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CmsError::Transport)?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, path: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("path", path);
        url
    }
}

fn content_endpoint(base_url: &str) -> Result<Url, CmsError> {
    let invalid = |reason: String| CmsError::Endpoint {
        url: base_url.to_string(),
        reason,
    };

    let mut base = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", base.scheme())));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(CONTENT_ENDPOINT)
        .map_err(|err| invalid(err.to_string()))
}

#[async_trait]
impl CmsConnection for RemoteCms {
    async fn content_for_path(&self, path: &str) -> Result<ContentDescriptor, RenderError> {
        let url = self.request_url(path);
        debug!(path, url = %url, "querying remote CMS");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(CmsError::Transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(
                HttpError::not_found(SOURCE, format!("CMS has no content for path: {path}")).into(),
            );
        }
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "remote CMS request failed");
            return Err(CmsError::Status {
                status: status.as_u16(),
            }
            .into());
        }

        let descriptor = response
            .json::<ContentDescriptor>()
            .await
            .map_err(CmsError::Decode)?;
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Answer exactly one request with the given status line and JSON body.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buffer = vec![0u8; 4096];
            let _ = socket.read(&mut buffer).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/api")
    }

    fn client(base: &str) -> RemoteCms {
        RemoteCms::new(base, Duration::from_secs(5)).expect("client")
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let cms = client("https://cms.example.com/api/v1");
        assert_eq!(cms.endpoint().as_str(), "https://cms.example.com/api/v1/content");
        assert_eq!(
            cms.request_url("docs/intro page").as_str(),
            "https://cms.example.com/api/v1/content?path=docs%2Fintro+page"
        );
    }

    #[test]
    fn rejects_non_http_endpoints() {
        assert!(matches!(
            RemoteCms::new("ftp://cms.example.com", Duration::from_secs(1)),
            Err(CmsError::Endpoint { .. })
        ));
        assert!(matches!(
            RemoteCms::new("not a url", Duration::from_secs(1)),
            Err(CmsError::Endpoint { .. })
        ));
    }

    #[tokio::test]
    async fn decodes_content_descriptor() {
        let base = serve_once(
            "200 OK",
            r#"{"templateUid":"pages/about.md","renderContext":{"lang":"en"},"renderData":{"title":"About"}}"#,
        )
        .await;

        let descriptor = client(&base)
            .content_for_path("about")
            .await
            .expect("descriptor");
        assert_eq!(descriptor.template_uid, "pages/about.md");
        assert_eq!(descriptor.render_data["title"], "About");
    }

    #[tokio::test]
    async fn remote_not_found_is_http_classed() {
        let base = serve_once("404 Not Found", "{}").await;
        let err = client(&base)
            .content_for_path("missing")
            .await
            .expect_err("not found");
        assert_eq!(err.as_http().map(HttpError::status_code), Some(404));
    }

    #[tokio::test]
    async fn server_errors_are_fatal() {
        let base = serve_once("502 Bad Gateway", "{}").await;
        let err = client(&base)
            .content_for_path("about")
            .await
            .expect_err("bad gateway");
        assert!(!err.is_http());
    }

    #[tokio::test]
    async fn undecodable_body_is_fatal() {
        let base = serve_once("200 OK", r#"{"unexpected":true}"#).await;
        let err = client(&base)
            .content_for_path("about")
            .await
            .expect_err("decode failure");
        assert!(!err.is_http());
    }
}
