//! CMS backed by a static TOML manifest.
//!
//! ```toml
//! [context]
//! site_name = "Docs"
//!
//! [[routes]]
//! path = "about"
//! template = "pages/about.md"
//! data = { title = "About us" }
//! ```
//!
//! The top-level `context` table is shared by every route; a route's own
//! `context` keys win over it.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::fs;
use tracing::debug;

use crate::application::{
    cms::CmsConnection,
    error::{HttpError, RenderError},
};
use crate::domain::entities::ContentDescriptor;

use super::{CmsError, normalize_path};

const SOURCE: &str = "infra::cms::ManifestCms";

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    context: Value,
    #[serde(default)]
    routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    path: String,
    template: String,
    #[serde(default)]
    context: Value,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Clone, Default)]
pub struct ManifestCms {
    routes: HashMap<String, ContentDescriptor>,
}

impl ManifestCms {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CmsError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .map_err(|source| CmsError::ManifestIo {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CmsError> {
        let raw: RawManifest = toml::from_str(contents)?;
        let mut routes = HashMap::with_capacity(raw.routes.len());

        for route in raw.routes {
            let path = normalize_path(&route.path).to_string();
            if routes.contains_key(&path) {
                return Err(CmsError::DuplicateRoute { path });
            }

            let descriptor = ContentDescriptor {
                template_uid: route.template,
                render_context: merge_context(&raw.context, route.context),
                render_data: route.data,
            };
            routes.insert(path, descriptor);
        }

        Ok(Self { routes })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn merge_context(shared: &Value, route: Value) -> Value {
    match (shared, route) {
        (Value::Object(shared), Value::Object(route)) => {
            let mut merged = shared.clone();
            merged.extend(route);
            Value::Object(merged)
        }
        (shared, Value::Null) => shared.clone(),
        (_, route) => route,
    }
}

#[async_trait]
impl CmsConnection for ManifestCms {
    async fn content_for_path(&self, path: &str) -> Result<ContentDescriptor, RenderError> {
        match self.routes.get(normalize_path(path)) {
            Some(descriptor) => {
                debug!(path, template = %descriptor.template_uid, "manifest route matched");
                Ok(descriptor.clone())
            }
            None => Err(HttpError::not_found(SOURCE, format!("No content for path: {path}")).into()),
        }
    }
}
