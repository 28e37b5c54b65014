//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{collections::BTreeMap, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub use cli::{
    CliArgs, Command, LoggingOverrides, RenderArgs, RenderersArgs, ResolveOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "rendition";
const DEFAULT_BUNDLE_ROOT: &str = "bundle";
const DEFAULT_CMS_MANIFEST: &str = "content.toml";
const DEFAULT_CMS_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONTENT_TYPES: [(&str, &str); 2] =
    [("md", "text/markdown"), ("markdown", "text/markdown")];

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub bundle: BundleSettings,
    pub cms: CmsSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct BundleSettings {
    pub root: PathBuf,
    /// Extension (lowercase, no dot) → content type.
    pub content_types: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub enum CmsSettings {
    Manifest { path: PathBuf },
    Remote { base_url: String, timeout: Duration },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("RENDITION").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match &cli.command {
        Command::Render(args) => raw.apply_resolve_overrides(&args.overrides),
        Command::Renderers(args) => raw.apply_logging_overrides(&args.logging),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    bundle: RawBundleSettings,
    cms: RawCmsSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBundleSettings {
    root: Option<PathBuf>,
    content_types: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCmsSettings {
    manifest: Option<PathBuf>,
    remote_url: Option<String>,
    remote_timeout_seconds: Option<u64>,
}

impl RawSettings {
    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_resolve_overrides(&mut self, overrides: &ResolveOverrides) {
        self.apply_logging_overrides(&overrides.logging);

        if let Some(root) = overrides.bundle_root.as_ref() {
            self.bundle.root = Some(root.clone());
        }
        // A CMS chosen on the command line replaces whichever one the files configured.
        if let Some(manifest) = overrides.cms_manifest.as_ref() {
            self.cms.manifest = Some(manifest.clone());
            self.cms.remote_url = None;
        }
        if let Some(url) = overrides.cms_remote_url.as_ref() {
            self.cms.remote_url = Some(url.clone());
            self.cms.manifest = None;
        }
        if let Some(seconds) = overrides.cms_remote_timeout_seconds {
            self.cms.remote_timeout_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            bundle,
            cms,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let bundle = build_bundle_settings(bundle)?;
        let cms = build_cms_settings(cms)?;

        Ok(Self {
            logging,
            bundle,
            cms,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_bundle_settings(bundle: RawBundleSettings) -> Result<BundleSettings, LoadError> {
    let root = bundle
        .root
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BUNDLE_ROOT));
    if root.as_os_str().is_empty() {
        return Err(LoadError::invalid("bundle.root", "must not be empty"));
    }

    let mut content_types: BTreeMap<String, String> = DEFAULT_CONTENT_TYPES
        .iter()
        .map(|(extension, content_type)| (extension.to_string(), content_type.to_string()))
        .collect();

    for (extension, content_type) in bundle.content_types {
        let extension = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        if extension.is_empty() {
            return Err(LoadError::invalid(
                "bundle.content_types",
                "extension must not be empty",
            ));
        }
        let content_type = content_type.trim();
        if !content_type.contains('/') {
            return Err(LoadError::invalid(
                "bundle.content_types",
                format!("`{content_type}` for `.{extension}` is not a media type"),
            ));
        }
        content_types.insert(extension, content_type.to_string());
    }

    Ok(BundleSettings {
        root,
        content_types,
    })
}

fn build_cms_settings(cms: RawCmsSettings) -> Result<CmsSettings, LoadError> {
    let remote_url = cms.remote_url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    match (cms.manifest, remote_url) {
        (Some(_), Some(_)) => Err(LoadError::invalid(
            "cms",
            "set either `cms.manifest` or `cms.remote_url`, not both",
        )),
        (_, Some(base_url)) => {
            let seconds = cms
                .remote_timeout_seconds
                .unwrap_or(DEFAULT_CMS_TIMEOUT_SECS);
            if seconds == 0 {
                return Err(LoadError::invalid(
                    "cms.remote_timeout_seconds",
                    "must be greater than zero",
                ));
            }
            Ok(CmsSettings::Remote {
                base_url,
                timeout: Duration::from_secs(seconds),
            })
        }
        (manifest, None) => Ok(CmsSettings::Manifest {
            path: manifest.unwrap_or_else(|| PathBuf::from(DEFAULT_CMS_MANIFEST)),
        }),
    }
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
