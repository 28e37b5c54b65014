use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the rendition binary.
#[derive(Debug, Parser)]
#[command(
    name = "rendition",
    version,
    about = "Resolve request paths against a content bundle and CMS"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "RENDITION_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Resolve one request path and write the rendered body.
    Render(RenderArgs),
    /// List the content types that have a registered renderer.
    Renderers(RenderersArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub overrides: ResolveOverrides,

    /// Write the body to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Request path to resolve, e.g. `about` or `css/site.css`.
    #[arg(value_name = "PATH")]
    pub path: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderersArgs {
    #[command(flatten)]
    pub logging: LoggingOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ResolveOverrides {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Override the bundle root directory.
    #[arg(long = "bundle-root", value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub bundle_root: Option<PathBuf>,

    /// Use a TOML content manifest as the CMS.
    #[arg(
        long = "cms-manifest",
        value_name = "FILE",
        value_hint = ValueHint::FilePath,
        conflicts_with = "cms_remote_url"
    )]
    pub cms_manifest: Option<PathBuf>,

    /// Use a remote CMS reachable at this base URL.
    #[arg(long = "cms-remote-url", value_name = "URL")]
    pub cms_remote_url: Option<String>,

    /// Override the remote CMS request timeout.
    #[arg(long = "cms-remote-timeout-seconds", value_name = "SECONDS")]
    pub cms_remote_timeout_seconds: Option<u64>,
}
