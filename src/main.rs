use std::{path::Path, process, sync::Arc};

use futures::StreamExt;
use rendition::{
    application::{
        cms::CmsConnection, error::AppError, render::RendererMap, resolver::Resolver,
    },
    config::{self, CmsSettings},
    domain::entities::RenderedBody,
    infra::{
        bundle::DirectoryBundle,
        cms::{ManifestCms, RemoteCms},
        error::InfraError,
        telemetry,
    },
};
use tokio::io::{self as tokio_io, AsyncWrite, AsyncWriteExt};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        config::Command::Render(args) => run_render(settings, args).await,
        config::Command::Renderers(_) => run_renderers().await,
    }
}

async fn run_render(settings: config::Settings, args: config::RenderArgs) -> Result<(), AppError> {
    let bundle = DirectoryBundle::new(&settings.bundle.root)
        .map_err(|err| InfraError::configuration(err.to_string()))?
        .with_content_types(settings.bundle.content_types.clone());
    let cms = init_cms(&settings.cms).await?;
    let resolver = Resolver::new(Arc::new(RendererMap::with_builtin()));

    info!(
        target = "rendition::render",
        path = %args.path,
        bundle = %settings.bundle.root.display(),
        "Resolving path"
    );

    let result = resolver.render(&args.path, &bundle, cms.as_ref()).await?;
    let status = result.status_or_default();
    let content_type = result.http_content_type.clone();

    let written = match args.output.as_deref() {
        Some(path) => write_to_file(path, result.rendered).await?,
        None => {
            let mut stdout = tokio_io::stdout();
            write_body(result.rendered, &mut stdout).await?
        }
    };

    if status >= 400 {
        warn!(
            target = "rendition::render",
            status,
            content_type = %content_type,
            bytes = written,
            "Resolved to an error page"
        );
    } else {
        info!(
            target = "rendition::render",
            status,
            content_type = %content_type,
            bytes = written,
            "Render completed"
        );
    }
    Ok(())
}

async fn run_renderers() -> Result<(), AppError> {
    let renderers = RendererMap::with_builtin();
    let mut stdout = tokio_io::stdout();
    for content_type in renderers.content_types() {
        stdout
            .write_all(format!("{content_type}\n").as_bytes())
            .await
            .map_err(InfraError::from)?;
    }
    stdout.flush().await.map_err(InfraError::from)?;
    Ok(())
}

async fn init_cms(settings: &CmsSettings) -> Result<Box<dyn CmsConnection>, AppError> {
    let cms: Box<dyn CmsConnection> = match settings {
        CmsSettings::Manifest { path } => {
            let manifest = ManifestCms::load(path)
                .await
                .map_err(|err| InfraError::configuration(err.to_string()))?;
            info!(
                target = "rendition::cms",
                manifest = %path.display(),
                routes = manifest.len(),
                "Loaded content manifest"
            );
            Box::new(manifest)
        }
        CmsSettings::Remote { base_url, timeout } => {
            let remote = RemoteCms::new(base_url, *timeout)
                .map_err(|err| InfraError::configuration(err.to_string()))?;
            info!(
                target = "rendition::cms",
                endpoint = %remote.endpoint(),
                "Using remote CMS"
            );
            Box::new(remote)
        }
    };
    Ok(cms)
}

async fn write_to_file(path: &Path, body: RenderedBody) -> Result<u64, AppError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(InfraError::from)?;
    write_body(body, &mut file).await
}

async fn write_body<W>(body: RenderedBody, writer: &mut W) -> Result<u64, AppError>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    match body {
        RenderedBody::Stream(mut stream) => {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(InfraError::from)?;
                writer.write_all(&chunk).await.map_err(InfraError::from)?;
                written += chunk.len() as u64;
            }
        }
        RenderedBody::Text(text) => {
            writer
                .write_all(text.as_bytes())
                .await
                .map_err(InfraError::from)?;
            written = text.len() as u64;
        }
        RenderedBody::Empty => {}
    }
    writer.flush().await.map_err(InfraError::from)?;
    Ok(written)
}
