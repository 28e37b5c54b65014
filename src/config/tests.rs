use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.bundle.root = Some(PathBuf::from("/srv/from-file"));
    raw.logging.level = Some("info".to_string());

    let overrides = ResolveOverrides {
        bundle_root: Some(PathBuf::from("/srv/from-cli")),
        logging: LoggingOverrides {
            log_level: Some("debug".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    raw.apply_resolve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.bundle.root, PathBuf::from("/srv/from-cli"));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_use_local_manifest_and_bundle() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
    assert_eq!(settings.bundle.root, PathBuf::from(DEFAULT_BUNDLE_ROOT));
    assert_eq!(
        settings.bundle.content_types.get("md").map(String::as_str),
        Some("text/markdown")
    );
    assert!(matches!(
        settings.cms,
        CmsSettings::Manifest { ref path } if path == &PathBuf::from(DEFAULT_CMS_MANIFEST)
    ));
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = LoggingOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_logging_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn invalid_log_level_names_the_key() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    let err = Settings::from_raw(raw).expect_err("invalid level");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
fn remote_cms_from_cli_replaces_file_manifest() {
    let mut raw = RawSettings::default();
    raw.cms.manifest = Some(PathBuf::from("site.toml"));

    let overrides = ResolveOverrides {
        cms_remote_url: Some("https://cms.example.com".to_string()),
        cms_remote_timeout_seconds: Some(3),
        ..Default::default()
    };
    raw.apply_resolve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    match settings.cms {
        CmsSettings::Remote { base_url, timeout } => {
            assert_eq!(base_url, "https://cms.example.com");
            assert_eq!(timeout, Duration::from_secs(3));
        }
        other => panic!("unexpected cms settings: {other:?}"),
    }
}

#[test]
fn both_cms_sources_in_files_are_rejected() {
    let mut raw = RawSettings::default();
    raw.cms.manifest = Some(PathBuf::from("site.toml"));
    raw.cms.remote_url = Some("https://cms.example.com".to_string());
    let err = Settings::from_raw(raw).expect_err("ambiguous cms");
    assert!(matches!(err, LoadError::Invalid { key: "cms", .. }));
}

#[test]
fn zero_remote_timeout_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cms.remote_url = Some("https://cms.example.com".to_string());
    raw.cms.remote_timeout_seconds = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn content_type_overrides_are_normalised() {
    let mut raw = RawSettings::default();
    raw.bundle
        .content_types
        .insert(".TPL".to_string(), "text/html".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.bundle.content_types.get("tpl").map(String::as_str),
        Some("text/html")
    );

    let mut raw = RawSettings::default();
    raw.bundle
        .content_types
        .insert("tpl".to_string(), "html".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn command_is_required() {
    assert!(CliArgs::try_parse_from(["rendition"]).is_err());
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from([
        "rendition",
        "render",
        "--bundle-root",
        "/srv/bundle",
        "--cms-manifest",
        "/srv/content.toml",
        "-o",
        "/tmp/out.html",
        "about",
    ]);

    match args.command {
        Command::Render(render) => {
            assert_eq!(render.path, "about");
            assert_eq!(
                render.overrides.bundle_root.as_deref(),
                Some(std::path::Path::new("/srv/bundle"))
            );
            assert_eq!(
                render.overrides.cms_manifest.as_deref(),
                Some(std::path::Path::new("/srv/content.toml"))
            );
            assert_eq!(
                render.output.as_deref(),
                Some(std::path::Path::new("/tmp/out.html"))
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn manifest_and_remote_flags_conflict() {
    let result = CliArgs::try_parse_from([
        "rendition",
        "render",
        "--cms-manifest",
        "a.toml",
        "--cms-remote-url",
        "https://cms.example.com",
        "about",
    ]);
    assert!(result.is_err());
}

#[test]
fn parse_renderers_arguments() {
    let args = CliArgs::parse_from(["rendition", "renderers", "--log-json", "true"]);
    match args.command {
        Command::Renderers(renderers) => assert_eq!(renderers.logging.log_json, Some(true)),
        _ => panic!("wrong command parsed"),
    }
}
