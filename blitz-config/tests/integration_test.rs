//! Integration tests for blitz-config

use blitz_config::*;
use blitz_core::{Error, HttpRequest, HttpResponse};
use std::env;
use std::path::PathBuf;

fn temp_file(name: &str, content: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("blitz-config-{}-{}", std::process::id(), name));
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_from_toml_file() {
    let path = temp_file(
        "router.toml",
        r#"
        [router]
        allow = ["GET", "POST", "OPTIONS"]

        [log]
        level = "warn"
        "#,
    );

    let config = BlitzConfig::from_file(&path).unwrap();
    assert_eq!(config.router.allow_header(), "GET,POST,OPTIONS");
    assert_eq!(config.log.level, blitz_core::LogLevel::Warn);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_from_json_file_with_invalid_method() {
    let path = temp_file("bad.json", r#"{"router": {"allow": ["GET", "FETCH"]}}"#);

    let err = BlitzConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_missing_file() {
    let err = BlitzConfig::from_file("/definitely/not/here/blitz.toml").unwrap_err();
    assert!(matches!(err, ConfigError::IoError(_)));
}

#[test]
fn test_unsupported_extension() {
    let err = BlitzConfig::from_file("blitz.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::LoadError(_)));
}

#[test]
fn test_env_loader_with_prefix() {
    let loader = EnvLoader::new(Some("BLITZ_ITEST".to_string()));

    unsafe {
        env::set_var("BLITZ_ITEST_AUTH__HEADER", "X-Itest");
    }

    let vars = loader.load();
    assert_eq!(vars["auth__header"], "X-Itest");
    let config = BlitzConfig::default().with_overrides(&vars).unwrap();
    assert_eq!(config.auth.header, "X-Itest");

    unsafe {
        env::remove_var("BLITZ_ITEST_AUTH__HEADER");
    }
}

#[test]
fn test_env_file_is_loaded_through_the_file_loader() {
    let path = temp_file("settings.env", "BLITZ_LOG__LEVEL=error\n");

    let config = BlitzConfig::from_file(&path).unwrap();
    assert_eq!(config.log.level, blitz_core::LogLevel::Error);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_file_then_environment() {
    let path = temp_file("layered.toml", "[auth]\nheader = \"X-From-File\"\n");

    let from_file = BlitzConfig::from_file(&path).unwrap();
    let layered = from_file
        .with_overrides(&EnvLoader::default().load_from([("BLITZ_AUTH__HEADER", "X-From-Env")]))
        .unwrap();

    assert_eq!(layered.auth.header, "X-From-Env");

    std::fs::remove_file(path).ok();
}

#[test]
fn test_configured_router_and_auth() {
    let config = BlitzConfig::parse(
        r#"
        [router]
        allow = ["GET", "OPTIONS"]

        [auth]
        header = "X-Api-Key"
        "#,
        FileFormat::Toml,
    )
    .unwrap();

    let mut router = config.router();
    router.get(
        "/secure",
        |_req: HttpRequest| async { Ok::<_, Error>(HttpResponse::text("secret")) },
        vec![config.auth()],
    );
    let dispatcher = router.freeze();

    tokio_test::block_on(async {
        let options = dispatcher
            .serve(HttpRequest::new("OPTIONS", "/secure"))
            .await
            .unwrap();
        assert_eq!(options.header("Allow"), Some("GET,OPTIONS"));

        let denied = dispatcher
            .serve(HttpRequest::new("GET", "/secure").with_header("Authorization", "t"))
            .await
            .unwrap();
        assert_eq!(denied.status, 401);

        let allowed = dispatcher
            .serve(HttpRequest::new("GET", "/secure").with_header("X-Api-Key", "k"))
            .await
            .unwrap();
        assert_eq!(allowed.body_str(), "secret");
    });
}
