//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use quillsign_infra::config;
use tempfile::TempDir;

#[test]
fn test_load_config_from_json_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("quillsign.json");
    std::fs::write(
        &path,
        r#"{
            "oauth": {
                "idp_url": "https://account.example.com",
                "client_id": "client-123",
                "scopes": ["signature"],
                "scheme_name": "signer",
                "scheme_slash_count": 2,
                "return_path": "implicit-result"
            },
            "signing": {
                "document_file_name": "nda.pdf",
                "document_name": "NDA",
                "document_extension": "pdf"
            }
        }"#,
    )
    .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("Failed to load config from JSON file");

    assert_eq!(config.oauth.idp_url, "https://account.example.com");
    assert_eq!(config.oauth.scheme_slash_count, 2);
    assert_eq!(config.signing.document().file_name, "nda.pdf");
    assert_eq!(config.signing.request_timeout_seconds, 30);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_config_from_toml_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[oauth]
client_id = "client-123"
redirect_url = "https://example.com/redirect.html"
dev_access_token = "dev-token"

[geoip]
enabled = false
"#,
    )
    .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("Failed to load config from TOML file");

    assert_eq!(config.oauth.redirect_url.as_deref(), Some("https://example.com/redirect.html"));
    assert_eq!(config.oauth.dev_access_token.as_deref(), Some("dev-token"));
    assert_eq!(config.oauth.scheme_name, "quillsign");
    assert!(!config.geoip.enabled);
}

/// A file that parses but breaks a cross-field rule loads, and validation
/// names the field.
#[test]
fn test_invalid_values_fail_validation() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[oauth]\nclient_id = \"abc\"\nscheme_slash_count = 4\n")
        .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("file parses");
    let err = config.validate().unwrap_err();

    assert!(err.to_string().contains("scheme_slash_count"));
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "oauth": { "client_id": "#).expect("Failed to write config");

    let err = config::load_from_file(Some(path)).unwrap_err();

    assert!(matches!(err, quillsign_domain::QuillSignError::Config(msg) if msg.contains("JSON")));
}
