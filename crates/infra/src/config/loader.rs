//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If `QUILLSIGN_CLIENT_ID` is set, configuration comes from environment
//!    variables
//! 2. Otherwise, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Either way the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `QUILLSIGN_CLIENT_ID`: Integration key registered with the provider
//! - `QUILLSIGN_IDP_URL`: Identity provider base URL
//! - `QUILLSIGN_SCOPES`: Space separated OAuth scopes
//! - `QUILLSIGN_SCHEME_NAME`: Registered custom URL scheme
//! - `QUILLSIGN_SCHEME_SLASHES`: `1` (`scheme:/path`) or `2`
//!   (`scheme://path`)
//! - `QUILLSIGN_RETURN_PATH`: Return-path token of the login callback
//! - `QUILLSIGN_REDIRECT_URL`: Optional intermediate HTTPS redirect page
//! - `QUILLSIGN_DEV_ACCESS_TOKEN`: Static token for debug builds
//! - `QUILLSIGN_GEOIP_ENABLED`: Whether to look up the default country
//!   (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./quillsign.json` or `./quillsign.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use quillsign_domain::{Config, GeoIpSettings, OAuthSettings, QuillSignError, Result};

const CLIENT_ID_VAR: &str = "QUILLSIGN_CLIENT_ID";

/// Load configuration with automatic fallback strategy
///
/// Environment variables win when `QUILLSIGN_CLIENT_ID` is present;
/// otherwise a config file is located and parsed.
///
/// # Errors
/// Returns `QuillSignError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<Config> {
    let config = if std::env::var_os(CLIENT_ID_VAR).is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        config
    } else {
        tracing::debug!("{CLIENT_ID_VAR} not set, trying config file");
        load_from_file(None)?
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only `QUILLSIGN_CLIENT_ID` is required; every other value falls back to
/// its default.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `QuillSignError::Config` if the client id is missing or a value
/// cannot be parsed.
pub fn load_from_env() -> Result<Config> {
    let defaults = OAuthSettings::default();

    let scheme_slash_count = match env_opt("QUILLSIGN_SCHEME_SLASHES") {
        Some(raw) => raw.parse::<u8>().map_err(|e| {
            QuillSignError::Config(format!("Invalid QUILLSIGN_SCHEME_SLASHES: {e}"))
        })?,
        None => defaults.scheme_slash_count,
    };

    let scopes = env_opt("QUILLSIGN_SCOPES")
        .map(|raw| raw.split_whitespace().map(str::to_string).collect())
        .unwrap_or(defaults.scopes);

    let oauth = OAuthSettings {
        idp_url: env_opt("QUILLSIGN_IDP_URL").unwrap_or(defaults.idp_url),
        client_id: env_var(CLIENT_ID_VAR)?,
        scopes,
        scheme_name: env_opt("QUILLSIGN_SCHEME_NAME").unwrap_or(defaults.scheme_name),
        scheme_slash_count,
        return_path: env_opt("QUILLSIGN_RETURN_PATH").unwrap_or(defaults.return_path),
        redirect_url: env_opt("QUILLSIGN_REDIRECT_URL"),
        dev_access_token: env_opt("QUILLSIGN_DEV_ACCESS_TOKEN"),
        expiration_buffer_seconds: defaults.expiration_buffer_seconds,
    };

    let geoip = GeoIpSettings {
        enabled: env_bool("QUILLSIGN_GEOIP_ENABLED", true),
        ..GeoIpSettings::default()
    };

    Ok(Config { oauth, geoip, ..Config::default() })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `QuillSignError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(QuillSignError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            QuillSignError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| QuillSignError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `QuillSignError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| QuillSignError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| QuillSignError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(QuillSignError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory, its two parents, then the same set
/// relative to the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("quillsign.json"),
        dir.join("quillsign.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `QuillSignError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        QuillSignError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Optional environment variable; blank values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
