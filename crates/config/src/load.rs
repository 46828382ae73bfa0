//! Config loading helpers.
//!
//! Precedence (highest wins): env overrides, config file, defaults. Errors
//! surface as `ErrorEnvelope`s in the `config` namespace.

use crate::env::{IgnoreTreeEnv, apply_env_overrides};
use crate::schema::{IgnoreTreeConfig, ValidatedIgnoreTreeConfig};
use ignore_tree_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::Path;

/// Serialization format of a config source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON.
    Json,
    /// TOML.
    Toml,
}

impl ConfigFormat {
    /// Pick a format from a file extension (`.json` or none → JSON).
    pub fn from_path(path: &Path) -> Result<Self, ErrorEnvelope> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            None | Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some(other) => Err(ErrorEnvelope::expected(
                ErrorCode::new("config", "unsupported_format"),
                "unsupported config format; use .json or .toml",
            )
            .with_metadata("extension", other.to_owned())),
        }
    }
}

/// Load from optional in-memory text, then apply env and validate.
pub fn load_config_from_sources(
    config_text: Option<(&str, ConfigFormat)>,
    env: &IgnoreTreeEnv,
) -> Result<ValidatedIgnoreTreeConfig, ErrorEnvelope> {
    let config = match config_text {
        None => IgnoreTreeConfig::default(),
        Some((input, format)) => parse_unvalidated(input, format)?,
    };
    apply_env_overrides(config, env)
}

/// Load from an optional file path, then apply env and validate.
pub fn load_config_from_path(
    config_path: Option<&Path>,
    env: &IgnoreTreeEnv,
) -> Result<ValidatedIgnoreTreeConfig, ErrorEnvelope> {
    let config = match config_path {
        None => IgnoreTreeConfig::default(),
        Some(path) => {
            let text = read_config_file(path)?;
            parse_unvalidated(&text, ConfigFormat::from_path(path)?)?
        },
    };
    apply_env_overrides(config, env)
}

/// Load from an optional file path using the process environment.
pub fn load_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedIgnoreTreeConfig, ErrorEnvelope> {
    let env = IgnoreTreeEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_config_from_path(config_path, &env)
}

/// Serialize as pretty JSON with a trailing newline.
pub fn to_pretty_json(config: &IgnoreTreeConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize as pretty TOML with a trailing newline.
pub fn to_pretty_toml(config: &IgnoreTreeConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn parse_unvalidated(input: &str, format: ConfigFormat) -> Result<IgnoreTreeConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };
        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}
