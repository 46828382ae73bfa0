//! Environment variable parsing and env-to-config merging.
//!
//! Parsing is strict: a variable that is present but empty or malformed fails
//! instead of being ignored.

use crate::schema::{IgnoreTreeConfig, LogLevelName, ValidatedIgnoreTreeConfig};
use ignore_tree_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: listing timeout in milliseconds.
pub const ENV_LISTING_TIMEOUT_MS: &str = "IGNORE_TREE_LISTING_TIMEOUT_MS";
/// Env var: listing depth.
pub const ENV_LISTING_LEVELS: &str = "IGNORE_TREE_LISTING_LEVELS";
/// Env var: minimum log level.
pub const ENV_LOG_LEVEL: &str = "IGNORE_TREE_LOG_LEVEL";

const ALL_VARS: [&str; 3] = [ENV_LISTING_TIMEOUT_MS, ENV_LISTING_LEVELS, ENV_LOG_LEVEL];

/// Parsed env overrides. `None` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreTreeEnv {
    /// Override for `listing.timeoutMs`.
    pub listing_timeout_ms: Option<u64>,
    /// Override for `listing.levels`.
    pub listing_levels: Option<u32>,
    /// Override for `logging.minLevel`.
    pub log_level: Option<LogLevelName>,
}

impl IgnoreTreeEnv {
    /// Parse env overrides from a key/value map.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        let listing_timeout_ms = parse_optional(map, ENV_LISTING_TIMEOUT_MS, |value| {
            value.parse::<u64>().ok()
        })?;
        let listing_levels =
            parse_optional(map, ENV_LISTING_LEVELS, |value| value.parse::<u32>().ok())?;
        let log_level = parse_optional(map, ENV_LOG_LEVEL, LogLevelName::parse)?;
        Ok(Self {
            listing_timeout_ms,
            listing_levels,
            log_level,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map: BTreeMap<String, String> = ALL_VARS
            .iter()
            .filter_map(|name| {
                std::env::var(name)
                    .ok()
                    .map(|value| ((*name).to_owned(), value))
            })
            .collect();
        Self::from_map(&map)
    }
}

fn parse_optional<T>(
    map: &BTreeMap<String, String>,
    var: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    parse(trimmed)
        .map(Some)
        .ok_or_else(|| EnvParseError::InvalidValue {
            var,
            value: raw.clone(),
        })
}

/// Apply env overrides to a base config (env wins), then validate.
pub fn apply_env_overrides(
    base: IgnoreTreeConfig,
    env: &IgnoreTreeEnv,
) -> Result<ValidatedIgnoreTreeConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(timeout_ms) = env.listing_timeout_ms {
        config.listing.timeout_ms = timeout_ms;
    }
    if let Some(levels) = env.listing_levels {
        config.listing.levels = levels;
    }
    if let Some(level) = env.log_level {
        config.logging.min_level = level;
    }
    config.validate_and_normalize().map_err(Into::into)
}

/// Env parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// Present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Present but not parseable.
    InvalidValue {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_value"),
            Self::InvalidValue { .. } => ErrorCode::new("config", "invalid_env_value"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must not be empty"),
            Self::InvalidValue { var, .. } => write!(formatter, "{var} has an invalid value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidValue { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", value),
        }
    }
}
