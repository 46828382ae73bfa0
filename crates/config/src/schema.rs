//! Configuration schema, defaults, and validation.
//!
//! Deserialization is strict (`deny_unknown_fields`); every field has a
//! default so partial files are valid. Validation returns typed errors that
//! map into `ErrorEnvelope`s under the `config` namespace.

use ignore_tree_domain::PatternSyntax;
use ignore_tree_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

const LISTING_TIMEOUT_MIN_MS: u64 = 1_000;
const LISTING_TIMEOUT_MAX_MS: u64 = 600_000;
const LISTING_LEVELS_MAX: u32 = 64;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct IgnoreTreeConfig {
    /// Schema version.
    pub version: u32,
    /// Listing source settings.
    pub listing: ListingConfig,
    /// Pattern text settings.
    pub patterns: PatternsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for IgnoreTreeConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            listing: ListingConfig::default(),
            patterns: PatternsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Listing source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ListingConfig {
    /// Deadline for one listing fetch (ms).
    pub timeout_ms: u64,
    /// Extra depth requested below the listed prefix.
    pub levels: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            levels: 0,
        }
    }
}

/// Pattern text settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct PatternsConfig {
    /// Prefix marking an include rule.
    pub negation_marker: String,
    /// Write rules with a leading `/`.
    pub root_anchor: bool,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            negation_marker: "!".to_owned(),
            root_anchor: true,
        }
    }
}

/// Minimum log level name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevelName {
    /// Debug.
    Debug,
    /// Info.
    #[default]
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

impl LogLevelName {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Parse a level name (case-insensitive).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Events below this level are dropped.
    pub min_level: LogLevelName,
}

impl IgnoreTreeConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedIgnoreTreeConfig, ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        if !(LISTING_TIMEOUT_MIN_MS..=LISTING_TIMEOUT_MAX_MS).contains(&self.listing.timeout_ms) {
            return Err(ConfigSchemaError::TimeoutOutOfRange {
                section: "listing",
                field: "timeoutMs",
                value_ms: self.listing.timeout_ms,
                min_ms: LISTING_TIMEOUT_MIN_MS,
                max_ms: LISTING_TIMEOUT_MAX_MS,
            });
        }
        if self.listing.levels > LISTING_LEVELS_MAX {
            return Err(ConfigSchemaError::LimitOutOfRange {
                section: "listing",
                field: "levels",
                value: u64::from(self.listing.levels),
                min: 0,
                max: u64::from(LISTING_LEVELS_MAX),
            });
        }

        let marker = self.patterns.negation_marker.trim().to_owned();
        let negation_marker = single_marker_char(&marker).ok_or_else(|| {
            ConfigSchemaError::InvalidNegationMarker {
                value: self.patterns.negation_marker.clone(),
            }
        })?;
        self.patterns.negation_marker = marker;

        let syntax = PatternSyntax {
            negation_marker,
            root_anchor: self.patterns.root_anchor,
        };
        Ok(ValidatedIgnoreTreeConfig { raw: self, syntax })
    }
}

fn single_marker_char(marker: &str) -> Option<char> {
    let mut chars = marker.chars();
    let first = chars.next()?;
    if chars.next().is_some() || first == '/' || first.is_whitespace() {
        return None;
    }
    Some(first)
}

/// Validated config with derived runtime values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedIgnoreTreeConfig {
    raw: IgnoreTreeConfig,
    syntax: PatternSyntax,
}

impl ValidatedIgnoreTreeConfig {
    /// Pattern text syntax derived from `patterns`.
    #[must_use]
    pub const fn pattern_syntax(&self) -> PatternSyntax {
        self.syntax
    }

    /// Listing deadline.
    #[must_use]
    pub const fn listing_timeout(&self) -> Duration {
        Duration::from_millis(self.raw.listing.timeout_ms)
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> IgnoreTreeConfig {
        self.raw
    }
}

impl AsRef<IgnoreTreeConfig> for ValidatedIgnoreTreeConfig {
    fn as_ref(&self) -> &IgnoreTreeConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedIgnoreTreeConfig {
    type Target = IgnoreTreeConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse a config from JSON, applying validation.
pub fn parse_config_json(input: &str) -> Result<ValidatedIgnoreTreeConfig, ErrorEnvelope> {
    let config: IgnoreTreeConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a config from TOML, applying validation.
pub fn parse_config_toml(input: &str) -> Result<ValidatedIgnoreTreeConfig, ErrorEnvelope> {
    let config: IgnoreTreeConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(Into::into)
}

/// Config validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// `version` is not supported.
    UnsupportedVersion {
        /// Version found in the input.
        found: u32,
        /// Supported version.
        supported: u32,
    },
    /// A timeout is outside its allowed range.
    TimeoutOutOfRange {
        /// Schema section.
        section: &'static str,
        /// Field name.
        field: &'static str,
        /// Value found (ms).
        value_ms: u64,
        /// Minimum allowed (ms).
        min_ms: u64,
        /// Maximum allowed (ms).
        max_ms: u64,
    },
    /// A numeric limit is outside its allowed range.
    LimitOutOfRange {
        /// Schema section.
        section: &'static str,
        /// Field name.
        field: &'static str,
        /// Value found.
        value: u64,
        /// Minimum allowed.
        min: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// The negation marker is not a single usable character.
    InvalidNegationMarker {
        /// Raw value.
        value: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::TimeoutOutOfRange { .. } => ErrorCode::new("config", "invalid_timeout"),
            Self::LimitOutOfRange { .. } => ErrorCode::new("config", "invalid_limit"),
            Self::InvalidNegationMarker { .. } => {
                ErrorCode::new("config", "invalid_negation_marker")
            },
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version: {found} (supported: {supported})"
            ),
            Self::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => write!(
                formatter,
                "{section}.{field} must be within [{min_ms}, {max_ms}] ms (got {value_ms})"
            ),
            Self::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => write!(
                formatter,
                "{section}.{field} must be within [{min}, {max}] (got {value})"
            ),
            Self::InvalidNegationMarker { .. } => formatter.write_str(
                "patterns.negationMarker must be one character other than '/' or whitespace",
            ),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                ..
            } => envelope
                .with_metadata("field", format!("{section}.{field}"))
                .with_metadata("value_ms", value_ms.to_string()),
            ConfigSchemaError::LimitOutOfRange {
                section,
                field,
                value,
                ..
            } => envelope
                .with_metadata("field", format!("{section}.{field}"))
                .with_metadata("value", value.to_string()),
            ConfigSchemaError::InvalidNegationMarker { value } => {
                envelope.with_metadata("value", value)
            },
        }
    }
}
