//! # ignore-tree-config
//!
//! Configuration schema, validation, env overrides, and file loading.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (file + env).
pub mod load;
/// Configuration schema types and validation.
pub mod schema;

pub use env::{
    ENV_LISTING_LEVELS, ENV_LISTING_TIMEOUT_MS, ENV_LOG_LEVEL, EnvParseError, IgnoreTreeEnv,
    apply_env_overrides,
};
pub use load::{
    ConfigFormat, load_config_from_path, load_config_from_sources, load_config_std_env,
    to_pretty_json, to_pretty_toml,
};
pub use schema::{
    CURRENT_CONFIG_VERSION, ConfigSchemaError, IgnoreTreeConfig, ListingConfig, LogLevelName,
    LoggingConfig, PatternsConfig, ValidatedIgnoreTreeConfig, parse_config_json,
    parse_config_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
