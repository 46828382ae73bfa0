//! `LoggerPort` adapter that forwards events to the `tracing` facade.

use ignore_tree_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use ignore_tree_shared::{ErrorCode, ErrorEnvelope, Result};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const TARGET: &str = "ignore_tree";

/// Logger that emits each event as a `tracing` event under the `ignore_tree` target.
///
/// Structured fields are flattened into a single JSON `fields` value so the
/// subscriber decides the final layout.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    base_fields: LogFields,
}

impl TracingLogger {
    /// Create a logger with no base fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoggerPort for TracingLogger {
    fn log(&self, event: LogEvent) {
        let mut fields = self.base_fields.clone();
        fields.extend(event.fields.unwrap_or_default());
        let fields = if fields.is_empty() {
            String::new()
        } else {
            let mut value: Value = fields
                .into_iter()
                .map(|(key, value)| (key.into_string(), value))
                .collect::<serde_json::Map<_, _>>()
                .into();
            crate::logger::redact_value(&mut value);
            value.to_string()
        };
        let error = event.error.map(|error| error.to_string()).unwrap_or_default();
        let name = &*event.event;
        let message = &*event.message;

        match event.level {
            LogLevel::Debug => {
                tracing::debug!(
                    target: TARGET,
                    event = name,
                    fields = fields.as_str(),
                    error = error.as_str(),
                    "{message}"
                );
            },
            LogLevel::Info => {
                tracing::info!(
                    target: TARGET,
                    event = name,
                    fields = fields.as_str(),
                    error = error.as_str(),
                    "{message}"
                );
            },
            LogLevel::Warn => {
                tracing::warn!(
                    target: TARGET,
                    event = name,
                    fields = fields.as_str(),
                    error = error.as_str(),
                    "{message}"
                );
            },
            LogLevel::Error => {
                tracing::error!(
                    target: TARGET,
                    event = name,
                    fields = fields.as_str(),
                    error = error.as_str(),
                    "{message}"
                );
            },
        }
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            base_fields: merged,
        })
    }
}

/// Install a global `tracing-subscriber` with JSON output on stderr.
///
/// `directive` falls back to `RUST_LOG` when empty (e.g. `ignore_tree=debug`).
pub fn init_tracing(directive: &str) -> Result<()> {
    let filter = if directive.trim().is_empty() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(directive).map_err(|error| {
            ErrorEnvelope::expected(ErrorCode::invalid_input(), error.to_string())
                .with_metadata("directive", directive)
        })?
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|error| ErrorEnvelope::invariant(ErrorCode::internal(), error.to_string()))
}
