//! Structured JSON logger adapter.
//!
//! One JSON object per line: `timestampMs`, `level`, `event`, `message`, and
//! optional `fields` / `error`. Secret-looking keys are redacted at any depth.

use crate::log_sink::LogSink;
use ignore_tree_config::ValidatedIgnoreTreeConfig;
use ignore_tree_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use ignore_tree_shared::{REDACTED, is_secret_key};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const SERIALIZE_FAILED_LINE: &str = "{\"timestampMs\":0,\"level\":\"error\",\"event\":\"logger.serialize_failed\",\"message\":\"log serialization failed\"}\n";

/// JSON logger emitting one line per event.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    base_fields: LogFields,
    min_level: LogLevel,
}

impl JsonLogger {
    /// Create a JSON logger at `info` backed by `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_fields: LogFields::new(),
            min_level: LogLevel::Info,
        }
    }

    /// Create a logger using `logging.minLevel` from validated config.
    #[must_use]
    pub fn from_config(sink: Arc<dyn LogSink>, config: &ValidatedIgnoreTreeConfig) -> Self {
        let min_level =
            LogLevel::parse(config.logging.min_level.as_str()).unwrap_or(LogLevel::Info);
        Self::new(sink).with_min_level(min_level)
    }

    /// Set base fields applied to every event.
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    fn encode(&self, event: LogEvent) -> String {
        let mut fields = self.base_fields.clone();
        fields.extend(event.fields.unwrap_or_default());

        let mut payload = Map::new();
        payload.insert("timestampMs".to_owned(), Value::from(now_epoch_ms()));
        payload.insert("level".to_owned(), Value::from(event.level.as_str()));
        payload.insert("event".to_owned(), Value::from(&*event.event));
        payload.insert("message".to_owned(), Value::from(&*event.message));
        if !fields.is_empty() {
            let mut fields: Value = fields
                .into_iter()
                .map(|(key, value)| (key.into_string(), value))
                .collect::<Map<_, _>>()
                .into();
            redact_value(&mut fields);
            payload.insert("fields".to_owned(), fields);
        }
        if let Some(mut error) = event.error {
            redact_value(&mut error);
            payload.insert("error".to_owned(), error);
        }

        serde_json::to_string(&Value::Object(payload)).map_or_else(
            |_| SERIALIZE_FAILED_LINE.to_owned(),
            |mut encoded| {
                encoded.push('\n');
                encoded
            },
        )
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }
        let line = self.encode(event);
        self.sink.write_line(&line);
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            sink: Arc::clone(&self.sink),
            base_fields: merged,
            min_level: self.min_level,
        })
    }
}

/// Replace values under secret-looking keys, recursing through objects and arrays.
pub(crate) fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                if is_secret_key(key) {
                    *nested = Value::from(REDACTED);
                } else {
                    redact_value(nested);
                }
            }
        },
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {},
    }
}

pub(crate) fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemoryLogSink;
    use ignore_tree_shared::{ErrorCode, ErrorEnvelope};
    use serde_json::json;

    fn field(key: &str, value: Value) -> LogFields {
        let mut fields = LogFields::new();
        fields.insert(key.into(), value);
        fields
    }

    #[test]
    fn events_below_min_level_are_dropped() {
        let sink = Arc::new(MemoryLogSink::default());
        let logger = JsonLogger::new(sink.clone()).with_min_level(LogLevel::Warn);

        logger.info("ignoreTree.refresh.start", "Tree refresh started", None);
        logger.warn("ignoreTree.refresh.failed", "Tree refresh failed", None);

        let lines = sink.take_json();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["event"], json!("ignoreTree.refresh.failed"));
        assert_eq!(lines[0]["level"], json!("warn"));
    }

    #[test]
    fn secret_fields_are_redacted() {
        let sink = Arc::new(MemoryLogSink::default());
        let logger = JsonLogger::new(sink.clone());

        let mut fields = field("apiKey", json!("abc"));
        fields.insert("folderId".into(), json!("default"));
        fields.insert("headers".into(), json!([{ "authorization": "Bearer x" }]));
        logger.info("ignoreTree.listing.request", "Listing requested", Some(fields));

        let lines = sink.take_json();
        let logged = &lines[0]["fields"];
        assert_eq!(logged["apiKey"], json!(REDACTED));
        assert_eq!(logged["folderId"], json!("default"));
        assert_eq!(logged["headers"][0]["authorization"], json!(REDACTED));
    }

    #[test]
    fn failures_carry_the_error_envelope() {
        let sink = Arc::new(MemoryLogSink::default());
        let logger = JsonLogger::new(sink.clone());
        let error = ErrorEnvelope::expected(ErrorCode::timeout(), "listing timed out")
            .with_metadata("operation", "tree_sync.refresh");

        logger.warn_failure(
            "ignoreTree.refresh.failed",
            "Tree refresh failed",
            &error,
            Some(field("folderId", json!("default"))),
        );

        let lines = sink.take_json();
        assert_eq!(lines[0]["error"]["message"], json!("listing timed out"));
        assert_eq!(lines[0]["fields"]["folderId"], json!("default"));
    }

    #[test]
    fn child_logger_merges_base_fields() {
        let sink = Arc::new(MemoryLogSink::default());
        let logger = JsonLogger::new(sink.clone())
            .with_base_fields(field("component", json!("tree_sync")));

        let child = logger.child(field("correlationId", json!("req_123")));
        child.info("ignoreTree.update.applied", "Tree updated", None);

        let lines = sink.take_json();
        assert_eq!(lines[0]["fields"]["component"], json!("tree_sync"));
        assert_eq!(lines[0]["fields"]["correlationId"], json!("req_123"));
    }
}
