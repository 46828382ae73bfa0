//! Telemetry adapters: JSON-line metrics and an in-memory recorder.

use crate::log_sink::LogSink;
use crate::logger::now_epoch_ms;
use ignore_tree_ports::{TelemetryPort, TelemetryTags, TelemetryTimer};
use ignore_tree_shared::{REDACTED, is_secret_key};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

const SERIALIZE_FAILED_LINE: &str = "{\"type\":\"metric\",\"metricType\":\"error\",\"name\":\"telemetry.serialize_failed\",\"value\":1}\n";

/// Telemetry adapter that writes one JSON metric per line.
#[derive(Clone)]
pub struct JsonTelemetry {
    sink: Arc<dyn LogSink>,
    base_tags: TelemetryTags,
}

impl JsonTelemetry {
    /// Create a telemetry adapter backed by `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_tags: TelemetryTags::new(),
        }
    }

    /// Set base tags applied to every metric.
    #[must_use]
    pub fn with_base_tags(mut self, tags: TelemetryTags) -> Self {
        self.base_tags = tags;
        self
    }
}

impl TelemetryPort for JsonTelemetry {
    fn increment_counter(&self, name: &str, value: u64, tags: Option<&TelemetryTags>) {
        let tags = merge_tags(&self.base_tags, tags);
        self.sink
            .write_line(&metric_line("counter", name, value, None, &tags));
    }

    fn record_timer_ms(&self, name: &str, duration_ms: u64, tags: Option<&TelemetryTags>) {
        let tags = merge_tags(&self.base_tags, tags);
        self.sink
            .write_line(&metric_line("timer", name, duration_ms, Some("ms"), &tags));
    }

    fn start_timer(&self, name: &str, tags: Option<&TelemetryTags>) -> Box<dyn TelemetryTimer> {
        let telemetry: Arc<dyn TelemetryPort> = Arc::new(self.clone());
        Box::new(StopwatchTimer::new(telemetry, name, tags.cloned()))
    }
}

/// Recorded counters and timers, for hosts and tests that inspect them.
///
/// Clones share the same recordings.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTelemetry {
    recorded: Arc<Recorded>,
}

#[derive(Debug, Default)]
struct Recorded {
    counters: Mutex<BTreeMap<Box<str>, u64>>,
    timers: Mutex<Vec<(Box<str>, u64)>>,
}

impl InMemoryTelemetry {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all increments recorded under `name`.
    pub fn counter(&self, name: &str) -> u64 {
        self.recorded
            .counters
            .lock()
            .ok()
            .and_then(|counters| counters.get(name).copied())
            .unwrap_or_default()
    }

    /// Number of timings recorded under `name`.
    pub fn timer_count(&self, name: &str) -> usize {
        self.recorded
            .timers
            .lock()
            .map(|timers| timers.iter().filter(|(timer, _)| &**timer == name).count())
            .unwrap_or_default()
    }
}

impl TelemetryPort for InMemoryTelemetry {
    fn increment_counter(&self, name: &str, value: u64, _tags: Option<&TelemetryTags>) {
        if let Ok(mut counters) = self.recorded.counters.lock() {
            let entry = counters.entry(name.into()).or_default();
            *entry = entry.saturating_add(value);
        }
    }

    fn record_timer_ms(&self, name: &str, duration_ms: u64, _tags: Option<&TelemetryTags>) {
        if let Ok(mut timers) = self.recorded.timers.lock() {
            timers.push((name.into(), duration_ms));
        }
    }

    fn start_timer(&self, name: &str, tags: Option<&TelemetryTags>) -> Box<dyn TelemetryTimer> {
        let telemetry: Arc<dyn TelemetryPort> = Arc::new(self.clone());
        Box::new(StopwatchTimer::new(telemetry, name, tags.cloned()))
    }
}

/// Timer that reports its elapsed time once, on the first `stop`.
struct StopwatchTimer {
    telemetry: Arc<dyn TelemetryPort>,
    name: Box<str>,
    tags: Option<TelemetryTags>,
    started_at: Instant,
    stopped: AtomicBool,
}

impl StopwatchTimer {
    fn new(telemetry: Arc<dyn TelemetryPort>, name: &str, tags: Option<TelemetryTags>) -> Self {
        Self {
            telemetry,
            name: name.into(),
            tags,
            started_at: Instant::now(),
            stopped: AtomicBool::new(false),
        }
    }
}

impl TelemetryTimer for StopwatchTimer {
    fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let duration_ms =
            u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.telemetry
            .record_timer_ms(&self.name, duration_ms, self.tags.as_ref());
    }
}

fn metric_line(
    metric_type: &str,
    name: &str,
    value: u64,
    unit: Option<&str>,
    tags: &TelemetryTags,
) -> String {
    let mut payload = Map::new();
    payload.insert("type".to_owned(), Value::from("metric"));
    payload.insert("timestampMs".to_owned(), Value::from(now_epoch_ms()));
    payload.insert("metricType".to_owned(), Value::from(metric_type));
    payload.insert("name".to_owned(), Value::from(name));
    payload.insert("value".to_owned(), Value::from(value));
    if let Some(unit) = unit {
        payload.insert("unit".to_owned(), Value::from(unit));
    }
    if !tags.is_empty() {
        let tags = tags
            .iter()
            .map(|(key, value)| (key.to_string(), Value::from(&**value)))
            .collect::<Map<_, _>>();
        payload.insert("tags".to_owned(), Value::Object(tags));
    }
    serde_json::to_string(&Value::Object(payload)).map_or_else(
        |_| SERIALIZE_FAILED_LINE.to_owned(),
        |mut encoded| {
            encoded.push('\n');
            encoded
        },
    )
}

fn merge_tags(base: &TelemetryTags, extra: Option<&TelemetryTags>) -> TelemetryTags {
    let mut merged = base.clone();
    if let Some(extra) = extra {
        merged.extend(extra.iter().map(|(key, value)| (key.clone(), value.clone())));
    }
    for (key, value) in &mut merged {
        if is_secret_key(key) {
            *value = REDACTED.into();
        }
    }
    merged
}
