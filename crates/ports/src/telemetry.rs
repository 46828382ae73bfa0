//! Telemetry boundary contract (counters and timings).

use std::collections::BTreeMap;

/// Metric names emitted by the tree use cases.
pub mod metric {
    /// Timer around one `refresh`, from request to render.
    pub const REFRESH_TOTAL: &str = "ignoreTree.refresh.total";
    /// Counter of refresh results dropped because a newer refresh started.
    pub const REFRESH_SUPERSEDED: &str = "ignoreTree.refresh.superseded";
    /// Counter of failed listing fetches.
    pub const REFRESH_FAILED: &str = "ignoreTree.refresh.failed";
    /// Counter of applied toggles.
    pub const TOGGLE_EXECUTED: &str = "ignoreTree.toggle.executed";
}

/// Telemetry tags. Keep tags low-cardinality (folder ids, outcomes).
pub type TelemetryTags = BTreeMap<Box<str>, Box<str>>;

/// Timer handle.
pub trait TelemetryTimer: Send + Sync {
    /// Stop the timer and record its duration.
    fn stop(&self);
}

/// Boundary contract for telemetry.
pub trait TelemetryPort: Send + Sync {
    /// Increment a counter by `value`.
    fn increment_counter(&self, name: &str, value: u64, tags: Option<&TelemetryTags>);

    /// Record a duration in milliseconds.
    fn record_timer_ms(&self, name: &str, duration_ms: u64, tags: Option<&TelemetryTags>);

    /// Start a timer that records on `stop()`.
    fn start_timer(&self, name: &str, tags: Option<&TelemetryTags>) -> Box<dyn TelemetryTimer>;
}

/// Single-entry tag map.
#[must_use]
pub fn tag(name: &str, value: &str) -> TelemetryTags {
    let mut tags = TelemetryTags::new();
    tags.insert(name.into(), value.into());
    tags
}
