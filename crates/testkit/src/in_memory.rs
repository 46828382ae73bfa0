//! In-memory port implementations for tests.
//!
//! These implementations are intended for:
//! - Unit/integration tests of the tree sync and browser use cases
//! - Deterministic contract tests for the ports layer

use ignore_tree_ports::{
    BoxFuture, FileEntry, FolderId, ListingRequest, ListingSourcePort, LogEvent, LogFields,
    LoggerPort, TelemetryPort, TelemetryTags, TelemetryTimer, TreeRenderPort, TreeRow,
};
use ignore_tree_shared::{ErrorEnvelope, RequestContext, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A no-op logger implementation.
#[derive(Debug, Default)]
pub struct NoopLogger;

impl LoggerPort for NoopLogger {
    fn log(&self, _event: LogEvent) {}

    fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(Self)
    }
}

/// A no-op telemetry timer.
#[derive(Debug, Default)]
pub struct NoopTimer;

impl TelemetryTimer for NoopTimer {
    fn stop(&self) {}
}

/// A no-op telemetry implementation.
#[derive(Debug, Default)]
pub struct NoopTelemetry;

impl TelemetryPort for NoopTelemetry {
    fn increment_counter(&self, _name: &str, _value: u64, _tags: Option<&TelemetryTags>) {}

    fn record_timer_ms(&self, _name: &str, _duration_ms: u64, _tags: Option<&TelemetryTags>) {}

    fn start_timer(&self, _name: &str, _tags: Option<&TelemetryTags>) -> Box<dyn TelemetryTimer> {
        Box::new(NoopTimer)
    }
}

/// Logger that keeps every event; children share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl RecordingLogger {
    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().expect("logger lock").clone()
    }

    /// Recorded event names, in order.
    pub fn event_names(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|event| event.event.to_string())
            .collect()
    }

    /// True when an event named `name` was recorded.
    pub fn has_event(&self, name: &str) -> bool {
        self.events().iter().any(|event| &*event.event == name)
    }
}

impl LoggerPort for RecordingLogger {
    fn log(&self, event: LogEvent) {
        self.events.lock().expect("logger lock").push(event);
    }

    fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(self.clone())
    }
}

/// Listing source answering from a fixed table and recording every request.
///
/// Unknown folder/prefix pairs list as empty.
#[derive(Debug, Default)]
pub struct StaticListingSource {
    listings: Mutex<HashMap<(FolderId, String), Vec<FileEntry>>>,
    requests: Mutex<Vec<ListingRequest>>,
}

impl StaticListingSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `folder` at `prefix` with `entries`.
    #[must_use]
    pub fn with_listing(self, folder: &FolderId, prefix: &str, entries: Vec<FileEntry>) -> Self {
        self.set_listing(folder, prefix, entries);
        self
    }

    /// Replace the answer for `folder` at `prefix`.
    pub fn set_listing(&self, folder: &FolderId, prefix: &str, entries: Vec<FileEntry>) {
        self.listings
            .lock()
            .expect("listing lock")
            .insert((folder.clone(), prefix.to_owned()), entries);
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ListingRequest> {
        self.requests.lock().expect("request lock").clone()
    }
}

impl ListingSourcePort for StaticListingSource {
    fn list(
        &self,
        _ctx: &RequestContext,
        request: ListingRequest,
    ) -> BoxFuture<'_, Result<Vec<FileEntry>>> {
        let key = (request.folder.clone(), request.prefix.as_str().to_owned());
        let entries = self
            .listings
            .lock()
            .expect("listing lock")
            .get(&key)
            .cloned()
            .unwrap_or_default();
        self.requests.lock().expect("request lock").push(request);
        Box::pin(async move { Ok(entries) })
    }
}

/// Listing source that always fails with the same error.
#[derive(Debug, Clone)]
pub struct FailingListingSource {
    error: ErrorEnvelope,
}

impl FailingListingSource {
    /// Fail every request with `error`.
    pub const fn new(error: ErrorEnvelope) -> Self {
        Self { error }
    }
}

impl ListingSourcePort for FailingListingSource {
    fn list(
        &self,
        _ctx: &RequestContext,
        _request: ListingRequest,
    ) -> BoxFuture<'_, Result<Vec<FileEntry>>> {
        let error = self.error.clone();
        Box::pin(async move { Err(error) })
    }
}

/// One call made against a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    /// `clear()`.
    Clear,
    /// `render(folder, rows)`.
    Render {
        /// Folder rendered.
        folder: FolderId,
        /// Rows rendered.
        rows: Vec<TreeRow>,
    },
    /// `set_selected(folder, key, selected)`.
    SetSelected {
        /// Folder of the row.
        folder: FolderId,
        /// Row key.
        key: Box<str>,
        /// New checkbox state.
        selected: bool,
    },
}

/// Renderer that records calls and tracks what is on screen.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RenderCall>>,
}

impl RecordingRenderer {
    /// Create an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().expect("render lock").clone()
    }

    /// Number of `render` calls.
    pub fn render_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RenderCall::Render { .. }))
            .count()
    }

    /// Rows currently on screen, replaying every call in order.
    pub fn visible(&self) -> Vec<TreeRow> {
        let mut rows: Vec<TreeRow> = Vec::new();
        for call in self.calls() {
            match call {
                RenderCall::Clear => rows.clear(),
                RenderCall::Render { rows: rendered, .. } => rows.extend(rendered),
                RenderCall::SetSelected { key, selected, .. } => {
                    if let Some(row) = rows.iter_mut().find(|row| row.key == key) {
                        row.selected = selected;
                    }
                },
            }
        }
        rows
    }

    /// Checkbox state of the visible row `key`.
    pub fn selected(&self, key: &str) -> Option<bool> {
        self.visible()
            .iter()
            .find(|row| &*row.key == key)
            .map(|row| row.selected)
    }
}

impl TreeRenderPort for RecordingRenderer {
    fn clear(&self) {
        self.calls.lock().expect("render lock").push(RenderCall::Clear);
    }

    fn render(&self, folder: &FolderId, rows: &[TreeRow]) {
        self.calls.lock().expect("render lock").push(RenderCall::Render {
            folder: folder.clone(),
            rows: rows.to_vec(),
        });
    }

    fn set_selected(&self, folder: &FolderId, key: &str, selected: bool) {
        self.calls
            .lock()
            .expect("render lock")
            .push(RenderCall::SetSelected {
                folder: folder.clone(),
                key: key.into(),
                selected,
            });
    }
}
