//! Keep a rendered tree consistent with listings and match records.
//!
//! `refresh` is the only suspension point. Each call takes a generation stamp
//! before awaiting the listing; a result whose stamp is no longer the latest
//! is dropped without touching rows or the index. `update` is synchronous and
//! only flips checkbox state on rows that are already rendered.

use crate::match_index::{MatchIndex, SharedMatchIndex, lock_index};
use ignore_tree_domain::{FileEntry, FolderId, MatchRecord, TreeState};
use ignore_tree_ports::{
    ListingPrefix, ListingRequest, ListingSourcePort, LoggerPort, PatternStorePort,
    TelemetryPort, TreeRenderPort, TreeRow, metric, tag,
};
use ignore_tree_shared::{
    ErrorCode, ErrorEnvelope, RequestContext, Result, timeout_with_context,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Collaborators used by the tree sync.
#[derive(Clone)]
pub struct TreeSyncDeps {
    /// Listing source.
    pub listing: Arc<dyn ListingSourcePort>,
    /// Pattern store (read for every render).
    pub store: Arc<dyn PatternStorePort>,
    /// Visual tree.
    pub renderer: Arc<dyn TreeRenderPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
    /// Optional telemetry sink.
    pub telemetry: Option<Arc<dyn TelemetryPort>>,
}

/// Listing parameters applied to every refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSyncSettings {
    /// Deadline for one listing fetch.
    pub listing_timeout: Duration,
    /// Extra depth requested below the prefix.
    pub levels: u32,
}

impl Default for TreeSyncSettings {
    fn default() -> Self {
        Self {
            listing_timeout: Duration::from_secs(30),
            levels: 0,
        }
    }
}

/// How a `refresh` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The listing was rendered.
    Rendered {
        /// Number of rows on screen.
        rows: usize,
    },
    /// A newer refresh started first; this result was dropped.
    Superseded,
}

#[derive(Debug)]
struct RenderedTree {
    folder: FolderId,
    rows: Vec<TreeRow>,
}

#[derive(Debug, Default)]
struct SyncState {
    generation: u64,
    latest_folder: Option<FolderId>,
    states: HashMap<FolderId, TreeState>,
    rendered: Option<RenderedTree>,
}

impl SyncState {
    fn is_rendered_for(&self, folder: &FolderId) -> bool {
        self.rendered
            .as_ref()
            .is_some_and(|tree| &tree.folder == folder)
    }

    /// Put `folder` back to whatever its rows say after a dropped or failed refresh.
    fn settle(&mut self, folder: &FolderId) {
        let state = if self.is_rendered_for(folder) {
            TreeState::Rendered
        } else {
            TreeState::Unloaded
        };
        self.states.insert(folder.clone(), state);
    }
}

/// Tree synchronizer bound to one renderer.
pub struct TreeSync {
    deps: TreeSyncDeps,
    settings: TreeSyncSettings,
    index: SharedMatchIndex,
    state: Mutex<SyncState>,
}

impl TreeSync {
    /// Create a tree sync with its own match index.
    #[must_use]
    pub fn new(deps: TreeSyncDeps, settings: TreeSyncSettings) -> Self {
        Self::with_index(deps, settings, Arc::new(Mutex::new(MatchIndex::new())))
    }

    /// Create a tree sync over an existing shared index.
    #[must_use]
    pub fn with_index(
        deps: TreeSyncDeps,
        settings: TreeSyncSettings,
        index: SharedMatchIndex,
    ) -> Self {
        Self {
            deps,
            settings,
            index,
            state: Mutex::new(SyncState::default()),
        }
    }

    /// The match index rows are bound to.
    #[must_use]
    pub fn index(&self) -> SharedMatchIndex {
        Arc::clone(&self.index)
    }

    /// Collaborators.
    #[must_use]
    pub const fn deps(&self) -> &TreeSyncDeps {
        &self.deps
    }

    /// Listing parameters.
    #[must_use]
    pub const fn settings(&self) -> TreeSyncSettings {
        self.settings
    }

    /// Fetch `folder`'s listing under `prefix` and render it.
    ///
    /// Listing failures propagate and leave any rendered tree in place.
    pub async fn refresh(
        &self,
        ctx: &RequestContext,
        folder: &FolderId,
        prefix: ListingPrefix,
    ) -> Result<RefreshOutcome> {
        let stamp = self.begin(folder)?;
        let started_at = Instant::now();
        let tags = tag("folderId", folder.as_str());
        let total_timer = self
            .deps
            .telemetry
            .as_ref()
            .map(|telemetry| telemetry.start_timer(metric::REFRESH_TOTAL, Some(&tags)));

        if let Some(logger) = self.deps.logger.as_ref() {
            logger.info(
                "ignoreTree.refresh.start",
                "Tree refresh started",
                Some(log_fields_start(folder, &prefix, stamp)),
            );
        }

        let request = ListingRequest::new(folder.clone())
            .with_prefix(prefix.clone())
            .with_levels(self.settings.levels);
        let listed = timeout_with_context(
            ctx,
            self.settings.listing_timeout,
            "tree_sync.refresh",
            self.deps.listing.list(ctx, request),
        )
        .await;

        let outcome = self.finish(folder, stamp, listed);

        if let Some(timer) = total_timer.as_ref() {
            timer.stop();
        }
        self.report(folder, &prefix, started_at, &outcome);
        outcome
    }

    /// Re-apply checkbox state from the index to the rendered rows.
    ///
    /// A no-op when nothing is rendered or the rendered folder is reloading.
    pub fn update(&self) -> Result<()> {
        let mut state = self.lock_state()?;
        let Some(folder) = state.rendered.as_ref().map(|tree| tree.folder.clone()) else {
            self.log_update_noop("no tree rendered");
            return Ok(());
        };
        if state.states.get(&folder) != Some(&TreeState::Rendered) {
            self.log_update_noop("tree is reloading");
            return Ok(());
        }

        let index = lock_index(&self.index)?;
        let ignored: HashMap<&str, bool> = index
            .for_folder(&folder)
            .iter()
            .map(|record| (&*record.file.path, record.is_ignored()))
            .collect();

        let mut changed = 0_usize;
        if let Some(tree) = state.rendered.as_mut() {
            for row in &mut tree.rows {
                let Some(is_ignored) = ignored.get(&*row.key) else {
                    continue;
                };
                let selected = !is_ignored;
                if row.selected != selected {
                    row.selected = selected;
                    self.deps.renderer.set_selected(&folder, &row.key, selected);
                    changed += 1;
                }
            }
        }

        if let Some(logger) = self.deps.logger.as_ref() {
            logger.debug(
                "ignoreTree.update.applied",
                "Tree checkbox state updated",
                Some(log_fields_update(&folder, changed)),
            );
        }
        Ok(())
    }

    /// Lifecycle state of `folder`'s tree.
    pub fn state(&self, folder: &FolderId) -> Result<TreeState> {
        Ok(self
            .lock_state()?
            .states
            .get(folder)
            .copied()
            .unwrap_or_default())
    }

    /// Folder whose rows are currently rendered.
    pub fn rendered_folder(&self) -> Result<Option<FolderId>> {
        Ok(self
            .lock_state()?
            .rendered
            .as_ref()
            .map(|tree| tree.folder.clone()))
    }

    /// Snapshot of the rendered rows (empty when nothing is rendered).
    pub fn rows(&self) -> Result<Vec<TreeRow>> {
        Ok(self
            .lock_state()?
            .rendered
            .as_ref()
            .map(|tree| tree.rows.clone())
            .unwrap_or_default())
    }

    fn begin(&self, folder: &FolderId) -> Result<u64> {
        let mut state = self.lock_state()?;
        state.generation = state.generation.saturating_add(1);
        state.latest_folder = Some(folder.clone());
        state.states.insert(folder.clone(), TreeState::Loading);
        Ok(state.generation)
    }

    fn finish(
        &self,
        folder: &FolderId,
        stamp: u64,
        listed: Result<Vec<FileEntry>>,
    ) -> Result<RefreshOutcome> {
        let mut state = self.lock_state()?;
        if state.generation != stamp {
            if state.latest_folder.as_ref() != Some(folder) {
                state.settle(folder);
            }
            return Ok(RefreshOutcome::Superseded);
        }

        let rows = match listed.and_then(|files| self.resolve_rows(folder, files)) {
            Ok(rows) => rows,
            Err(error) => {
                state.settle(folder);
                return Err(error);
            },
        };

        if let Some(previous) = state.rendered.take() {
            self.deps.renderer.clear();
            if &previous.folder != folder {
                state.states.insert(previous.folder, TreeState::Unloaded);
            }
        }
        self.deps.renderer.render(folder, &rows);

        let count = rows.len();
        state.rendered = Some(RenderedTree {
            folder: folder.clone(),
            rows,
        });
        state.states.insert(folder.clone(), TreeState::Rendered);
        Ok(RefreshOutcome::Rendered { rows: count })
    }

    fn resolve_rows(&self, folder: &FolderId, files: Vec<FileEntry>) -> Result<Vec<TreeRow>> {
        let patterns = self.deps.store.patterns(folder)?.to_patterns();
        let mut index = lock_index(&self.index)?;
        Ok(index
            .recompute(folder, files, &patterns)
            .iter()
            .map(row_for)
            .collect())
    }

    fn report(
        &self,
        folder: &FolderId,
        prefix: &ListingPrefix,
        started_at: Instant,
        outcome: &Result<RefreshOutcome>,
    ) {
        let duration_ms = duration_ms(started_at);
        let tags = tag("folderId", folder.as_str());
        match outcome {
            Ok(RefreshOutcome::Rendered { rows }) => {
                if let Some(logger) = self.deps.logger.as_ref() {
                    logger.info(
                        "ignoreTree.refresh.completed",
                        "Tree refresh completed",
                        Some(log_fields_completed(folder, prefix, *rows, duration_ms)),
                    );
                }
            },
            Ok(RefreshOutcome::Superseded) => {
                if let Some(telemetry) = self.deps.telemetry.as_ref() {
                    telemetry.increment_counter(metric::REFRESH_SUPERSEDED, 1, Some(&tags));
                }
                if let Some(logger) = self.deps.logger.as_ref() {
                    logger.info(
                        "ignoreTree.refresh.superseded",
                        "Stale tree refresh dropped",
                        Some(log_fields_start(folder, prefix, 0)),
                    );
                }
            },
            Err(error) if error.is_cancelled() => {
                if let Some(logger) = self.deps.logger.as_ref() {
                    logger.info(
                        "ignoreTree.refresh.aborted",
                        "Tree refresh aborted",
                        Some(log_fields_start(folder, prefix, 0)),
                    );
                }
            },
            Err(error) => {
                if let Some(telemetry) = self.deps.telemetry.as_ref() {
                    telemetry.increment_counter(metric::REFRESH_FAILED, 1, Some(&tags));
                }
                if let Some(logger) = self.deps.logger.as_ref() {
                    logger.warn_failure(
                        "ignoreTree.refresh.failed",
                        "Tree refresh failed; keeping the rendered tree",
                        error,
                        Some(log_fields_completed(folder, prefix, 0, duration_ms)),
                    );
                }
            },
        }
    }

    fn log_update_noop(&self, reason: &str) {
        if let Some(logger) = self.deps.logger.as_ref() {
            let mut fields = BTreeMap::new();
            fields.insert("reason".into(), Value::String(reason.to_owned()));
            logger.debug("ignoreTree.update.noop", "Tree update skipped", Some(fields));
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, SyncState>> {
        self.state.lock().map_err(|_| {
            ErrorEnvelope::invariant(ErrorCode::internal(), "tree sync state lock poisoned")
        })
    }
}

/// Row for a resolved record. Checked means included.
#[must_use]
pub fn row_for(record: &MatchRecord) -> TreeRow {
    TreeRow {
        key: record.file.path.clone(),
        title: record.file.name.clone(),
        is_folder: !record.file.is_file,
        selected: !record.is_ignored(),
    }
}

fn duration_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn log_fields_start(
    folder: &FolderId,
    prefix: &ListingPrefix,
    generation: u64,
) -> BTreeMap<Box<str>, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("folderId".into(), Value::String(folder.as_str().to_owned()));
    fields.insert("prefix".into(), Value::String(prefix.as_str().to_owned()));
    if generation > 0 {
        fields.insert("generation".into(), Value::from(generation));
    }
    fields
}

fn log_fields_completed(
    folder: &FolderId,
    prefix: &ListingPrefix,
    rows: usize,
    duration_ms: u64,
) -> BTreeMap<Box<str>, Value> {
    let mut fields = log_fields_start(folder, prefix, 0);
    fields.insert("rows".into(), Value::from(rows));
    fields.insert("durationMs".into(), Value::from(duration_ms));
    fields
}

fn log_fields_update(folder: &FolderId, changed: usize) -> BTreeMap<Box<str>, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("folderId".into(), Value::String(folder.as_str().to_owned()));
    fields.insert("changedRows".into(), Value::from(changed));
    fields
}
