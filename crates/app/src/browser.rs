//! Ignore-pattern browser use case.
//!
//! Binds a [`TreeSync`] to user actions: choosing a folder, navigating into a
//! prefix, toggling a row and reacting to pattern edits made elsewhere.

use crate::match_index::lock_index;
use crate::tree_sync::{RefreshOutcome, TreeSync};
use ignore_tree_domain::{FolderId, MatchRecord, ToggleEdit};
use ignore_tree_ports::{ListingPrefix, metric, tag};
use ignore_tree_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Browser state for one settings view.
pub struct IgnoreBrowser {
    sync: Arc<TreeSync>,
    current: Mutex<Option<FolderId>>,
}

impl IgnoreBrowser {
    /// Create a browser with no folder selected.
    #[must_use]
    pub fn new(sync: Arc<TreeSync>) -> Self {
        Self {
            sync,
            current: Mutex::new(None),
        }
    }

    /// The underlying tree sync.
    #[must_use]
    pub fn sync(&self) -> &TreeSync {
        &self.sync
    }

    /// Select the folder being edited. `None` clears the selection.
    pub fn set_current_folder(&self, folder: Option<FolderId>) -> Result<()> {
        *self.lock_current()? = folder;
        Ok(())
    }

    /// Currently selected folder.
    pub fn current_folder(&self) -> Result<Option<FolderId>> {
        Ok(self.lock_current()?.clone())
    }

    /// List `folder` under `prefix` and render it.
    pub async fn navigate(
        &self,
        ctx: &RequestContext,
        folder: &FolderId,
        prefix: &str,
    ) -> Result<RefreshOutcome> {
        let prefix = ListingPrefix::parse(prefix)?;
        self.sync.refresh(ctx, folder, prefix).await
    }

    /// Refresh the currently selected folder at the root.
    ///
    /// Without a selected folder there is nothing to list.
    pub async fn reload(&self, ctx: &RequestContext) -> Result<Option<RefreshOutcome>> {
        let Some(folder) = self.current_folder()? else {
            return Ok(None);
        };
        let outcome = self
            .sync
            .refresh(ctx, &folder, ListingPrefix::root())
            .await?;
        Ok(Some(outcome))
    }

    /// Flip whether `record`'s file is ignored, then repaint the tree.
    pub fn toggle(&self, folder: &FolderId, record: &MatchRecord) -> Result<ToggleEdit> {
        let deps = self.sync.deps();
        let edit = {
            let index_handle = self.sync.index();
            let index = lock_index(&index_handle)?;
            index.toggle(deps.store.as_ref(), folder, record)?
        };
        self.patterns_changed(folder)?;

        if let Some(telemetry) = deps.telemetry.as_ref() {
            telemetry.increment_counter(
                metric::TOGGLE_EXECUTED,
                1,
                Some(&tag("folderId", folder.as_str())),
            );
        }
        if let Some(logger) = deps.logger.as_ref() {
            logger.info(
                "ignoreTree.toggle.applied",
                "Toggle applied",
                Some(log_fields_toggle(folder, record, &edit)),
            );
        }
        Ok(edit)
    }

    /// Re-resolve `folder` against the store and repaint checkboxes.
    ///
    /// Called after the pattern list changes outside a toggle.
    pub fn patterns_changed(&self, folder: &FolderId) -> Result<()> {
        let patterns = self.sync.deps().store.patterns(folder)?.to_patterns();
        {
            let index_handle = self.sync.index();
            let mut index = lock_index(&index_handle)?;
            index.reresolve(folder, &patterns)?;
        }
        self.sync.update()
    }

    /// Snapshot of the records for `folder`.
    pub fn records(&self, folder: &FolderId) -> Result<Vec<MatchRecord>> {
        let index_handle = self.sync.index();
        let index = lock_index(&index_handle)?;
        Ok(index.for_folder(folder).to_vec())
    }

    /// Record for `path` in `folder`.
    pub fn record(&self, folder: &FolderId, path: &str) -> Result<MatchRecord> {
        let index_handle = self.sync.index();
        let index = lock_index(&index_handle)?;
        index.record(folder, path).cloned().ok_or_else(|| {
            ErrorEnvelope::expected(ErrorCode::not_found(), "no record for path")
                .with_metadata("folderId", folder.as_str())
                .with_metadata("path", path)
        })
    }

    fn lock_current(&self) -> Result<MutexGuard<'_, Option<FolderId>>> {
        self.current.lock().map_err(|_| {
            ErrorEnvelope::invariant(ErrorCode::internal(), "current folder lock poisoned")
        })
    }
}

fn log_fields_toggle(
    folder: &FolderId,
    record: &MatchRecord,
    edit: &ToggleEdit,
) -> BTreeMap<Box<str>, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("folderId".into(), Value::String(folder.as_str().to_owned()));
    fields.insert("path".into(), Value::String(record.file.path.to_string()));
    let op = match edit {
        ToggleEdit::Append { negated: false, .. } => "append_ignore",
        ToggleEdit::Append { negated: true, .. } => "append_include",
        ToggleEdit::Remove { .. } => "remove",
    };
    fields.insert("op".into(), Value::String(op.to_owned()));
    fields
}
