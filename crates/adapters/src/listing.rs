//! Local filesystem listing source.

use ignore_tree_ports::{BoxFuture, FileEntry, FolderId, ListingRequest, ListingSourcePort};
use ignore_tree_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Lists folders from directories on the local disk using async IO.
///
/// Entries at each level are sorted by name. With `levels > 0` each
/// directory is followed by its descendants, depth first. Names that are not
/// valid UTF-8 are skipped.
#[derive(Debug, Clone, Default)]
pub struct LocalListingSource {
    roots: HashMap<FolderId, PathBuf>,
}

impl LocalListingSource {
    /// Create a source with no folders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `folder` to the directory `root`.
    #[must_use]
    pub fn with_folder(mut self, folder: FolderId, root: impl Into<PathBuf>) -> Self {
        self.roots.insert(folder, root.into());
        self
    }
}

impl ListingSourcePort for LocalListingSource {
    fn list(
        &self,
        ctx: &RequestContext,
        request: ListingRequest,
    ) -> BoxFuture<'_, Result<Vec<FileEntry>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let root = self.roots.get(&request.folder).ok_or_else(|| {
                ErrorEnvelope::expected(ErrorCode::not_found(), "unknown folder")
                    .with_metadata("folderId", request.folder.as_str())
            })?;
            let start = root.join(request.prefix.as_str());
            let metadata = tokio::fs::metadata(&start).await.map_err(|error| {
                ErrorEnvelope::from(error).with_metadata("prefix", request.prefix.as_str())
            })?;
            if !metadata.is_dir() {
                return Err(ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "listing prefix is not a directory",
                )
                .with_metadata("prefix", request.prefix.as_str()));
            }

            let mut entries = Vec::new();
            // (directory on disk, root-relative parent, remaining depth)
            let mut pending = vec![(
                start,
                request.prefix.as_parent().map(str::to_owned),
                request.levels,
            )];
            while let Some((dir, parent, depth)) = pending.pop() {
                ctx.ensure_not_cancelled("local_listing.list")?;
                for (name, is_dir) in read_sorted(&dir).await? {
                    let entry = FileEntry::under(parent.as_deref(), &name, !is_dir)?;
                    if is_dir && depth > 0 {
                        pending.push((dir.join(&name), Some(entry.path.to_string()), depth - 1));
                    }
                    entries.push(entry);
                }
            }
            Ok(order_depth_first(entries))
        })
    }
}

async fn read_sorted(dir: &Path) -> Result<Vec<(String, bool)>> {
    let mut read_dir = tokio::fs::read_dir(dir).await.map_err(ErrorEnvelope::from)?;
    let mut children = Vec::new();
    while let Some(entry) = read_dir.next_entry().await.map_err(ErrorEnvelope::from)? {
        let file_type = entry.file_type().await.map_err(ErrorEnvelope::from)?;
        if !(file_type.is_file() || file_type.is_dir()) {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            // A lossy name would not match the file on disk.
            tracing::warn!(
                target: "ignore_tree",
                event = "ignoreTree.listing.skipped",
                path = %entry.path().display(),
                "skipping entry whose name is not valid UTF-8"
            );
            continue;
        };
        children.push((name, file_type.is_dir()));
    }
    children.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(children)
}

/// Order entries so each directory is immediately followed by its subtree.
fn order_depth_first(mut entries: Vec<FileEntry>) -> Vec<FileEntry> {
    entries.sort_by(|a, b| a.path.split('/').cmp(b.path.split('/')));
    entries
}
