//! Overlapping refreshes: only the latest request may paint the tree.

use ignore_tree_adapters::{InMemoryPatternStore, InMemoryTelemetry};
use ignore_tree_app::{RefreshOutcome, TreeSync, TreeSyncDeps, TreeSyncSettings};
use ignore_tree_domain::{FolderId, TreeState};
use ignore_tree_ports::{ListingPrefix, metric};
use ignore_tree_shared::{ErrorCode, RequestContext, Result};
use ignore_tree_testkit::errors::listing_unavailable_error;
use ignore_tree_testkit::fixtures::{PHOTOS_MUSIC_PATTERNS, dirs, folder, root_listing};
use ignore_tree_testkit::{GatedListingSource, RecordingLogger, RecordingRenderer};
use std::sync::Arc;
use std::time::Duration;

struct Scenario {
    default: FolderId,
    music: FolderId,
    source: Arc<GatedListingSource>,
    renderer: Arc<RecordingRenderer>,
    telemetry: InMemoryTelemetry,
    logger: RecordingLogger,
    sync: TreeSync,
}

fn scenario(settings: TreeSyncSettings) -> Result<Scenario> {
    let default = folder("default")?;
    let music = folder("music")?;
    let source = Arc::new(GatedListingSource::new());
    let renderer = Arc::new(RecordingRenderer::new());
    let telemetry = InMemoryTelemetry::new();
    let logger = RecordingLogger::default();
    let store = InMemoryPatternStore::default().with_text(&default, PHOTOS_MUSIC_PATTERNS);
    let sync = TreeSync::new(
        TreeSyncDeps {
            listing: source.clone(),
            store: Arc::new(store),
            renderer: renderer.clone(),
            logger: Some(Arc::new(logger.clone())),
            telemetry: Some(Arc::new(telemetry.clone())),
        },
        settings,
    );
    Ok(Scenario {
        default,
        music,
        source,
        renderer,
        telemetry,
        logger,
        sync,
    })
}

#[tokio::test]
async fn late_answer_for_previous_folder_is_dropped() -> Result<()> {
    let s = scenario(TreeSyncSettings::default())?;
    let ctx = RequestContext::new_request();
    let default_rows = root_listing()?;

    let (first, second) = tokio::join!(
        s.sync.refresh(&ctx, &s.default, ListingPrefix::root()),
        async {
            s.source.wait_for_requests(1).await;
            let release_music = async {
                s.source.wait_for_requests(2).await;
                s.source.release(&s.music, Ok(Vec::new()))
            };
            let (outcome, released) = tokio::join!(
                s.sync.refresh(&ctx, &s.music, ListingPrefix::root()),
                release_music
            );
            assert!(released);
            assert!(s.source.release(&s.default, Ok(default_rows)));
            outcome
        }
    );

    assert_eq!(first?, RefreshOutcome::Superseded);
    assert_eq!(second?, RefreshOutcome::Rendered { rows: 0 });
    assert_eq!(s.sync.rendered_folder()?, Some(s.music.clone()));
    assert!(s.sync.rows()?.is_empty());
    assert_eq!(s.sync.state(&s.music)?, TreeState::Rendered);
    assert_eq!(s.sync.state(&s.default)?, TreeState::Unloaded);
    assert_eq!(s.renderer.render_count(), 1);
    assert!(s.renderer.visible().is_empty());
    assert_eq!(s.telemetry.counter(metric::REFRESH_SUPERSEDED), 1);
    assert_eq!(s.telemetry.timer_count(metric::REFRESH_TOTAL), 2);
    assert!(s.logger.has_event("ignoreTree.refresh.superseded"));
    Ok(())
}

#[tokio::test]
async fn only_the_latest_refresh_of_one_folder_renders() -> Result<()> {
    let s = scenario(TreeSyncSettings::default())?;
    let ctx = RequestContext::new_request();
    let stale = dirs(None, &["Old"])?;
    let fresh = root_listing()?;

    let (first, second) = tokio::join!(
        s.sync.refresh(&ctx, &s.default, ListingPrefix::root()),
        async {
            s.source.wait_for_requests(1).await;
            let release_both = async {
                s.source.wait_for_requests(2).await;
                s.source.release(&s.default, Ok(stale)) && s.source.release(&s.default, Ok(fresh))
            };
            let (outcome, released) = tokio::join!(
                s.sync.refresh(&ctx, &s.default, ListingPrefix::root()),
                release_both
            );
            assert!(released);
            outcome
        }
    );

    assert_eq!(first?, RefreshOutcome::Superseded);
    assert_eq!(second?, RefreshOutcome::Rendered { rows: 3 });
    let keys: Vec<String> = s
        .renderer
        .visible()
        .iter()
        .map(|row| row.key.to_string())
        .collect();
    assert_eq!(keys, ["Backups", "Music", "Photos"]);
    assert_eq!(s.sync.state(&s.default)?, TreeState::Rendered);
    Ok(())
}

#[tokio::test]
async fn failed_refresh_keeps_the_rendered_tree() -> Result<()> {
    let s = scenario(TreeSyncSettings::default())?;
    let ctx = RequestContext::new_request();
    let rows = root_listing()?;

    let (rendered, released) = tokio::join!(
        s.sync.refresh(&ctx, &s.default, ListingPrefix::root()),
        async {
            s.source.wait_for_requests(1).await;
            s.source.release(&s.default, Ok(rows))
        }
    );
    assert!(released);
    assert_eq!(rendered?, RefreshOutcome::Rendered { rows: 3 });

    let (failed, released) = tokio::join!(
        s.sync.refresh(&ctx, &s.default, ListingPrefix::root()),
        async {
            s.source.wait_for_requests(2).await;
            s.source.release(&s.default, Err(listing_unavailable_error()))
        }
    );
    assert!(released);

    assert_eq!(failed.err(), Some(listing_unavailable_error()));
    assert_eq!(s.sync.state(&s.default)?, TreeState::Rendered);
    assert_eq!(s.sync.rows()?.len(), 3);
    assert_eq!(s.renderer.visible().len(), 3);
    assert_eq!(s.telemetry.counter(metric::REFRESH_FAILED), 1);
    assert!(s.logger.has_event("ignoreTree.refresh.failed"));
    Ok(())
}

#[tokio::test]
async fn update_waits_for_a_loading_folder() -> Result<()> {
    let s = scenario(TreeSyncSettings::default())?;
    let ctx = RequestContext::new_request();
    let first_rows = root_listing()?;
    let second_rows = root_listing()?;

    let (rendered, released) = tokio::join!(
        s.sync.refresh(&ctx, &s.default, ListingPrefix::root()),
        async {
            s.source.wait_for_requests(1).await;
            s.source.release(&s.default, Ok(first_rows))
        }
    );
    assert!(released);
    rendered?;
    let calls_before = s.renderer.calls().len();

    let (reloaded, during) = tokio::join!(
        s.sync.refresh(&ctx, &s.default, ListingPrefix::root()),
        async {
            s.source.wait_for_requests(2).await;
            let state = s.sync.state(&s.default);
            let updated = s.sync.update();
            s.source.release(&s.default, Ok(second_rows));
            (state, updated)
        }
    );

    let (state, updated) = during;
    assert_eq!(state?, TreeState::Loading);
    updated?;
    assert!(s.logger.has_event("ignoreTree.update.noop"));
    assert_eq!(reloaded?, RefreshOutcome::Rendered { rows: 3 });
    // clear + render from the reload, nothing from the skipped update
    assert_eq!(s.renderer.calls().len(), calls_before + 2);
    Ok(())
}

#[tokio::test]
async fn cancelled_refresh_is_aborted() -> Result<()> {
    let s = scenario(TreeSyncSettings::default())?;
    let ctx = RequestContext::new_request();

    let (outcome, ()) = tokio::join!(
        s.sync.refresh(&ctx, &s.default, ListingPrefix::root()),
        async {
            s.source.wait_for_requests(1).await;
            ctx.cancel();
        }
    );

    assert!(outcome.err().is_some_and(|error| error.is_cancelled()));
    assert_eq!(s.sync.state(&s.default)?, TreeState::Unloaded);
    assert!(s.logger.has_event("ignoreTree.refresh.aborted"));
    assert_eq!(s.telemetry.counter(metric::REFRESH_FAILED), 0);
    Ok(())
}

#[tokio::test]
async fn slow_listing_times_out() -> Result<()> {
    let s = scenario(TreeSyncSettings {
        listing_timeout: Duration::from_millis(20),
        levels: 0,
    })?;

    let outcome = s
        .sync
        .refresh(&RequestContext::new_request(), &s.default, ListingPrefix::root())
        .await;

    assert_eq!(
        outcome.err().map(|error| error.code),
        Some(ErrorCode::timeout())
    );
    assert_eq!(s.sync.state(&s.default)?, TreeState::Unloaded);
    assert_eq!(s.source.pending(), 1);
    Ok(())
}
