//! Contract-style tests for port traits using the testkit doubles.

use ignore_tree_ports::{
    ListingPrefix, ListingRequest, ListingSourcePort, LoggerPort, TelemetryPort, TreeRenderPort,
    TreeRow,
};
use ignore_tree_shared::{RequestContext, Result};
use ignore_tree_testkit::errors::listing_unavailable_error;
use ignore_tree_testkit::fixtures::{dirs, folder, root_listing};
use ignore_tree_testkit::{
    FailingListingSource, GatedListingSource, NoopLogger, NoopTelemetry, RecordingLogger,
    RecordingRenderer, RenderCall, StaticListingSource,
};
use std::sync::Arc;

fn row(key: &str, selected: bool) -> TreeRow {
    TreeRow {
        key: key.into(),
        title: key.into(),
        is_folder: true,
        selected,
    }
}

#[tokio::test]
async fn static_listing_answers_by_folder_and_prefix() -> Result<()> {
    let ctx = RequestContext::new_request();
    let default = folder("default")?;
    let source = StaticListingSource::new()
        .with_listing(&default, "", root_listing()?)
        .with_listing(&default, "Photos", dirs(Some("Photos"), &["Raw"])?);

    let root = source.list(&ctx, ListingRequest::new(default.clone())).await?;
    assert_eq!(root.len(), 3);

    let photos = source
        .list(
            &ctx,
            ListingRequest::new(default.clone()).with_prefix(ListingPrefix::parse("Photos")?),
        )
        .await?;
    assert_eq!(photos.first().map(|entry| &*entry.path), Some("Photos/Raw"));

    let unknown = source.list(&ctx, ListingRequest::new(folder("music")?)).await?;
    assert!(unknown.is_empty());
    assert_eq!(source.requests().len(), 3);
    Ok(())
}

#[tokio::test]
async fn failing_listing_returns_its_error() -> Result<()> {
    let source = FailingListingSource::new(listing_unavailable_error());
    let error = source
        .list(
            &RequestContext::new_request(),
            ListingRequest::new(folder("default")?),
        )
        .await
        .err();
    assert_eq!(error, Some(listing_unavailable_error()));
    Ok(())
}

#[tokio::test]
async fn gated_listing_resolves_in_release_order() -> Result<()> {
    let source = Arc::new(GatedListingSource::new());
    let ctx = RequestContext::new_request();
    let default = folder("default")?;
    let music = folder("music")?;

    let first = source.list(&ctx, ListingRequest::new(default.clone()));
    let second = source.list(&ctx, ListingRequest::new(music.clone()));
    source.wait_for_requests(2).await;
    assert_eq!(source.pending(), 2);

    assert!(source.release(&music, Ok(Vec::new())));
    assert!(source.release(&default, root_listing()));
    assert!(!source.release(&default, Ok(Vec::new())));

    assert!(second.await?.is_empty());
    assert_eq!(first.await?.len(), 3);
    Ok(())
}

#[test]
fn recording_renderer_tracks_visible_rows() -> Result<()> {
    let renderer = RecordingRenderer::new();
    let default = folder("default")?;

    renderer.render(&default, &[row("Photos", false), row("Music", true)]);
    renderer.set_selected(&default, "Photos", true);
    assert_eq!(renderer.selected("Photos"), Some(true));
    assert_eq!(renderer.render_count(), 1);

    renderer.clear();
    assert!(renderer.visible().is_empty());
    assert_eq!(renderer.calls().last(), Some(&RenderCall::Clear));
    Ok(())
}

#[test]
fn logger_and_telemetry_doubles_accept_events() {
    let logger = RecordingLogger::default();
    logger
        .child(Default::default())
        .info("ignoreTree.refresh.start", "Tree refresh started", None);
    assert!(logger.has_event("ignoreTree.refresh.start"));

    NoopLogger.warn("ignoreTree.refresh.failed", "ignored", None);
    let telemetry = NoopTelemetry;
    telemetry.increment_counter("ignoreTree.toggle.executed", 1, None);
    telemetry.start_timer("ignoreTree.refresh.total", None).stop();
}
