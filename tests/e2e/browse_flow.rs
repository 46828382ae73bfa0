//! Browse a real folder, toggle rows, and watch the pattern file follow.

use ignore_tree_adapters::{
    FilePatternStore, JsonLogger, JsonTelemetry, LocalListingSource, MemoryLogSink,
};
use ignore_tree_app::{IgnoreBrowser, RefreshOutcome, TreeSync, TreeSyncDeps, TreeSyncSettings};
use ignore_tree_config::{ValidatedIgnoreTreeConfig, parse_config_json};
use ignore_tree_domain::{FolderId, ToggleEdit};
use ignore_tree_ports::{LogLevel, metric};
use ignore_tree_shared::{RequestContext, Result};
use ignore_tree_testkit::RecordingRenderer;
use ignore_tree_testkit::fixtures::PHOTOS_MUSIC_PATTERNS;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const CONFIG: &str = r#"{
  "version": 1,
  "listing": { "timeoutMs": 5000, "levels": 0 },
  "logging": { "minLevel": "debug" }
}"#;

struct Workspace {
    base: PathBuf,
}

impl Workspace {
    fn new(label: &str) -> std::io::Result<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_nanos())
            .unwrap_or_default();
        let base = std::env::temp_dir().join(format!("ignore-tree-e2e-{label}-{nanos}"));
        for dir in ["root/Backups", "root/Music/Phish", "root/Photos/Raw", "patterns"] {
            std::fs::create_dir_all(base.join(dir))?;
        }
        std::fs::write(base.join("root/notes.txt"), "hello")?;
        std::fs::write(base.join("patterns/.stignore"), PHOTOS_MUSIC_PATTERNS)?;
        Ok(Self { base })
    }

    fn root(&self) -> PathBuf {
        self.base.join("root")
    }

    fn pattern_file(&self) -> PathBuf {
        self.base.join("patterns/.stignore")
    }

    fn pattern_text(&self) -> std::io::Result<String> {
        std::fs::read_to_string(self.pattern_file())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.base);
    }
}

struct Stack {
    folder: FolderId,
    store: Arc<FilePatternStore>,
    renderer: Arc<RecordingRenderer>,
    sink: Arc<MemoryLogSink>,
    browser: IgnoreBrowser,
}

fn stack(workspace: &Workspace, config: &ValidatedIgnoreTreeConfig) -> Result<Stack> {
    let folder = FolderId::parse("default")?;
    let listing = LocalListingSource::new().with_folder(folder.clone(), workspace.root());
    let store = Arc::new(
        FilePatternStore::new(config.pattern_syntax())
            .with_folder(folder.clone(), workspace.pattern_file()),
    );
    let renderer = Arc::new(RecordingRenderer::new());
    let sink = Arc::new(MemoryLogSink::default());
    let sync = TreeSync::new(
        TreeSyncDeps {
            listing: Arc::new(listing),
            store: store.clone(),
            renderer: renderer.clone(),
            logger: Some(Arc::new(JsonLogger::from_config(sink.clone(), config))),
            telemetry: Some(Arc::new(JsonTelemetry::new(sink.clone()))),
        },
        TreeSyncSettings {
            listing_timeout: config.listing_timeout(),
            levels: config.listing.levels,
        },
    );
    Ok(Stack {
        folder,
        store,
        renderer,
        sink,
        browser: IgnoreBrowser::new(Arc::new(sync)),
    })
}

fn named<'a>(lines: &'a [Value], key: &str, name: &str) -> impl Iterator<Item = &'a Value> {
    let key = key.to_owned();
    let name = name.to_owned();
    lines
        .iter()
        .filter(move |line| line.get(&key).and_then(Value::as_str) == Some(name.as_str()))
}

#[tokio::test]
async fn toggling_rows_rewrites_the_pattern_file() -> Result<()> {
    let workspace = Workspace::new("toggle")?;
    let config = parse_config_json(CONFIG)?;
    let s = stack(&workspace, &config)?;
    let ctx = RequestContext::new_request();

    let outcome = s.browser.navigate(&ctx, &s.folder, "").await?;
    assert_eq!(outcome, RefreshOutcome::Rendered { rows: 4 });
    let selected: Vec<(String, bool)> = s
        .renderer
        .visible()
        .iter()
        .map(|row| (row.key.to_string(), row.selected))
        .collect();
    assert_eq!(
        selected,
        [
            ("Backups".to_owned(), true),
            ("Music".to_owned(), true),
            ("Photos".to_owned(), false),
            ("notes.txt".to_owned(), true),
        ]
    );

    let backups = s.browser.record(&s.folder, "Backups")?;
    let edit = s.browser.toggle(&s.folder, &backups)?;
    assert!(matches!(edit, ToggleEdit::Append { negated: false, .. }));
    assert_eq!(workspace.pattern_text()?, "/Photos\n!/Music\n/Backups\n");
    assert_eq!(s.renderer.selected("Backups"), Some(false));

    let photos = s.browser.record(&s.folder, "Photos")?;
    s.browser.toggle(&s.folder, &photos)?;
    assert_eq!(workspace.pattern_text()?, "!/Music\n/Backups\n");
    assert_eq!(s.renderer.selected("Photos"), Some(true));

    // toggling twice from a fresh record restores the file
    let photos = s.browser.record(&s.folder, "Photos")?;
    s.browser.toggle(&s.folder, &photos)?;
    assert_eq!(workspace.pattern_text()?, "!/Music\n/Backups\n/Photos\n");
    Ok(())
}

#[tokio::test]
async fn nested_rows_get_their_own_rule() -> Result<()> {
    let workspace = Workspace::new("nested")?;
    let config = parse_config_json(CONFIG)?;
    let s = stack(&workspace, &config)?;
    let ctx = RequestContext::new_request();

    s.browser.navigate(&ctx, &s.folder, "Photos").await?;
    let raw = s.browser.record(&s.folder, "Photos/Raw")?;
    assert!(raw.inherited && raw.is_ignored());
    s.browser.toggle(&s.folder, &raw)?;

    s.browser.navigate(&ctx, &s.folder, "Music").await?;
    let phish = s.browser.record(&s.folder, "Music/Phish")?;
    assert!(phish.inherited && !phish.is_ignored());
    s.browser.toggle(&s.folder, &phish)?;

    assert_eq!(
        workspace.pattern_text()?,
        "/Photos\n!/Music\n!/Photos/Raw\n/Music/Phish\n"
    );
    assert_eq!(s.renderer.selected("Music/Phish"), Some(false));
    Ok(())
}

#[tokio::test]
async fn external_edits_repaint_after_reload() -> Result<()> {
    let workspace = Workspace::new("external")?;
    let config = parse_config_json(CONFIG)?;
    let s = stack(&workspace, &config)?;
    let ctx = RequestContext::new_request();
    s.browser.set_current_folder(Some(s.folder.clone()))?;
    s.browser.reload(&ctx).await?;

    std::fs::write(workspace.pattern_file(), "/notes.txt\n")?;
    s.store.reload(&s.folder)?;
    s.browser.patterns_changed(&s.folder)?;

    assert_eq!(s.renderer.selected("notes.txt"), Some(false));
    assert_eq!(s.renderer.selected("Photos"), Some(true));
    assert_eq!(s.renderer.render_count(), 1);
    Ok(())
}

#[tokio::test]
async fn events_and_metrics_reach_the_sink() -> Result<()> {
    let workspace = Workspace::new("observe")?;
    let config = parse_config_json(CONFIG)?;
    let s = stack(&workspace, &config)?;
    let ctx = RequestContext::new_request();

    s.browser.navigate(&ctx, &s.folder, "").await?;
    let backups = s.browser.record(&s.folder, "Backups")?;
    s.browser.toggle(&s.folder, &backups)?;

    let lines = s.sink.take_json();
    assert_eq!(named(&lines, "event", "ignoreTree.refresh.start").count(), 1);
    assert_eq!(named(&lines, "event", "ignoreTree.refresh.completed").count(), 1);
    assert_eq!(named(&lines, "event", "ignoreTree.update.applied").count(), 1);
    let toggled: Vec<&Value> = named(&lines, "event", "ignoreTree.toggle.applied").collect();
    assert_eq!(toggled.len(), 1);
    assert_eq!(
        toggled
            .first()
            .and_then(|line| line.pointer("/fields/folderId"))
            .and_then(Value::as_str),
        Some("default")
    );
    assert_eq!(named(&lines, "name", metric::REFRESH_TOTAL).count(), 1);
    assert_eq!(named(&lines, "name", metric::TOGGLE_EXECUTED).count(), 1);
    Ok(())
}

#[tokio::test]
async fn configured_level_filters_debug_events() -> Result<()> {
    let workspace = Workspace::new("quiet")?;
    let config = parse_config_json(r#"{ "logging": { "minLevel": "warn" } }"#)?;
    let s = stack(&workspace, &config)?;

    s.browser
        .navigate(&RequestContext::new_request(), &s.folder, "")
        .await?;

    let lines = s.sink.take_json();
    assert!(lines.iter().all(|line| {
        line.get("level")
            .and_then(Value::as_str)
            .and_then(LogLevel::parse)
            .is_none_or(|level| level >= LogLevel::Warn)
    }));
    assert_eq!(named(&lines, "name", metric::REFRESH_TOTAL).count(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_folder_fails_without_painting() -> Result<()> {
    let workspace = Workspace::new("missing")?;
    let config = parse_config_json(CONFIG)?;
    let s = stack(&workspace, &config)?;

    let error = s
        .browser
        .navigate(&RequestContext::new_request(), &s.folder, "Videos")
        .await
        .err();

    assert!(error.is_some());
    assert_eq!(s.renderer.render_count(), 0);
    let lines = s.sink.take_json();
    assert_eq!(named(&lines, "event", "ignoreTree.refresh.failed").count(), 1);
    Ok(())
}

#[tokio::test]
async fn toggles_keep_hand_written_lines() -> Result<()> {
    let workspace = Workspace::new("handwritten")?;
    std::fs::write(workspace.pattern_file(), "Photos\n// music stays\n!Music/\n")?;
    let config = parse_config_json(CONFIG)?;
    let s = stack(&workspace, &config)?;

    s.browser
        .navigate(&RequestContext::new_request(), &s.folder, "")
        .await?;
    let backups = s.browser.record(&s.folder, "Backups")?;
    s.browser.toggle(&s.folder, &backups)?;

    assert_eq!(
        workspace.pattern_text()?,
        "Photos\n// music stays\n!Music/\n/Backups\n"
    );
    assert_eq!(s.renderer.selected("Photos"), Some(false));
    Ok(())
}
