//! File watching for config and template changes.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// How long the source tree must stay quiet before a burst of changes is reported.
const QUIET_PERIOD: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A JSON config was created or modified
    ConfigChanged(PathBuf),

    /// A JSON config was deleted
    ConfigRemoved(PathBuf),

    /// The page template changed
    TemplateChanged(PathBuf),
}

impl WatchEvent {
    /// Path the event refers to.
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::ConfigChanged(p)
            | WatchEvent::ConfigRemoved(p)
            | WatchEvent::TemplateChanged(p) => p,
        }
    }
}

/// File watcher for detecting source changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `dirs` (non-recursively) for config changes and for changes to
    /// the file named like `template`.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(
        dirs: &[PathBuf],
        template: &Path,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for dir in dirs {
            if dir.exists() {
                watcher
                    .watch(dir, RecursiveMode::NonRecursive)
                    .map_err(std::io::Error::other)?;
            } else {
                tracing::debug!("Not watching missing path {}", dir.display());
            }
        }

        let template_name = template
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        std::thread::spawn(move || {
            while let Ok(event) = sync_rx.recv() {
                let Some(e) = drain_burst(event, &sync_rx, &template_name, QUIET_PERIOD) else {
                    continue;
                };
                if async_tx.blocking_send(e).is_err() {
                    return;
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Collapse a burst of raw events, starting with `first`, into the last
/// relevant one. The burst ends once no event arrives for `quiet`.
fn drain_burst(
    first: notify::Event,
    rx: &mpsc::Receiver<notify::Event>,
    template_name: &str,
    quiet: Duration,
) -> Option<WatchEvent> {
    let mut latest = None;
    let mut next = Some(first);

    while let Some(event) = next {
        for path in &event.paths {
            if let Some(e) = classify_event(path, &event.kind, template_name) {
                latest = Some(e);
            }
        }
        next = rx.recv_timeout(quiet).ok();
    }

    latest
}

/// Directories to watch: the config source plus the template's and root config's parents.
pub fn watch_dirs(config_source: &Path, template: &Path, root_config: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    for dir in [
        config_source.to_path_buf(),
        parent_dir(template),
        parent_dir(root_config),
    ] {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }

    dirs
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind, template_name: &str) -> Option<WatchEvent> {
    use notify::EventKind;

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let is_template = !template_name.is_empty() && name == template_name;
    let is_config = path.extension().and_then(|e| e.to_str()) == Some("json");

    match kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) if is_template => {
            Some(WatchEvent::TemplateChanged(path.to_path_buf()))
        }
        EventKind::Create(_) | EventKind::Modify(_) if is_config => {
            Some(WatchEvent::ConfigChanged(path.to_path_buf()))
        }
        EventKind::Remove(_) if is_config => Some(WatchEvent::ConfigRemoved(path.to_path_buf())),
        _ => None,
    }
}
