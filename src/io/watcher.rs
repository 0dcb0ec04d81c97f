use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Files whose changes should trigger a re-render
const WATCHED: [&str; 2] = ["config.toml", "collection.toml"];

/// Watches `cellar/` for edits to the config or the collection.
pub struct CellarWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<Vec<PathBuf>>,
}

impl CellarWatcher {
    pub fn start(cellar_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let cellar_dir_owned = cellar_dir.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else {
                    return;
                };
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }

                let relevant: Vec<PathBuf> = event
                    .paths
                    .into_iter()
                    .filter(|p| p.starts_with(&cellar_dir_owned))
                    .filter(|p| {
                        p.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| WATCHED.contains(&n))
                    })
                    .collect();

                if !relevant.is_empty() {
                    let _ = tx.send(relevant);
                }
            },
            Config::default(),
        )?;

        watcher.watch(cellar_dir, RecursiveMode::NonRecursive)?;
        Ok(CellarWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Block until something changes, then wait out `settle` and swallow
    /// every event that arrived meanwhile, so only the latest state is
    /// rendered. Returns `None` once the watcher has shut down.
    pub fn wait(&self, settle: Duration) -> Option<Vec<PathBuf>> {
        let mut changed = self.rx.recv().ok()?;
        std::thread::sleep(settle);
        while let Ok(more) = self.rx.try_recv() {
            changed.extend(more);
        }
        changed.sort();
        changed.dedup();
        Some(changed)
    }
}
