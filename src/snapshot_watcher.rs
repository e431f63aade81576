use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};
use std::time::{SystemTime, UNIX_EPOCH};

use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};

use crate::error::Result;

const COMPILATION_FILES: &[&str] = &["compilation.json"];
const PACKAGE_FILES: &[&str] = &["packages-lock.json", "manifest.json"];

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// What changed since a given point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotChanges {
    /// The editor re-exported its compilation graph
    pub compilation: bool,
    /// The package set may have changed
    pub packages: bool,
}

impl SnapshotChanges {
    pub fn any(&self) -> bool {
        self.compilation || self.packages
    }
}

/// Tracks changes to the files a generation pass depends on.
///
/// The notify callback only stores timestamps; callers poll with
/// [`SnapshotWatcher::changes_since`]. Directories that do not exist yet
/// (e.g. `Library/UnityCode` before the editor's first export) are attached
/// on a later poll, once they appear.
pub struct SnapshotWatcher {
    compilation_changed: Arc<AtomicU64>,
    packages_changed: Arc<AtomicU64>,
    pending: Vec<PathBuf>,
    watcher: Option<notify::RecommendedWatcher>,
    /// Kept alive to continue monitoring
    _receiver: Option<mpsc::Receiver<std::result::Result<NotifyEvent, notify::Error>>>,
}

impl SnapshotWatcher {
    /// Watch `directories` (non-recursively). Missing directories are attached
    /// once they exist.
    pub fn new(directories: &[PathBuf]) -> Result<Self> {
        let compilation_changed = Arc::new(AtomicU64::new(0));
        let packages_changed = Arc::new(AtomicU64::new(0));

        let (tx, rx) = mpsc::channel();
        let compilation = compilation_changed.clone();
        let packages = packages_changed.clone();

        let mut watcher = notify::recommended_watcher(move |res: std::result::Result<NotifyEvent, notify::Error>| {
            match &res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
                        if event.paths.iter().any(|p| has_file_name(p, COMPILATION_FILES)) {
                            compilation.store(now_nanos(), Ordering::Relaxed);
                        }
                        if event.paths.iter().any(|p| has_file_name(p, PACKAGE_FILES)) {
                            packages.store(now_nanos(), Ordering::Relaxed);
                        }
                    }
                }
                Err(_) => {
                    // Unknown state, treat everything as changed
                    let now = now_nanos();
                    compilation.store(now, Ordering::Relaxed);
                    packages.store(now, Ordering::Relaxed);
                }
            }

            let _ = tx.send(res);
        })?;

        let mut pending = Vec::new();
        for directory in directories {
            if directory.is_dir() {
                watcher.watch(directory, RecursiveMode::NonRecursive)?;
                log::info!("Watching {} for snapshot changes", directory.display());
            } else {
                log::info!("{} does not exist yet, will watch it once it appears", directory.display());
                pending.push(directory.clone());
            }
        }

        Ok(Self {
            compilation_changed,
            packages_changed,
            pending,
            watcher: Some(watcher),
            _receiver: Some(rx),
        })
    }

    /// Instance that never reports changes
    pub fn new_without_watcher() -> Self {
        Self {
            compilation_changed: Arc::new(AtomicU64::new(0)),
            packages_changed: Arc::new(AtomicU64::new(0)),
            pending: Vec::new(),
            watcher: None,
            _receiver: None,
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Directories still waiting to be created
    pub fn pending_directories(&self) -> &[PathBuf] {
        &self.pending
    }

    /// Current time in the watcher's clock, to pass back into `changes_since`
    pub fn now(&self) -> u64 {
        now_nanos()
    }

    pub fn changes_since(&mut self, timestamp: u64) -> SnapshotChanges {
        self.attach_pending();

        SnapshotChanges {
            compilation: self.compilation_changed.load(Ordering::Relaxed) > timestamp,
            packages: self.packages_changed.load(Ordering::Relaxed) > timestamp,
        }
    }
}

impl SnapshotWatcher {
    /// Start watching pending directories that now exist. Files already in
    /// them count as changed, since their creation was not observed.
    fn attach_pending(&mut self) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };
        let compilation = &self.compilation_changed;
        let packages = &self.packages_changed;

        self.pending.retain(|directory| {
            if !directory.is_dir() {
                return true;
            }
            if let Err(e) = watcher.watch(directory, RecursiveMode::NonRecursive) {
                log::warn!("Failed to watch {}: {}", directory.display(), e);
                return true;
            }
            log::info!("Watching {} for snapshot changes", directory.display());

            if COMPILATION_FILES.iter().any(|name| directory.join(name).is_file()) {
                compilation.store(now_nanos(), Ordering::Relaxed);
            }
            if PACKAGE_FILES.iter().any(|name| directory.join(name).is_file()) {
                packages.store(now_nanos(), Ordering::Relaxed);
            }
            false
        });
    }
}

fn has_file_name(path: &Path, names: &[&str]) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| names.contains(&name))
}
