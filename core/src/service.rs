//! The file-picker service: one instance owns every per-workspace cache
//!
//! All process-wide state (file lists, recency lists, the exclusion set)
//! hangs off an explicit [`FilePicker`] instance so hosts and tests can
//! run several, fully isolated, side by side. Multiple workspace roots
//! are fanned out concurrently; mutation of the exclusion set is
//! serialized through one async mutex.

use crate::cache::CacheLayout;
use crate::database::SearchDatabase;
use crate::error::{Error, Result};
use crate::exclude::{owning_root, ExcludedDirs, ExclusionState};
use crate::query::{self, QueryItem};
use crate::recency::{RecencyTracker, RecordOutcome};
use crate::settings::{Settings, SettingsStore, EXCLUDE_DIRS_KEY};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What [`FilePicker::add_exclude_dirs`] did, per directory.
#[derive(Debug, Default)]
pub struct ExcludeReport {
    /// Newly excluded directories
    pub excluded: Vec<PathBuf>,

    /// Already excluded (directly or through an ancestor); left alone
    pub skipped: Vec<PathBuf>,

    /// Outside every workspace root; refused
    pub rejected: Vec<PathBuf>,

    /// Roots that had no database yet; the next full build picks the
    /// exclusion up
    pub roots_without_database: Vec<PathBuf>,

    /// Entries dropped from the databases
    pub removed_files: usize,
}

/// What [`FilePicker::cancel_exclude_dirs`] did, per directory.
#[derive(Debug, Default)]
pub struct UnexcludeReport {
    /// Directories removed from the exclusion set
    pub restored: Vec<PathBuf>,

    /// Still blocked: the named ancestor must be un-excluded first
    pub blocked: Vec<(PathBuf, PathBuf)>,

    /// Not excluded in the first place, or a built-in exclusion
    pub skipped: Vec<PathBuf>,

    /// Outside every workspace root; refused
    pub rejected: Vec<PathBuf>,

    /// Roots that had no database yet
    pub roots_without_database: Vec<PathBuf>,

    /// Entries added back into the databases
    pub restored_files: usize,
}

/// Indexing and query service over a set of workspace roots.
pub struct FilePicker {
    roots: Vec<PathBuf>,
    settings: Settings,
    store: Arc<dyn SettingsStore>,
    database: SearchDatabase,
    recency: Arc<RecencyTracker>,
    excluded: Mutex<ExcludedDirs>,
}

impl FilePicker {
    /// Service with the default cache location under the home directory.
    pub async fn new(
        roots: Vec<PathBuf>,
        store: Arc<dyn SettingsStore>,
        settings: Settings,
    ) -> Result<Self> {
        let layout = CacheLayout::new()?;
        Self::with_layout(roots, store, settings, layout).await
    }

    /// Service with an explicit cache base directory.
    pub async fn with_cache_dir(
        roots: Vec<PathBuf>,
        store: Arc<dyn SettingsStore>,
        settings: Settings,
        cache_base: PathBuf,
    ) -> Result<Self> {
        let layout = CacheLayout::with_base(cache_base)?;
        Self::with_layout(roots, store, settings, layout).await
    }

    async fn with_layout(
        roots: Vec<PathBuf>,
        store: Arc<dyn SettingsStore>,
        settings: Settings,
        layout: CacheLayout,
    ) -> Result<Self> {
        let recency = Arc::new(RecencyTracker::new(
            layout.clone(),
            roots.clone(),
            settings.recency_cap,
        ));
        let database = SearchDatabase::new(layout);

        let picker = Self {
            roots,
            settings,
            store,
            database,
            recency,
            excluded: Mutex::new(ExcludedDirs::new()),
        };
        picker.reload_exclusions().await?;
        Ok(picker)
    }

    /// Re-read the exclusion list from the configuration store, as done
    /// at startup and on external change notifications.
    pub async fn reload_exclusions(&self) -> Result<()> {
        let loaded = match self.store.get(EXCLUDE_DIRS_KEY).await {
            Some(config) => ExcludedDirs::from_config_string(&config, self.primary_root()),
            None => ExcludedDirs::new(),
        };
        *self.excluded.lock().await = loaded;
        Ok(())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current exclusion state of `dir`, walking up to its workspace root.
    pub async fn check_exclusion_state(&self, dir: &Path) -> Result<ExclusionState> {
        let root =
            owning_root(dir, &self.roots).ok_or_else(|| Error::OutsideWorkspace(dir.to_path_buf()))?;
        Ok(self.excluded.lock().await.state_of(dir, root))
    }

    /// Full (re)build of one root's database. `on_progress` fires once
    /// per discovered file.
    pub async fn build_index<F>(&self, root: &Path, on_progress: &mut F) -> Result<PathBuf>
    where
        F: FnMut(&Path) + Send,
    {
        let root = self.known_root(root)?;
        let excluded = self.excluded.lock().await.clone();
        self.database.build(root, &excluded, on_progress).await
    }

    /// Rebuild every root concurrently. Returns the database file paths
    /// in root order.
    pub async fn build_all<F>(&self, on_progress: &F) -> Result<Vec<PathBuf>>
    where
        F: Fn(&Path) + Send + Sync,
    {
        let excluded = self.excluded.lock().await.clone();
        let builds = self.roots.iter().map(|root| {
            let excluded = excluded.clone();
            async move {
                let mut progress = |path: &Path| on_progress(path);
                self.database.build(root, &excluded, &mut progress).await
            }
        });
        join_all(builds).await.into_iter().collect()
    }

    /// Ranked results for a live query string. An empty pattern returns
    /// the recency list instead of a search.
    pub async fn query(&self, pattern: &str) -> Result<Vec<QueryItem>> {
        self.query_streaming(pattern, |_batch: &[QueryItem]| {}).await
    }

    /// Like [`query`](Self::query), but streams interim batches of strong
    /// matches through `on_batch` while the scan runs.
    pub async fn query_streaming<F>(&self, pattern: &str, on_batch: F) -> Result<Vec<QueryItem>>
    where
        F: FnMut(&[QueryItem]),
    {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            let recent = self.recency.list().await?;
            return Ok(recent
                .iter()
                .map(|path| {
                    let root = owning_root(Path::new(path), &self.roots)
                        .map(PathBuf::as_path)
                        .unwrap_or_else(|| self.primary_root());
                    QueryItem::file(root, path)
                })
                .collect());
        }

        // snapshot every root concurrently, then scan
        let snapshots: Vec<(&Path, Arc<Vec<String>>)> =
            join_all(self.roots.iter().map(|root| async move {
                self.database
                    .get(root)
                    .await
                    .map(|files| (root.as_path(), files))
            }))
            .await
            .into_iter()
            .collect::<Result<_>>()?;

        Ok(query::scan(pattern, &snapshots, &self.settings, on_batch))
    }

    /// Exclude directories from indexing, incrementally removing their
    /// files from any existing database.
    pub async fn add_exclude_dirs(&self, dirs: &[PathBuf]) -> Result<ExcludeReport> {
        let mut report = ExcludeReport::default();
        let mut candidates = dirs.to_vec();
        // parents first, so a top-level exclusion subsumes its children
        candidates.sort_by_key(|dir| dir.as_os_str().len());

        let mut excluded = self.excluded.lock().await;
        for dir in candidates {
            let Some(root) = owning_root(&dir, &self.roots) else {
                warn!("refusing to exclude {}: not inside any workspace root", dir.display());
                report.rejected.push(dir);
                continue;
            };
            match excluded.state_of(&dir, root) {
                ExclusionState::NotExcluded => {
                    excluded.insert(dir.clone());
                    report.excluded.push(dir);
                }
                _ => {
                    debug!("already excluded: {}", dir.display());
                    report.skipped.push(dir);
                }
            }
        }
        if report.excluded.is_empty() {
            return Ok(report);
        }
        self.persist_exclusions(&excluded).await?;

        for dir in &report.excluded {
            let root = owning_root(dir, &self.roots).expect("validated above");
            if !self.database.is_built(root).await? {
                info!(
                    "no search database for {} yet; exclusion takes effect on the next build",
                    root.display()
                );
                if !report.roots_without_database.contains(root) {
                    report.roots_without_database.push(root.clone());
                }
                continue;
            }
            report.removed_files += self.database.remove_subtree(root, dir, &excluded).await?;
        }
        info!("just excluded {} directories", report.excluded.len());
        Ok(report)
    }

    /// Inverse of [`add_exclude_dirs`](Self::add_exclude_dirs): re-walk
    /// the un-excluded directories and add their files back.
    ///
    /// A directory whose ancestor is still excluded is refused; when
    /// nothing could be un-excluded because of that, the whole operation
    /// fails with [`Error::AncestorExcluded`] and no state changes.
    pub async fn cancel_exclude_dirs(&self, dirs: &[PathBuf]) -> Result<UnexcludeReport> {
        let mut report = UnexcludeReport::default();
        let mut candidates = dirs.to_vec();
        candidates.sort_by_key(|dir| dir.as_os_str().len());

        let mut excluded = self.excluded.lock().await;
        for dir in candidates {
            let Some(root) = owning_root(&dir, &self.roots) else {
                warn!("refusing to un-exclude {}: not inside any workspace root", dir.display());
                report.rejected.push(dir);
                continue;
            };
            match excluded.state_of(&dir, root) {
                ExclusionState::ExactlyExcluded => {
                    if excluded.remove(&dir) {
                        report.restored.push(dir);
                    } else {
                        // built-in names cannot be un-excluded
                        report.skipped.push(dir);
                    }
                }
                ExclusionState::ParentExcluded(ancestor) => {
                    report.blocked.push((dir, ancestor));
                }
                ExclusionState::NotExcluded => {
                    report.skipped.push(dir);
                }
            }
        }
        if report.restored.is_empty() {
            if let Some((dir, ancestor)) = report.blocked.first() {
                return Err(Error::AncestorExcluded {
                    dir: dir.clone(),
                    ancestor: ancestor.clone(),
                });
            }
            return Ok(report);
        }
        self.persist_exclusions(&excluded).await?;

        for dir in &report.restored {
            let root = owning_root(dir, &self.roots).expect("validated above");
            if !self.database.is_built(root).await? {
                info!(
                    "no search database for {} yet; nothing to restore",
                    root.display()
                );
                if !report.roots_without_database.contains(root) {
                    report.roots_without_database.push(root.clone());
                }
                continue;
            }
            report.restored_files += self.database.restore_subtree(root, dir, &excluded).await?;
        }
        info!("just re-indexed {} directories", report.restored.len());
        Ok(report)
    }

    /// Record that a file was opened.
    pub async fn record_opened(&self, path: &str) -> Result<RecordOutcome> {
        self.recency.record(path).await
    }

    /// Drop a file from the recency list, for hosts that find it no
    /// longer openable.
    pub async fn forget_opened(&self, path: &str) -> Result<()> {
        self.recency.remove(path).await
    }

    /// The merged recently-opened list, most recent first.
    pub async fn recent_list(&self) -> Result<Vec<String>> {
        self.recency.list().await
    }

    /// Flush the recency list now if it changed. Hosts embedding the
    /// service long-term should prefer
    /// [`spawn_recency_flusher`](Self::spawn_recency_flusher).
    pub async fn flush(&self) -> Result<bool> {
        self.recency.flush_if_dirty().await
    }

    /// Start the background recency flush loop on the configured
    /// interval. The returned handle aborts it.
    pub fn spawn_recency_flusher(&self) -> JoinHandle<()> {
        self.recency.spawn_flusher(self.settings.flush_interval)
    }

    /// Debouncer preconfigured with the query delay, for hosts driving
    /// [`query`](Self::query) from live keystrokes.
    pub fn query_debouncer(&self) -> crate::debounce::Debouncer {
        crate::debounce::Debouncer::new(self.settings.query_debounce)
    }

    /// Path of the persisted database file for `root`.
    pub fn database_file(&self, root: &Path) -> Result<PathBuf> {
        let root = self.known_root(root)?;
        self.database.database_file(root)
    }

    fn primary_root(&self) -> &Path {
        self.roots
            .first()
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(""))
    }

    fn known_root<'a>(&'a self, root: &Path) -> Result<&'a Path> {
        self.roots
            .iter()
            .find(|known| known.as_path() == root)
            .map(PathBuf::as_path)
            .ok_or_else(|| Error::OutsideWorkspace(root.to_path_buf()))
    }

    async fn persist_exclusions(&self, excluded: &ExcludedDirs) -> Result<()> {
        let config = excluded.to_config_string(self.primary_root());
        let current = self.store.get(EXCLUDE_DIRS_KEY).await;
        if current.as_deref() == Some(config.as_str())
            || (current.is_none() && config.is_empty())
        {
            // unchanged; skip the write
            return Ok(());
        }
        self.store.set(EXCLUDE_DIRS_KEY, &config).await
    }
}
