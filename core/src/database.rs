//! Per-workspace search database
//!
//! One flat text file per workspace root, one absolute path per line,
//! with a comment header. Builds stream every discovered path to both the
//! in-memory list and a `.new` staging file which is atomically renamed
//! over the previous database, so a crash mid-build never corrupts the
//! last good copy. Loads are memoized and single-flight per root.

use crate::cache::CacheLayout;
use crate::error::{Error, Result};
use crate::exclude::ExcludedDirs;
use crate::walker::{collect_files, walk_files};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info};

/// Header written at the top of every database file; lines starting with
/// `#` are ignored on load.
pub const DATABASE_HEADER: &str = "# Auto generated, please don't modify it directly\n\
     # You might want to add it into your project's .gitignore\n";

#[derive(Default)]
struct RootIndex {
    files: RwLock<Arc<Vec<String>>>,
    loaded: OnceCell<()>,
}

/// File lists of every indexed workspace root, in memory and on disk.
pub struct SearchDatabase {
    layout: CacheLayout,
    indexes: std::sync::Mutex<HashMap<PathBuf, Arc<RootIndex>>>,
    writing: std::sync::Mutex<HashSet<PathBuf>>,
}

impl SearchDatabase {
    pub fn new(layout: CacheLayout) -> Self {
        Self {
            layout,
            indexes: std::sync::Mutex::new(HashMap::new()),
            writing: std::sync::Mutex::new(HashSet::new()),
        }
    }

    fn index_for(&self, root: &Path) -> Arc<RootIndex> {
        let mut indexes = self.indexes.lock().expect("index map poisoned");
        indexes
            .entry(root.to_path_buf())
            .or_insert_with(|| Arc::new(RootIndex::default()))
            .clone()
    }

    /// Full rebuild of `root`'s database, replacing both the persisted
    /// file and the in-memory list. `on_progress` fires once per
    /// discovered file. Rejected with [`Error::BuildInProgress`] when a
    /// build for the same root is already running.
    pub async fn build<F>(
        &self,
        root: &Path,
        excluded: &ExcludedDirs,
        on_progress: &mut F,
    ) -> Result<PathBuf>
    where
        F: FnMut(&Path) + Send,
    {
        let _guard = self.begin_write(root)?;

        let database_file = self.layout.database_file(root)?;
        let staged = staged_path(&database_file);
        info!(
            "building search database for {} into {}",
            root.display(),
            database_file.display()
        );

        let mut writer = std::io::BufWriter::new(std::fs::File::create(&staged)?);
        writer.write_all(DATABASE_HEADER.as_bytes())?;

        let mut files = Vec::new();
        let mut write_error: Option<std::io::Error> = None;
        walk_files(root, excluded, &mut |path: &Path| {
            let line = path.to_string_lossy();
            if write_error.is_none() {
                if let Err(e) = writeln!(writer, "{}", line) {
                    write_error = Some(e);
                }
            }
            files.push(line.into_owned());
            on_progress(path);
        })
        .await?;
        if let Some(e) = write_error {
            return Err(e.into());
        }
        writer.flush()?;
        drop(writer);
        tokio::fs::rename(&staged, &database_file).await?;

        info!("found {} files under {}", files.len(), root.display());
        let index = self.index_for(root);
        // an in-flight load must settle first, or its read of the
        // pre-build file would land on top of the fresh list
        index.loaded.get_or_init(|| async {}).await;
        *index.files.write().await = Arc::new(files);

        Ok(database_file)
    }

    /// Populate the in-memory list from the persisted file. Memoized per
    /// root; concurrent callers share one read. A missing or unreadable
    /// file loads as an empty list, never an error.
    pub async fn load(&self, root: &Path) -> Result<()> {
        let index = self.index_for(root);
        index
            .loaded
            .get_or_try_init(|| async {
                let database_file = self.layout.database_file(root)?;
                match tokio::fs::read_to_string(&database_file).await {
                    Ok(contents) => {
                        let files: Vec<String> = contents
                            .lines()
                            .filter(|line| !line.is_empty() && !line.starts_with('#'))
                            .map(str::to_string)
                            .collect();
                        info!(
                            "loaded search database {} with {} entries",
                            database_file.display(),
                            files.len()
                        );
                        *index.files.write().await = Arc::new(files);
                    }
                    Err(e) => {
                        debug!(
                            "search database not present at {}: {}",
                            database_file.display(),
                            e
                        );
                    }
                }
                Ok::<(), Error>(())
            })
            .await?;
        Ok(())
    }

    /// Snapshot of `root`'s file list, loading it first if needed. The
    /// returned list is a shared read view.
    pub async fn get(&self, root: &Path) -> Result<Arc<Vec<String>>> {
        self.load(root).await?;
        let index = self.index_for(root);
        let guard = index.files.read().await;
        Ok(guard.clone())
    }

    /// Whether a persisted database exists for `root`.
    pub async fn is_built(&self, root: &Path) -> Result<bool> {
        let database_file = self.layout.database_file(root)?;
        Ok(tokio::fs::try_exists(&database_file).await.unwrap_or(false))
    }

    /// Path of `root`'s persisted database file.
    pub fn database_file(&self, root: &Path) -> Result<PathBuf> {
        self.layout.database_file(root)
    }

    /// Re-walk a newly excluded directory and drop every file found there
    /// from `root`'s list, then persist. Returns the number removed.
    pub async fn remove_subtree(
        &self,
        root: &Path,
        dir: &Path,
        excluded: &ExcludedDirs,
    ) -> Result<usize> {
        let _guard = self.begin_write(root)?;
        self.load(root).await?;
        let doomed: HashSet<String> = collect_files(dir, excluded).await?.into_iter().collect();

        let index = self.index_for(root);
        let removed = {
            let mut guard = index.files.write().await;
            let before = guard.len();
            let kept: Vec<String> = guard
                .iter()
                .filter(|file| !doomed.contains(file.as_str()))
                .cloned()
                .collect();
            let removed = before - kept.len();
            *guard = Arc::new(kept);
            removed
        };

        self.persist(root).await?;
        debug!("removed {} entries under {}", removed, dir.display());
        Ok(removed)
    }

    /// Re-walk a newly un-excluded directory and add every file found
    /// there that is not already present, then persist. Returns the
    /// number added.
    pub async fn restore_subtree(
        &self,
        root: &Path,
        dir: &Path,
        excluded: &ExcludedDirs,
    ) -> Result<usize> {
        let _guard = self.begin_write(root)?;
        self.load(root).await?;
        let found = collect_files(dir, excluded).await?;

        let index = self.index_for(root);
        let added = {
            let mut guard = index.files.write().await;
            let existing: HashSet<&str> = guard.iter().map(String::as_str).collect();
            let missing: Vec<String> = found
                .into_iter()
                .filter(|file| !existing.contains(file.as_str()))
                .collect();
            let added = missing.len();
            if added > 0 {
                let mut updated = (**guard).clone();
                updated.extend(missing);
                *guard = Arc::new(updated);
            }
            added
        };

        self.persist(root).await?;
        debug!("restored {} entries under {}", added, dir.display());
        Ok(added)
    }

    /// Write `root`'s current in-memory list to disk, staging to a `.new`
    /// sibling and renaming atomically.
    pub async fn persist(&self, root: &Path) -> Result<()> {
        let snapshot = self.get(root).await?;
        let database_file = self.layout.database_file(root)?;
        let staged = staged_path(&database_file);

        let mut contents = String::with_capacity(DATABASE_HEADER.len() + snapshot.len() * 64);
        contents.push_str(DATABASE_HEADER);
        for line in snapshot.iter() {
            contents.push_str(line);
            contents.push('\n');
        }
        tokio::fs::write(&staged, contents).await?;
        tokio::fs::rename(&staged, &database_file).await?;
        debug!("search database file for {} was updated", root.display());
        Ok(())
    }

    // Rebuilds and incremental patches alike take the per-root write
    // token; a second writer for the same root is rejected, never
    // interleaved.
    fn begin_write(&self, root: &Path) -> Result<WriteGuard<'_>> {
        let mut writing = self.writing.lock().expect("write set poisoned");
        if !writing.insert(root.to_path_buf()) {
            return Err(Error::BuildInProgress(root.to_path_buf()));
        }
        Ok(WriteGuard {
            database: self,
            root: root.to_path_buf(),
        })
    }
}

struct WriteGuard<'a> {
    database: &'a SearchDatabase,
    root: PathBuf,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.database
            .writing
            .lock()
            .expect("write set poisoned")
            .remove(&self.root);
    }
}

fn staged_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".new");
    PathBuf::from(staged)
}
