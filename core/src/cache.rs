//! Per-workspace cache directory layout
//!
//! Every workspace root gets its own directory under the cache base
//! (`~/.fpick` by default), named by a hash of the root path so unrelated
//! roots never collide. The search database and the recency list live in
//! that directory, never inside the indexed tree itself.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the cache folder; also one of the built-in excluded names.
pub const CACHE_DIR_NAME: &str = ".fpick";

/// File holding the indexed file list of one workspace root.
pub const SEARCH_DATABASE_FILE: &str = "file_index.db";

/// File holding the recently-opened list of one workspace root.
pub const RECENCY_FILE: &str = "recently_files.db";

/// Resolves cache file locations for workspace roots.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    base: PathBuf,
}

impl CacheLayout {
    /// Layout rooted at `~/.fpick`. Fails if the directory cannot be created.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| Error::CacheDir {
            path: PathBuf::from(CACHE_DIR_NAME),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found"),
        })?;
        Self::with_base(home.join(CACHE_DIR_NAME))
    }

    /// Layout rooted at an explicit base directory.
    pub fn with_base(base: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&base).map_err(|source| Error::CacheDir {
            path: base.clone(),
            source,
        })?;
        Ok(Self { base })
    }

    /// The cache directory of one workspace root, created on demand.
    pub fn root_dir(&self, workspace_root: &Path) -> Result<PathBuf> {
        let digest = blake3::hash(workspace_root.to_string_lossy().as_bytes());
        let dir = self.base.join(digest.to_hex().as_str());
        if !dir.exists() {
            debug!("mapping workspace root {} to {}", workspace_root.display(), dir.display());
            std::fs::create_dir_all(&dir).map_err(|source| Error::CacheDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(dir)
    }

    /// Path of the search database file for `workspace_root`.
    pub fn database_file(&self, workspace_root: &Path) -> Result<PathBuf> {
        Ok(self.root_dir(workspace_root)?.join(SEARCH_DATABASE_FILE))
    }

    /// Path of the recency file for `workspace_root`.
    pub fn recency_file(&self, workspace_root: &Path) -> Result<PathBuf> {
        Ok(self.root_dir(workspace_root)?.join(RECENCY_FILE))
    }

    /// Base directory of the whole cache.
    pub fn base(&self) -> &Path {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn distinct_roots_get_distinct_dirs() {
        let tmp = TempDir::new().unwrap();
        let layout = CacheLayout::with_base(tmp.path().join("cache")).unwrap();

        let a = layout.database_file(Path::new("/p1")).unwrap();
        let b = layout.database_file(Path::new("/p2")).unwrap();
        assert_ne!(a, b);
        assert!(a.parent().unwrap().exists());
        assert!(b.parent().unwrap().exists());
    }

    #[test]
    fn database_and_recency_files_never_collide() {
        let tmp = TempDir::new().unwrap();
        let layout = CacheLayout::with_base(tmp.path().join("cache")).unwrap();

        let db = layout.database_file(Path::new("/p1")).unwrap();
        let recency = layout.recency_file(Path::new("/p1")).unwrap();
        assert_ne!(db, recency);
        assert_eq!(db.parent(), recency.parent());
    }

    #[test]
    fn unwritable_base_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = CacheLayout::with_base(blocker.join("cache"));
        assert!(matches!(result, Err(Error::CacheDir { .. })));
    }
}
