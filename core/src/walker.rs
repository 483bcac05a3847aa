//! Recursive filesystem traversal with exclusion filtering
//!
//! The walk is depth-first over `tokio::fs`, emitting every accepted file
//! through a callback as soon as it is discovered. A single unreadable
//! subtree is logged and skipped; only a failure to read the walk root
//! itself fails the whole traversal.

use crate::error::{Error, Result};
use crate::exclude::ExcludedDirs;
use futures::future::{BoxFuture, FutureExt};
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Walk the subtree of `root`, calling `on_file` for each accepted file.
///
/// Skips dot-prefixed entries (files and directories), excluded
/// directories, and symbolic links. Entries are streamed in discovery
/// order; nothing is buffered here.
pub async fn walk_files<F>(root: &Path, excluded: &ExcludedDirs, on_file: &mut F) -> Result<()>
where
    F: FnMut(&Path) + Send,
{
    let reader = fs::read_dir(root).await.map_err(|source| Error::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    visit_entries(reader, excluded, on_file).await;
    Ok(())
}

/// Collect the walk into a list instead of streaming it.
pub async fn collect_files(root: &Path, excluded: &ExcludedDirs) -> Result<Vec<String>> {
    let mut files = Vec::new();
    walk_files(root, excluded, &mut |path: &Path| {
        files.push(path.to_string_lossy().into_owned());
    })
    .await?;
    Ok(files)
}

fn visit_entries<'a, F>(
    mut reader: fs::ReadDir,
    excluded: &'a ExcludedDirs,
    on_file: &'a mut F,
) -> BoxFuture<'a, ()>
where
    F: FnMut(&Path) + Send,
{
    async move {
        loop {
            let entry = match reader.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("error while reading directory entries: {}", e);
                    break;
                }
            };

            let name = entry.file_name();
            let name = name.to_string_lossy();
            // hidden-file marker, applies to files and directories alike
            if name.starts_with('.') {
                continue;
            }

            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(e) => {
                    warn!("cannot stat {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            if file_type.is_symlink() {
                // opaque; never followed
                debug!("skipping symlink {}", entry.path().display());
                continue;
            }

            if file_type.is_dir() {
                let path = entry.path();
                if excluded.contains(&path) {
                    debug!("skipping excluded directory {}", path.display());
                    continue;
                }
                match fs::read_dir(&path).await {
                    Ok(child_reader) => {
                        visit_entries(child_reader, excluded, &mut *on_file).await;
                    }
                    Err(e) => warn!("cannot read directory {}: {}", path.display(), e),
                }
            } else if file_type.is_file() {
                on_file(&entry.path());
            }
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use tempfile::TempDir;

    async fn walk_set(root: &Path, excluded: &ExcludedDirs) -> HashSet<String> {
        collect_files(root, excluded).await.unwrap().into_iter().collect()
    }

    fn touch(path: PathBuf) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[tokio::test]
    async fn hidden_entries_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root.join("a.ts"));
        touch(root.join(".hidden"));
        touch(root.join(".git/config"));
        touch(root.join("src/lib.rs"));

        let found = walk_set(root, &ExcludedDirs::new()).await;
        assert_eq!(found.len(), 2);
        assert!(found.contains(&root.join("a.ts").to_string_lossy().into_owned()));
        assert!(found.contains(&root.join("src/lib.rs").to_string_lossy().into_owned()));
    }

    #[tokio::test]
    async fn excluded_directories_are_pruned_by_absolute_path() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root.join("keep.rs"));
        touch(root.join("build/out.o"));
        touch(root.join("build/deep/other.o"));

        let mut excluded = ExcludedDirs::new();
        excluded.insert(root.join("build"));

        let found = walk_set(root, &excluded).await;
        assert_eq!(
            found,
            HashSet::from([root.join("keep.rs").to_string_lossy().into_owned()])
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_are_not_followed() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root.join("real/file.txt"));
        std::os::unix::fs::symlink(root.join("real"), root.join("linked")).unwrap();

        let found = walk_set(root, &ExcludedDirs::new()).await;
        assert_eq!(
            found,
            HashSet::from([root.join("real/file.txt").to_string_lossy().into_owned()])
        );
    }

    #[tokio::test]
    async fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does-not-exist");

        let result = collect_files(&missing, &ExcludedDirs::new()).await;
        assert!(matches!(result, Err(Error::RootUnreadable { .. })));
    }

    #[tokio::test]
    async fn files_stream_through_the_callback() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root.join("one.rs"));
        touch(root.join("two.rs"));

        let mut seen = 0usize;
        walk_files(root, &ExcludedDirs::new(), &mut |_path: &Path| seen += 1)
            .await
            .unwrap();
        assert_eq!(seen, 2);
    }
}
