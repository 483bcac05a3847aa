//! Bounded recency list of opened files
//!
//! Strict LRU over absolute paths: recording an already-present path moves
//! it to the front without duplicating it, and the list is truncated to a
//! fixed cap. One persisted file per workspace root; writes happen only
//! when something changed, on an interval-driven flush.

use crate::cache::CacheLayout;
use crate::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Header written at the top of every recency file.
pub const RECENCY_HEADER: &str = "# auto generated file, used to cache recently opened files\n";

/// What [`RecencyTracker::record`] did with the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The list changed and will be flushed
    Recorded,

    /// Already at the front, or outside every workspace root; no change
    Unchanged,
}

#[derive(Default)]
struct RecencyState {
    lists: HashMap<PathBuf, Vec<String>>,
    loaded: bool,
    dirty: bool,
}

/// Tracks the most recently opened files across all workspace roots.
pub struct RecencyTracker {
    layout: CacheLayout,
    roots: Vec<PathBuf>,
    cap: usize,
    state: Mutex<RecencyState>,
}

impl RecencyTracker {
    pub fn new(layout: CacheLayout, roots: Vec<PathBuf>, cap: usize) -> Self {
        Self {
            layout,
            roots,
            cap,
            state: Mutex::new(RecencyState::default()),
        }
    }

    /// Record that `path` was opened: move it to the front of its root's
    /// list, inserting it if absent, evicting past the cap.
    pub async fn record(&self, path: &str) -> Result<RecordOutcome> {
        let Some(root) = self.owning_root(path) else {
            debug!("ignoring opened file outside every workspace root: {}", path);
            return Ok(RecordOutcome::Unchanged);
        };

        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;
        let list = state.lists.entry(root).or_default();

        if list.first().map(String::as_str) == Some(path) {
            // already the most recent entry; avoid a redundant persist
            return Ok(RecordOutcome::Unchanged);
        }
        list.retain(|entry| entry != path);
        list.insert(0, path.to_string());
        list.truncate(self.cap);
        state.dirty = true;
        Ok(RecordOutcome::Recorded)
    }

    /// Drop `path` from the list if present.
    pub async fn remove(&self, path: &str) -> Result<()> {
        let Some(root) = self.owning_root(path) else {
            return Ok(());
        };

        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;
        if let Some(list) = state.lists.get_mut(&root) {
            let before = list.len();
            list.retain(|entry| entry != path);
            if list.len() != before {
                state.dirty = true;
            }
        }
        Ok(())
    }

    /// The merged recency list, most recent first, loading the per-root
    /// files on first call.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;

        let mut merged = Vec::new();
        for root in &self.roots {
            if let Some(list) = state.lists.get(root) {
                merged.extend(list.iter().cloned());
            }
        }
        Ok(merged)
    }

    /// Write every root's list to disk if anything changed since the last
    /// flush. Returns whether a write happened.
    pub async fn flush_if_dirty(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        if !state.loaded || !state.dirty {
            return Ok(false);
        }

        for root in &self.roots {
            let entries = state.lists.get(root).map(Vec::as_slice).unwrap_or(&[]);
            let recency_file = self.layout.recency_file(root)?;
            let staged = recency_file.with_extension("db.new");

            let mut contents = String::from(RECENCY_HEADER);
            for entry in entries {
                contents.push_str(entry);
                contents.push('\n');
            }
            tokio::fs::write(&staged, contents).await?;
            tokio::fs::rename(&staged, &recency_file).await?;
        }
        state.dirty = false;
        debug!("persisted recently opened file lists");
        Ok(true)
    }

    /// Spawn the background flush loop. The task runs until aborted; a
    /// failed flush is logged and retried on the next tick.
    pub fn spawn_flusher(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = tracker.flush_if_dirty().await {
                    warn!("failed to persist recency list: {}", e);
                }
            }
        })
    }

    fn owning_root(&self, path: &str) -> Option<PathBuf> {
        self.roots
            .iter()
            .find(|root| Path::new(path).starts_with(root))
            .cloned()
    }

    async fn ensure_loaded(&self, state: &mut RecencyState) -> Result<()> {
        if state.loaded {
            return Ok(());
        }
        for root in &self.roots {
            let recency_file = self.layout.recency_file(root)?;
            let mut list = Vec::new();
            match tokio::fs::read_to_string(&recency_file).await {
                Ok(contents) => {
                    let root_str = root.to_string_lossy();
                    for line in contents.lines() {
                        if line.is_empty() || line.starts_with('#') {
                            continue;
                        }
                        // entries must belong to this root, and appear once
                        if !line.starts_with(root_str.as_ref()) {
                            continue;
                        }
                        if !list.iter().any(|entry| entry == line) {
                            list.push(line.to_string());
                        }
                    }
                    list.truncate(self.cap);
                }
                Err(e) => {
                    debug!(
                        "recently opened cache not present at {}: {}",
                        recency_file.display(),
                        e
                    );
                }
            }
            state.lists.insert(root.clone(), list);
        }
        state.loaded = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tracker_in(tmp: &TempDir, roots: Vec<PathBuf>, cap: usize) -> RecencyTracker {
        let layout = CacheLayout::with_base(tmp.path().join("cache")).unwrap();
        RecencyTracker::new(layout, roots, cap)
    }

    #[tokio::test]
    async fn record_moves_to_front_without_duplicating() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker_in(&tmp, vec![PathBuf::from("/proj")], 25);

        tracker.record("/proj/a.ts").await.unwrap();
        tracker.record("/proj/b.ts").await.unwrap();
        tracker.record("/proj/a.ts").await.unwrap();

        let list = tracker.list().await.unwrap();
        assert_eq!(list, ["/proj/a.ts", "/proj/b.ts"]);
    }

    #[tokio::test]
    async fn recording_the_front_entry_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker_in(&tmp, vec![PathBuf::from("/proj")], 25);

        assert_eq!(
            tracker.record("/proj/a.ts").await.unwrap(),
            RecordOutcome::Recorded
        );
        assert_eq!(
            tracker.record("/proj/a.ts").await.unwrap(),
            RecordOutcome::Unchanged
        );
        // the first record left the list dirty; flush clears it
        assert!(tracker.flush_if_dirty().await.unwrap());
        tracker.record("/proj/a.ts").await.unwrap();
        assert!(!tracker.flush_if_dirty().await.unwrap());
    }

    #[tokio::test]
    async fn list_is_truncated_at_the_cap() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker_in(&tmp, vec![PathBuf::from("/proj")], 3);

        for name in ["a", "b", "c", "d"] {
            tracker.record(&format!("/proj/{}.rs", name)).await.unwrap();
        }
        let list = tracker.list().await.unwrap();
        assert_eq!(list, ["/proj/d.rs", "/proj/c.rs", "/proj/b.rs"]);
    }

    #[tokio::test]
    async fn files_outside_every_root_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker_in(&tmp, vec![PathBuf::from("/proj")], 25);

        assert_eq!(
            tracker.record("/elsewhere/x.rs").await.unwrap(),
            RecordOutcome::Unchanged
        );
        assert!(tracker.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn flush_and_reload_round_trip() {
        let tmp = TempDir::new().unwrap();
        let layout = CacheLayout::with_base(tmp.path().join("cache")).unwrap();
        let roots = vec![PathBuf::from("/proj")];

        {
            let tracker = RecencyTracker::new(layout.clone(), roots.clone(), 25);
            tracker.record("/proj/a.ts").await.unwrap();
            tracker.record("/proj/b.ts").await.unwrap();
            assert!(tracker.flush_if_dirty().await.unwrap());
            // clean list does not rewrite
            assert!(!tracker.flush_if_dirty().await.unwrap());
        }

        let reloaded = RecencyTracker::new(layout, roots, 25);
        let list = reloaded.list().await.unwrap();
        assert_eq!(list, ["/proj/b.ts", "/proj/a.ts"]);
    }

    #[tokio::test]
    async fn persisted_entries_of_other_roots_are_filtered_out() {
        let tmp = TempDir::new().unwrap();
        let layout = CacheLayout::with_base(tmp.path().join("cache")).unwrap();
        let root = PathBuf::from("/proj");

        let recency_file = layout.recency_file(&root).unwrap();
        std::fs::write(
            &recency_file,
            "# header\n/proj/a.ts\n/other/b.ts\n/proj/a.ts\n",
        )
        .unwrap();

        let tracker = RecencyTracker::new(layout, vec![root], 25);
        let list = tracker.list().await.unwrap();
        assert_eq!(list, ["/proj/a.ts"]);
    }

    #[tokio::test]
    async fn remove_marks_dirty_only_when_present() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker_in(&tmp, vec![PathBuf::from("/proj")], 25);

        tracker.record("/proj/a.ts").await.unwrap();
        tracker.flush_if_dirty().await.unwrap();

        tracker.remove("/proj/missing.ts").await.unwrap();
        assert!(!tracker.flush_if_dirty().await.unwrap());

        tracker.remove("/proj/a.ts").await.unwrap();
        assert!(tracker.flush_if_dirty().await.unwrap());
        assert!(tracker.list().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn background_flusher_writes_on_its_interval() {
        let tmp = TempDir::new().unwrap();
        let layout = CacheLayout::with_base(tmp.path().join("cache")).unwrap();
        let root = PathBuf::from("/proj");
        let tracker = Arc::new(RecencyTracker::new(layout.clone(), vec![root.clone()], 25));

        let flusher = tracker.spawn_flusher(Duration::from_secs(10));
        tracker.record("/proj/a.ts").await.unwrap();

        tokio::time::sleep(Duration::from_secs(11)).await;
        flusher.abort();

        let contents = std::fs::read_to_string(layout.recency_file(&root).unwrap()).unwrap();
        assert!(contents.contains("/proj/a.ts"));
    }
}
