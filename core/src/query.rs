//! Query execution over database snapshots
//!
//! Scans every root's file list through the matcher, batching strong
//! matches out to the caller as they accumulate and capping both strong
//! and fuzzy totals so one keystroke never scans unbounded. The final
//! ordering is match-kind tiers (database order within a tier) with all
//! fuzzy matches after every strong one.

use crate::matcher::{classify, MatchKind};
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Sentinel shown when no database has been built yet.
pub const MSG_DATABASE_MISSING: &str = "file list database not exist, please build it";

/// Sentinel shown when the scan produced nothing.
pub const MSG_NO_MATCH: &str = "no matching result";

/// One row of a query result: a matched file, or a sentinel message.
///
/// Serializable so hosts can hand rows straight to their UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryItem {
    /// Display label: the base name, or the message text
    pub label: String,

    /// Subtitle: directory relative to the workspace root
    pub description: String,

    /// Extra line, used by sentinel messages
    pub detail: Option<String>,

    /// Opaque payload: the absolute path to open. `None` for messages.
    pub path: Option<String>,
}

impl QueryItem {
    /// Result row for a matched file.
    pub fn file(root: &Path, absolute: &str) -> Self {
        let path = Path::new(absolute);
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| absolute.to_string());
        let relative = path.strip_prefix(root).unwrap_or(path);
        let description = relative
            .parent()
            .map(|parent| parent.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            label,
            description,
            detail: None,
            path: Some(absolute.to_string()),
        }
    }

    /// Sentinel row carrying a message instead of a file.
    pub fn message(text: &str, detail: Option<String>) -> Self {
        Self {
            label: text.to_string(),
            description: String::new(),
            detail,
            path: None,
        }
    }

    /// Whether this row is a sentinel message.
    pub fn is_message(&self) -> bool {
        self.path.is_none()
    }
}

/// Scan the given per-root snapshots for `pattern`.
///
/// `on_batch` receives interim batches of strong matches in scan order;
/// the returned vector is the final, fully ordered result set.
pub fn scan<F>(
    pattern: &str,
    per_root: &[(&Path, Arc<Vec<String>>)],
    settings: &Settings,
    mut on_batch: F,
) -> Vec<QueryItem>
where
    F: FnMut(&[QueryItem]),
{
    // a leading relative-path marker carries no signal
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);

    let total_entries: usize = per_root.iter().map(|(_, files)| files.len()).sum();
    if total_entries == 0 {
        return vec![QueryItem::message(MSG_DATABASE_MISSING, None)];
    }

    // one bucket per strong tier, in display order
    let mut tiers: [Vec<QueryItem>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut fuzzy: Vec<QueryItem> = Vec::new();
    let mut batch: Vec<QueryItem> = Vec::new();
    let mut strong_total = 0usize;

    'scan: for (root, files) in per_root {
        for file in files.iter() {
            match classify(pattern, file, root) {
                Some(MatchKind::BaseNameFuzzy) => {
                    if fuzzy.len() < settings.max_fuzzy_results {
                        fuzzy.push(QueryItem::file(root, file));
                    }
                }
                Some(kind) => {
                    let item = QueryItem::file(root, file);
                    batch.push(item.clone());
                    let tier = match kind {
                        MatchKind::BaseName => 0,
                        MatchKind::DirPath => 1,
                        _ => 2,
                    };
                    tiers[tier].push(item);
                    strong_total += 1;
                    if batch.len() >= settings.result_batch_size {
                        on_batch(&batch);
                        batch.clear();
                    }
                    if strong_total >= settings.max_strong_results {
                        break 'scan;
                    }
                }
                None => {}
            }
        }
    }
    if !batch.is_empty() {
        on_batch(&batch);
    }

    let mut results: Vec<QueryItem> = tiers.into_iter().flatten().collect();
    results.extend(fuzzy);
    if results.is_empty() {
        return vec![QueryItem::message(MSG_NO_MATCH, None)];
    }
    results
}
