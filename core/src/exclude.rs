//! Excluded-directory set and exclusion state checks
//!
//! Two kinds of entries: built-in names that are skipped wherever they
//! appear (version-control metadata, editor folders, our own cache
//! folder), and absolute directories the user excluded explicitly. Only
//! the user entries are persisted, as a colon-delimited string with the
//! owning workspace root folded into a `${workspace}` placeholder.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::cache::CACHE_DIR_NAME;

/// Directory names never indexed, wherever they appear.
pub const DEFAULT_EXCLUDED_NAMES: &[&str] = &[".git", ".repo", ".vscode", CACHE_DIR_NAME];

/// Placeholder for the workspace root in the persisted config string.
pub const WORKSPACE_PLACEHOLDER: &str = "${workspace}";

/// Exclusion state of one directory, per [`ExcludedDirs::state_of`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionState {
    /// Neither the directory nor any ancestor is excluded
    NotExcluded,

    /// The directory itself is in the excluded set
    ExactlyExcluded,

    /// An ancestor is excluded; the payload names it
    ParentExcluded(PathBuf),
}

/// Set of excluded directories under the workspace roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedDirs {
    dirs: BTreeSet<PathBuf>,
}

impl ExcludedDirs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the persisted colon-delimited config string. `primary_root`
    /// replaces the `${workspace}` placeholder, matching how the string
    /// was written.
    pub fn from_config_string(config: &str, primary_root: &Path) -> Self {
        let primary = primary_root.to_string_lossy();
        let dirs = config
            .split(':')
            .filter(|entry| !entry.is_empty())
            .map(|entry| PathBuf::from(entry.replace(WORKSPACE_PLACEHOLDER, &primary)))
            .collect();
        Self { dirs }
    }

    /// Serialize user entries back to the config string. Built-in names
    /// are never written; paths under `primary_root` are folded into the
    /// `${workspace}` placeholder so the setting survives a checkout move.
    pub fn to_config_string(&self, primary_root: &Path) -> String {
        let primary = primary_root.to_string_lossy();
        self.dirs
            .iter()
            .map(|dir| {
                dir.to_string_lossy()
                    .replace(primary.as_ref(), WORKSPACE_PLACEHOLDER)
            })
            .collect::<Vec<_>>()
            .join(":")
    }

    /// True when `dir` is skipped: its absolute path is a user entry, or
    /// its bare name is one of the built-in excluded names.
    pub fn contains(&self, dir: &Path) -> bool {
        if self.dirs.contains(dir) {
            return true;
        }
        dir.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| DEFAULT_EXCLUDED_NAMES.contains(&name))
    }

    /// Walk upward from `dir` to `root`, component by component, testing
    /// membership at each level. `ExactlyExcluded` only when `dir` itself
    /// matches; the first matching ancestor otherwise.
    pub fn state_of(&self, dir: &Path, root: &Path) -> ExclusionState {
        let mut current = dir;
        loop {
            if self.contains(current) {
                if current == dir {
                    return ExclusionState::ExactlyExcluded;
                }
                return ExclusionState::ParentExcluded(current.to_path_buf());
            }
            if current == root {
                return ExclusionState::NotExcluded;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return ExclusionState::NotExcluded,
            }
        }
    }

    /// Add an absolute directory to the user entries.
    pub fn insert(&mut self, dir: PathBuf) -> bool {
        self.dirs.insert(dir)
    }

    /// Remove an absolute directory from the user entries.
    pub fn remove(&mut self, dir: &Path) -> bool {
        self.dirs.remove(dir)
    }

    /// User-excluded directories, in path order.
    pub fn user_dirs(&self) -> impl Iterator<Item = &PathBuf> {
        self.dirs.iter()
    }
}

/// The workspace root that contains `dir`, if any.
pub fn owning_root<'a>(dir: &Path, roots: &'a [PathBuf]) -> Option<&'a PathBuf> {
    roots.iter().find(|root| dir.starts_with(root))
}
