//! Pattern matching and match-kind classification
//!
//! A candidate path is classified against a query pattern in a fixed order:
//! substring of the base name, ordered subsequence of the base name,
//! substring of the root-relative path, substring of the absolute path.
//! The enum order of [`MatchKind`] is the display rank, with fuzzy results
//! ranked below every substring match.

use std::path::Path;

/// How a candidate path matched the query pattern.
///
/// The derived `Ord` is the display rank: base-name substring matches come
/// first and base-name subsequence ("fuzzy") matches come last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    /// Pattern is a substring of the file's base name
    BaseName,

    /// Pattern is a substring of the path relative to the workspace root
    DirPath,

    /// Pattern is a substring of the full absolute path
    FullPath,

    /// Pattern characters appear in order within the base name
    BaseNameFuzzy,
}

impl MatchKind {
    /// Substring matches are "strong"; subsequence matches are not.
    pub fn is_strong(self) -> bool {
        !matches!(self, MatchKind::BaseNameFuzzy)
    }
}

/// Classify `candidate` (an absolute path) against `pattern`.
///
/// Returns `None` when nothing matched. Substring checks are
/// case-insensitive; the subsequence check compares characters exactly.
pub fn classify(pattern: &str, candidate: &str, root: &Path) -> Option<MatchKind> {
    if pattern.is_empty() || candidate.is_empty() {
        return None;
    }

    let pattern_lower = pattern.to_lowercase();
    let base_name = Path::new(candidate)
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    if base_name.to_lowercase().contains(&pattern_lower) {
        return Some(MatchKind::BaseName);
    }
    if fuzzy_match(pattern, &base_name) {
        return Some(MatchKind::BaseNameFuzzy);
    }

    let relative = Path::new(candidate)
        .strip_prefix(root)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| candidate.to_string());
    if relative.to_lowercase().contains(&pattern_lower) {
        return Some(MatchKind::DirPath);
    }

    if candidate.to_lowercase().contains(&pattern_lower) {
        return Some(MatchKind::FullPath);
    }

    None
}

/// Ordered-subsequence match: every pattern character must appear in
/// `candidate` in the same relative order, not necessarily contiguously.
///
/// Single pass, O(len(candidate)). An empty pattern or empty candidate
/// never matches.
pub fn fuzzy_match(pattern: &str, candidate: &str) -> bool {
    if pattern.is_empty() || candidate.is_empty() {
        return false;
    }

    let mut candidate_chars = candidate.chars();
    'pattern: for pattern_char in pattern.chars() {
        for candidate_char in candidate_chars.by_ref() {
            if candidate_char == pattern_char {
                continue 'pattern;
            }
        }
        return false;
    }
    true
}

/// True when the pattern matches the candidate in any way.
pub fn is_pattern_match(pattern: &str, candidate: &str, root: &Path) -> bool {
    classify(pattern, candidate, root).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn base_name_substring_wins() {
        let root = Path::new("/proj");
        assert_eq!(
            classify("main", "/proj/src/main.rs", root),
            Some(MatchKind::BaseName)
        );
        // case-insensitive
        assert_eq!(
            classify("MAIN", "/proj/src/main.rs", root),
            Some(MatchKind::BaseName)
        );
    }

    #[test]
    fn dir_path_substring() {
        let root = Path::new("/proj");
        // "src/u" is not in the base name, but is in the relative path
        assert_eq!(
            classify("src/u", "/proj/src/utils.rs", root),
            Some(MatchKind::DirPath)
        );
    }

    #[test]
    fn full_path_substring() {
        let root = Path::new("/proj");
        // only the absolute path contains "proj/s"
        assert_eq!(
            classify("proj/s", "/proj/src/app.py", root),
            Some(MatchKind::FullPath)
        );
    }

    #[test]
    fn fuzzy_subsequence_on_base_name() {
        let root = Path::new("/proj");
        // u-l-r appear in order in "utils.rs" but not contiguously
        assert_eq!(
            classify("ulr", "/proj/src/utils.rs", root),
            Some(MatchKind::BaseNameFuzzy)
        );
    }

    #[test]
    fn atx_against_app_text_is_not_matched() {
        // fixture from the original picker: "atx" vs "app/text.ts";
        // 'a' never appears in the base name "text.ts", no substring of
        // any form contains "atx"
        let root = Path::new("/proj");
        assert!(!fuzzy_match("atx", "text.ts"));
        assert_eq!(classify("atx", "/proj/app/text.ts", root), None);
    }

    #[test]
    fn empty_pattern_or_candidate_never_matches() {
        let root = Path::new("/proj");
        assert!(!fuzzy_match("", "main.rs"));
        assert!(!fuzzy_match("main", ""));
        assert_eq!(classify("", "/proj/main.rs", root), None);
        assert_eq!(classify("main", "", root), None);
    }

    #[test]
    fn fuzzy_is_case_sensitive() {
        assert!(fuzzy_match("mrs", "main.rs"));
        assert!(!fuzzy_match("MRS", "main.rs"));
    }

    #[test]
    fn display_rank_puts_fuzzy_last() {
        assert!(MatchKind::BaseName < MatchKind::DirPath);
        assert!(MatchKind::DirPath < MatchKind::FullPath);
        assert!(MatchKind::FullPath < MatchKind::BaseNameFuzzy);
        assert!(!MatchKind::BaseNameFuzzy.is_strong());
        assert!(MatchKind::BaseName.is_strong());
    }
}
