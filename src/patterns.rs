//! Match criteria and the compiled matcher used while walking a tree.

use crate::error::ScanError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::env;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Normalize a name to NFC so that composed and decomposed spellings compare equal
pub fn normalize_name(name: &str) -> String {
    name.nfc().collect()
}

fn normalized_set<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| normalize_name(name.as_ref()))
        .collect()
}

/// What to look for under `root`, and what never to touch.
///
/// Built once per run and never mutated afterwards. Every name and pattern is
/// stored in NFC form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCriteria {
    root: PathBuf,
    dir_names: BTreeSet<String>,
    file_names: BTreeSet<String>,
    glob_patterns: BTreeSet<String>,
    ignored_dir_names: BTreeSet<String>,
    ignored_file_names: BTreeSet<String>,
}

impl Default for MatchCriteria {
    fn default() -> Self {
        let root = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(root)
    }
}

impl MatchCriteria {
    /// Criteria with empty name sets rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MatchCriteria {
            root: root.into(),
            dir_names: BTreeSet::new(),
            file_names: BTreeSet::new(),
            glob_patterns: BTreeSet::new(),
            ignored_dir_names: BTreeSet::new(),
            ignored_file_names: BTreeSet::new(),
        }
    }

    pub fn with_dir_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dir_names = normalized_set(names);
        self
    }

    pub fn with_file_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.file_names = normalized_set(names);
        self
    }

    /// Glob patterns are evaluated against paths relative to the root
    pub fn with_glob_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.glob_patterns = normalized_set(patterns);
        self
    }

    pub fn with_ignored_dir_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_dir_names = normalized_set(names);
        self
    }

    pub fn with_ignored_file_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_file_names = normalized_set(names);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir_names(&self) -> &BTreeSet<String> {
        &self.dir_names
    }

    pub fn file_names(&self) -> &BTreeSet<String> {
        &self.file_names
    }

    pub fn glob_patterns(&self) -> &BTreeSet<String> {
        &self.glob_patterns
    }

    pub fn ignored_dir_names(&self) -> &BTreeSet<String> {
        &self.ignored_dir_names
    }

    pub fn ignored_file_names(&self) -> &BTreeSet<String> {
        &self.ignored_file_names
    }

    /// True when no rule could ever select anything
    pub fn is_empty(&self) -> bool {
        self.dir_names.is_empty() && self.file_names.is_empty() && self.glob_patterns.is_empty()
    }
}

/// Compiled form of [`MatchCriteria`] consulted for every walked entry
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    dir_names: BTreeSet<String>,
    file_names: BTreeSet<String>,
    ignored_dir_names: BTreeSet<String>,
    ignored_file_names: BTreeSet<String>,
    globset: GlobSet,
}

impl PatternMatcher {
    pub fn new(criteria: &MatchCriteria) -> Result<Self, ScanError> {
        let mut builder = GlobSetBuilder::new();

        for pattern in criteria.glob_patterns() {
            // `*` stays within one path segment; only `**` crosses separators
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| ScanError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }

        let globset = builder.build().map_err(|source| ScanError::InvalidPattern {
            pattern: criteria
                .glob_patterns()
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            source,
        })?;

        Ok(PatternMatcher {
            dir_names: criteria.dir_names().clone(),
            file_names: criteria.file_names().clone(),
            ignored_dir_names: criteria.ignored_dir_names().clone(),
            ignored_file_names: criteria.ignored_file_names().clone(),
            globset,
        })
    }

    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dir_names.contains(&normalize_name(name))
    }

    pub fn is_target_dir(&self, name: &str) -> bool {
        self.dir_names.contains(&normalize_name(name))
    }

    pub fn is_ignored_file(&self, name: &str) -> bool {
        self.ignored_file_names.contains(&normalize_name(name))
    }

    pub fn is_target_file(&self, name: &str) -> bool {
        self.file_names.contains(&normalize_name(name))
    }

    /// Match a root-relative path against the glob patterns
    pub fn matches_glob(&self, relative: &Path) -> bool {
        if self.globset.is_empty() {
            return false;
        }
        self.globset.is_match(relative_glob_key(relative))
    }
}

/// Render a relative path with `/` separators and NFC components
fn relative_glob_key(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| {
            if let Component::Normal(os_str) = c {
                Some(normalize_name(&os_str.to_string_lossy()))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
