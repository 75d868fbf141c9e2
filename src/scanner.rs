//! Tree walking and target selection.

use crate::error::ScanError;
use crate::patterns::{MatchCriteria, PatternMatcher};

use ignore::{DirEntry, WalkBuilder};
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Whether a target is removed as a whole subtree or as a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Directory,
    File,
}

/// A path selected for removal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeletionTarget {
    pub path: PathBuf,
    pub kind: TargetKind,
}

impl DeletionTarget {
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        DeletionTarget {
            path: path.into(),
            kind: TargetKind::Directory,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        DeletionTarget {
            path: path.into(),
            kind: TargetKind::File,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == TargetKind::Directory
    }
}

/// Make the root absolute and check that it is an existing directory
fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let root = std::path::absolute(root).map_err(|source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    match fs::metadata(&root) {
        Ok(metadata) if metadata.is_dir() => Ok(root),
        Ok(_) => Err(ScanError::NotADirectory(root)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(ScanError::RootNotFound(root)),
        Err(source) => Err(ScanError::Io { path: root, source }),
    }
}

fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

fn is_dir_entry(entry: &DirEntry) -> bool {
    // Symlinks are not followed, so a link to a directory reports as a link here
    entry.file_type().is_some_and(|ft| ft.is_dir())
}

/// Decide whether the walker may yield (and, for directories, enter) an entry
fn keep_entry(entry: &DirEntry, matcher: &PatternMatcher) -> bool {
    if entry.depth() == 0 {
        return true;
    }

    if is_dir_entry(entry) && matcher.is_ignored_dir(&entry_name(entry)) {
        debug!("Pruning ignored directory: {}", entry.path().display());
        return false;
    }

    // Children of a matched directory are covered by that directory's removal
    if entry.depth() >= 2 {
        if let Some(parent_name) = entry
            .path()
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy())
        {
            if matcher.is_target_dir(&parent_name) {
                return false;
            }
        }
    }

    true
}

/// Walk `criteria.root()` and return every path that qualifies for removal.
///
/// Siblings are visited in file-name order, so the result is deterministic for a
/// given tree. Ignored directories shield their whole subtree from every rule,
/// matched directories are reported once and not entered, and the returned list
/// never holds a path nested under a directory target.
pub fn find_targets(criteria: &MatchCriteria) -> Result<Vec<DeletionTarget>, ScanError> {
    let root = resolve_root(criteria.root())?;
    let matcher = Arc::new(PatternMatcher::new(criteria)?);

    debug!("Scanning directory {}", root.display());

    let filter_matcher = Arc::clone(&matcher);
    let walker = WalkBuilder::new(&root)
        .hidden(false)
        // Selection is driven only by the criteria, never by ignore files
        .git_ignore(false)
        .ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| keep_entry(entry, &filter_matcher))
        .build();

    let mut targets = Vec::new();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Failed to access entry in {}: {}", root.display(), err);
                continue;
            }
        };

        // Never treat the root itself as a target
        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path();
        let name = entry_name(&entry);

        if is_dir_entry(&entry) {
            if matcher.is_target_dir(&name) {
                debug!("Matched directory: {}", path.display());
                targets.push(DeletionTarget::directory(path));
            }
            continue;
        }

        if matcher.is_ignored_file(&name) {
            debug!("Skipping ignored file: {}", path.display());
            continue;
        }

        let relative = path.strip_prefix(&root).unwrap_or(path);
        if matcher.is_target_file(&name) || matcher.matches_glob(relative) {
            debug!("Matched file: {}", path.display());
            targets.push(DeletionTarget::file(path));
        }
    }

    Ok(dedup_nested(targets))
}

/// Drop duplicates and any target beneath a directory target, keeping order
pub fn dedup_nested(targets: Vec<DeletionTarget>) -> Vec<DeletionTarget> {
    let dirs: Vec<PathBuf> = targets
        .iter()
        .filter(|t| t.is_dir())
        .map(|t| t.path.clone())
        .collect();

    let mut seen = HashSet::new();
    targets
        .into_iter()
        .filter(|target| {
            let nested = dirs
                .iter()
                .any(|dir| target.path != *dir && target.path.starts_with(dir));
            !nested && seen.insert(target.path.clone())
        })
        .collect()
}
