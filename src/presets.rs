//! Preset loading from the built-in table and project config files.

use crate::patterns::{normalize_name, MatchCriteria};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

// Embed the built-in presets directly in the binary at compile time
const BUILTIN_PRESETS_TOML: &str = include_str!("../presets.toml");

pub const PYPROJECT_FILE: &str = "pyproject.toml";
pub const CLEANERCONFIG_FILE: &str = "cleanerconfig.toml";

/// One named set of deletion parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeletionParams {
    #[serde(default, deserialize_with = "one_or_many")]
    pub dirs: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub files: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub globs: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub ignored_dirs: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub ignored_files: Vec<String>,
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub delete_mode: bool,
}

/// Accept either `key = "name"` or `key = ["a", "b"]`, normalized to NFC
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let values = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    };
    Ok(values.iter().map(|v| normalize_name(v)).collect())
}

impl DeletionParams {
    /// Layer `overrides` on top of `self`: non-empty lists and a set root win.
    /// Delete mode always comes from `overrides`.
    pub fn overridden_by(self, overrides: DeletionParams) -> DeletionParams {
        fn pick(over: Vec<String>, base: Vec<String>) -> Vec<String> {
            if over.is_empty() {
                base
            } else {
                over
            }
        }

        DeletionParams {
            dirs: pick(overrides.dirs, self.dirs),
            files: pick(overrides.files, self.files),
            globs: pick(overrides.globs, self.globs),
            ignored_dirs: pick(overrides.ignored_dirs, self.ignored_dirs),
            ignored_files: pick(overrides.ignored_files, self.ignored_files),
            root: overrides.root.or(self.root),
            delete_mode: overrides.delete_mode,
        }
    }

    /// True if at least one of dirs, files or globs is set
    pub fn has_targets(&self) -> bool {
        !(self.dirs.is_empty() && self.files.is_empty() && self.globs.is_empty())
    }

    /// Root to clean, falling back to the current working directory
    pub fn resolved_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => env::current_dir().context("Failed to determine current directory"),
        }
    }

    pub fn to_criteria(&self) -> Result<MatchCriteria> {
        Ok(MatchCriteria::new(self.resolved_root()?)
            .with_dir_names(&self.dirs)
            .with_file_names(&self.files)
            .with_glob_patterns(&self.globs)
            .with_ignored_dir_names(&self.ignored_dirs)
            .with_ignored_file_names(&self.ignored_files))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    tool: ToolTable,
}

#[derive(Debug, Default, Deserialize)]
struct ToolTable {
    #[serde(default)]
    cleaner: CleanerTable,
}

#[derive(Debug, Default, Deserialize)]
struct CleanerTable {
    #[serde(default)]
    presets: BTreeMap<String, DeletionParams>,
}

fn parse_presets(content: &str) -> std::result::Result<BTreeMap<String, DeletionParams>, toml::de::Error> {
    let config: ConfigFile = toml::from_str(content)?;
    Ok(config.tool.cleaner.presets)
}

fn read_presets(path: &Path) -> Result<BTreeMap<String, DeletionParams>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_presets(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Find the nearest `pyproject.toml` and `cleanerconfig.toml` at or above `start`
pub fn find_configs(start: &Path) -> (Option<PathBuf>, Option<PathBuf>) {
    let mut pyproject = None;
    let mut cleanerconfig = None;

    for dir in start.ancestors() {
        if pyproject.is_none() {
            let candidate = dir.join(PYPROJECT_FILE);
            if candidate.is_file() {
                pyproject = Some(candidate);
            }
        }
        if cleanerconfig.is_none() {
            let candidate = dir.join(CLEANERCONFIG_FILE);
            if candidate.is_file() {
                cleanerconfig = Some(candidate);
            }
        }
        if pyproject.is_some() && cleanerconfig.is_some() {
            break;
        }
    }

    (pyproject, cleanerconfig)
}

/// Load presets, later layers replacing earlier ones by name:
/// built-in, nearest `pyproject.toml`, nearest `cleanerconfig.toml`, then `custom_config`.
pub fn load_presets(start: &Path, custom_config: Option<&Path>) -> Result<BTreeMap<String, DeletionParams>> {
    let mut presets =
        parse_presets(BUILTIN_PRESETS_TOML).context("Failed to parse built-in presets")?;

    let (pyproject, cleanerconfig) = find_configs(start);
    let custom = custom_config.map(Path::to_path_buf);

    for path in [pyproject, cleanerconfig, custom].into_iter().flatten() {
        log::debug!("Loading presets from {}", path.display());
        presets.extend(read_presets(&path)?);
    }

    Ok(presets)
}
