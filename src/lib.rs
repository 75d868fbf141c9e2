//! Cleaner - preset-driven project cleaner
//!
//! Cleaner walks a root directory once and selects what to remove by name and by
//! root-relative glob pattern: directories matched by name are removed as whole
//! subtrees, files matched by name or glob are removed one by one. Ignored
//! directory names shield their entire subtree from every rule, and ignored file
//! names are never selected.
//!
//! Runs are dry by default. The scan always finishes before anything is removed,
//! and a failure on one target is counted and reported without stopping the run.

pub mod deleter;
pub mod display;
pub mod error;
pub mod patterns;
pub mod presets;
pub mod scanner;

// Re-export commonly used items
pub use deleter::{process_targets, ItemOutcome, OutcomeTally, Reporter};
pub use error::ScanError;
pub use patterns::{normalize_name, MatchCriteria, PatternMatcher};
pub use presets::{find_configs, load_presets, DeletionParams};
pub use scanner::{dedup_nested, find_targets, DeletionTarget, TargetKind};
