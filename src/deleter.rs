//! Removal of scanned targets, with per-item failure isolation.

use crate::scanner::{DeletionTarget, TargetKind};

use log::debug;
use std::fs;
use std::io;

/// What happened to a single target
#[derive(Debug)]
pub enum ItemOutcome {
    /// Dry run: the target would have been removed
    Projected,
    Deleted,
    Failed(io::Error),
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ItemOutcome::Failed(_))
    }
}

/// Counts of removed (or, in a dry run, removable) and failed targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    deleted: usize,
    failed: usize,
}

impl OutcomeTally {
    pub fn deleted(&self) -> usize {
        self.deleted
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    fn record(mut self, outcome: &ItemOutcome) -> Self {
        if outcome.is_success() {
            self.deleted += 1;
        } else {
            self.failed += 1;
        }
        self
    }
}

/// Receives structured progress events from [`process_targets`]
pub trait Reporter {
    /// Called before a target is acted on
    fn on_action(&mut self, target: &DeletionTarget, delete_mode: bool);

    /// Called after a target was removed, failed, or (in a dry run) projected
    fn on_result(&mut self, target: &DeletionTarget, outcome: &ItemOutcome);

    /// Called once after every target has been processed
    fn on_summary(&mut self, tally: &OutcomeTally);
}

fn remove_target(target: &DeletionTarget) -> io::Result<()> {
    match target.kind {
        TargetKind::Directory => fs::remove_dir_all(&target.path),
        TargetKind::File => fs::remove_file(&target.path),
    }
}

/// Remove every target (or only report them when `delete_mode` is false).
///
/// A failure on one target is reported and counted but never stops the run.
pub fn process_targets<R>(reporter: &mut R, targets: &[DeletionTarget], delete_mode: bool) -> OutcomeTally
where
    R: Reporter + ?Sized,
{
    let tally = targets.iter().fold(OutcomeTally::default(), |tally, target| {
        reporter.on_action(target, delete_mode);

        let outcome = if delete_mode {
            match remove_target(target) {
                Ok(()) => ItemOutcome::Deleted,
                Err(err) => {
                    debug!("Error removing {}: {}", target.path.display(), err);
                    ItemOutcome::Failed(err)
                }
            }
        } else {
            ItemOutcome::Projected
        };

        reporter.on_result(target, &outcome);
        tally.record(&outcome)
    });

    reporter.on_summary(&tally);
    tally
}
