//! Full-history recomputation on a single-entry mutation.
//!
//! The trailing 4/7-entry windows and the all-time average are defined by
//! position in the sorted sequence, not by elapsed time, so inserting an
//! entry anywhere but the tail shifts window membership for every entry after
//! it. Recomputing the whole history on each mutation is therefore the only
//! trivially-correct strategy, and at daily granularity the history stays
//! small enough that O(n) per mutation is a non-issue.

use crate::entry::Entry;
use crate::goal::Goal;
use crate::metrics::{self, ComputedEntry, EntryMetrics, MetricsConfig};

/// Output of folding a candidate entry into a history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recomputed {
    /// The full history, sorted by date, every entry freshly annotated.
    pub history: Vec<ComputedEntry>,
    /// The annotated row whose identity matches the candidate.
    pub candidate: ComputedEntry,
}

/// Merge `candidate` into `history` and recompute every derived metric.
///
/// If the history already holds an entry with the candidate's id, its kcal
/// figures are replaced in place — the stored date wins, since dates are
/// immutable after creation. Otherwise the candidate is appended. The caller
/// is responsible for having validated the candidate (window membership,
/// date uniqueness) beforehand; given a distinct id with an already-used
/// date, this function will happily produce a duplicate-date history.
pub fn fold_and_compute(
    candidate: &Entry,
    history: &[Entry],
    goal: Option<&Goal>,
    config: &MetricsConfig,
) -> Recomputed {
    let mut merged: Vec<Entry> = history.to_vec();
    match merged.iter_mut().find(|e| e.id == candidate.id) {
        Some(existing) => {
            existing.set_kcals(candidate.burned, candidate.consumed);
            existing.revision = candidate.revision;
        }
        None => merged.push(candidate.clone()),
    }

    let history = metrics::compute(&merged, goal, config);
    let candidate = history
        .iter()
        .find(|row| row.entry.id == candidate.id)
        .cloned()
        // The merge above guarantees the id is present.
        .unwrap_or_else(|| ComputedEntry {
            entry: candidate.clone(),
            metrics: EntryMetrics::default(),
        });

    Recomputed { history, candidate }
}
