//! Rich diagnostic error types for the kcal-ledger.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know exactly what went wrong
//! and how to fix it. The metrics engine and the recomputation step are total
//! and raise nothing; every fallible path lives at the ingestion and storage
//! boundaries represented here.

use chrono::NaiveDate;
use miette::Diagnostic;
use thiserror::Error;
use uuid::Uuid;

use crate::entry::EntryId;
use crate::goal::GoalId;

/// Top-level error type for the ledger.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum LedgerError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Goal(#[from] GoalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Result alias used throughout the crate.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

// ---------------------------------------------------------------------------
// Goal errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GoalError {
    #[error("invalid goal window: {days} days")]
    #[diagnostic(
        code(kcal::goal::invalid_window),
        help(
            "A goal window must span at least 1 and at most 3650 days. \
             Pick a window length within that range."
        )
    )]
    InvalidWindowLength { days: u16 },

    #[error("goal start date {start} is in the past")]
    #[diagnostic(
        code(kcal::goal::start_in_past),
        help(
            "Goals created through the ledger must start today or later. \
             Backdated goals can still be seeded directly into the store."
        )
    )]
    StartInPast { start: NaiveDate },

    #[error("no active goal for user {user}")]
    #[diagnostic(
        code(kcal::goal::no_active_goal),
        help(
            "Entries are always measured against a goal. \
             Create a goal for this user before recording or listing entries."
        )
    )]
    NoActiveGoal { user: Uuid },
}

// ---------------------------------------------------------------------------
// Ingestion validation errors
// ---------------------------------------------------------------------------

/// Boundary checks that must pass before a candidate entry reaches the
/// recomputation step. Each maps to a distinct caller-observable signal.
#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("date {date} is outside the goal window {start}..={end}")]
    #[diagnostic(
        code(kcal::validate::out_of_window),
        help(
            "Entries can only be recorded for dates inside the active goal's \
             window. Check the goal's start date and window length, or create \
             a new goal covering this date."
        )
    )]
    OutOfWindow {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("an entry already exists for {date}")]
    #[diagnostic(
        code(kcal::validate::duplicate_date),
        help(
            "Each user may record at most one entry per calendar day. \
             Update the existing entry instead of creating a second one."
        )
    )]
    DuplicateDate { date: NaiveDate },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("entry {id} not found")]
    #[diagnostic(
        code(kcal::store::entry_not_found),
        help("The entry does not exist for this user. Verify the id is correct.")
    )]
    EntryNotFound { id: EntryId },

    #[error("goal {id} not found")]
    #[diagnostic(
        code(kcal::store::goal_not_found),
        help("The goal does not exist for this user. Verify the id is correct.")
    )]
    GoalNotFound { id: GoalId },

    #[error("revision conflict on {id}: expected {expected}, found {found}")]
    #[diagnostic(
        code(kcal::store::revision_conflict),
        help(
            "The row was modified by another writer since it was read. \
             Re-fetch the current state and retry the mutation."
        )
    )]
    RevisionConflict {
        id: Uuid,
        expected: Uuid,
        found: Uuid,
    },
}
