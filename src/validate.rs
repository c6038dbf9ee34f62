//! Ingestion-boundary checks.
//!
//! Everything fallible about a candidate entry is decided here, before the
//! recomputation layer ever sees it: the date must fall inside the active
//! goal's window, and no other entry may already occupy the same (user, date)
//! slot. Both checks are pure predicates over borrowed data.

use chrono::NaiveDate;

use crate::entry::{Entry, EntryId};
use crate::error::ValidationError;
use crate::goal::Goal;

/// Reject dates outside the goal's inclusive window.
pub fn check_window(date: NaiveDate, goal: &Goal) -> Result<(), ValidationError> {
    let window = goal.window();
    if window.contains(date) {
        Ok(())
    } else {
        Err(ValidationError::OutOfWindow {
            date,
            start: window.start,
            end: window.end,
        })
    }
}

/// Reject a date already used by another entry in the history.
///
/// `exempt` names an entry allowed to keep its own date, for the update path
/// where the candidate legitimately matches its stored row.
pub fn check_unique_date(
    date: NaiveDate,
    history: &[Entry],
    exempt: Option<EntryId>,
) -> Result<(), ValidationError> {
    let taken = history
        .iter()
        .any(|e| e.date == date && Some(e.id) != exempt);
    if taken {
        Err(ValidationError::DuplicateDate { date })
    } else {
        Ok(())
    }
}

/// Run both boundary checks for a brand-new entry date.
pub fn admit_new(date: NaiveDate, goal: &Goal, history: &[Entry]) -> Result<(), ValidationError> {
    check_window(date, goal)?;
    check_unique_date(date, history, None)
}
