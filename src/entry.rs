//! Daily energy-balance entries.
//!
//! An [`Entry`] records one user's kcal burned and consumed for one calendar
//! day. Dates are day-granular by construction (`NaiveDate` carries no
//! time-of-day), and the date and id are immutable after creation — only the
//! kcal figures may change. Derived metrics are never stored on the entry;
//! they live in [`crate::metrics::EntryMetrics`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Allocate a fresh random id.
    pub fn new() -> Self {
        EntryId(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry:{}", self.0)
    }
}

/// Stable identifier for a user, resolved by the caller before any ledger
/// operation (authentication is outside this crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        UserId(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// One user's energy-balance record for one calendar day.
///
/// At most one entry may exist per (user, date) pair; the ingestion boundary
/// enforces this before any entry reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub user: UserId,
    /// Calendar day this entry covers. Immutable after creation.
    pub date: NaiveDate,
    /// Kcal burned over the day.
    pub burned: u32,
    /// Kcal consumed over the day.
    pub consumed: u32,
    /// Optimistic-concurrency token, replaced by the store on every
    /// successful write.
    pub revision: Uuid,
}

impl Entry {
    /// Create a new entry with a fresh id and revision.
    pub fn new(user: UserId, date: NaiveDate, burned: u32, consumed: u32) -> Self {
        Self {
            id: EntryId::new(),
            user,
            date,
            burned,
            consumed,
            revision: Uuid::new_v4(),
        }
    }

    /// Net energy difference for the day: burned minus consumed.
    ///
    /// Widened to `i64` so downstream accumulation never overflows across a
    /// multi-year series.
    pub fn diff(&self) -> i64 {
        i64::from(self.burned) - i64::from(self.consumed)
    }

    /// Replace the mutable kcal figures. The date and id stay fixed.
    pub fn set_kcals(&mut self, burned: u32, consumed: u32) {
        self.burned = burned;
        self.consumed = consumed;
    }
}

/// Payload for creating a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub burned: u32,
    pub consumed: u32,
}

/// Payload for updating an existing entry's kcal figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPatch {
    pub burned: u32,
    pub consumed: u32,
}
