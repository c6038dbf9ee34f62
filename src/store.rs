//! Collaborator contracts around the core, plus an in-memory implementation.
//!
//! The core never owns storage. It reads through [`HistoryProvider`] and
//! [`GoalResolver`] and writes through [`MutationSink`]; anything that can
//! actually persist rows (a database, a file, a remote service) slots in by
//! implementing these three traits. [`InMemoryStore`] is the reference
//! implementation used by the tests, the seeds, and any embedding that does
//! not need durability.
//!
//! Writes are optimistic: every stored row carries a revision token, and a
//! mutation whose token no longer matches the stored one is rejected with
//! [`StoreError::RevisionConflict`] instead of silently clobbering a
//! concurrent writer's work.

use dashmap::DashMap;
use uuid::Uuid;

use crate::entry::{Entry, EntryId, UserId};
use crate::error::StoreError;
use crate::goal::{self, Goal, GoalId};

/// Returns all entries for a user, in no guaranteed order — the metrics
/// engine sorts defensively.
pub trait HistoryProvider {
    fn history(&self, user: UserId) -> Vec<Entry>;
}

/// Resolves goals for a user. The active goal is the most recently started
/// one; resolution policy lives here, outside the core computation.
pub trait GoalResolver {
    fn active_goal(&self, user: UserId) -> Option<Goal>;
    fn goal(&self, user: UserId, id: GoalId) -> Option<Goal>;
}

/// Persists post-validation mutations. Called only after the recomputation
/// layer has produced its output.
pub trait MutationSink {
    /// Insert or update an entry. Updates must present the revision they
    /// read; the stored row comes back with a fresh one.
    fn upsert_entry(&self, entry: Entry) -> Result<Entry, StoreError>;

    /// Delete an entry outright.
    fn remove_entry(&self, user: UserId, id: EntryId) -> Result<(), StoreError>;

    /// Insert or update a goal, with the same revision discipline as entries.
    fn upsert_goal(&self, goal: Goal) -> Result<Goal, StoreError>;
}

/// Thread-safe in-memory store keyed by user.
///
/// Each user's rows live under one `DashMap` key, so every individual trait
/// call is consistent and the revision check rejects lost updates. The shard
/// lock covers one call only: a read-validate-write sequence spans several
/// calls and must be serialized above this layer — the ledger facade does so
/// with a per-user write lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<UserId, Vec<Entry>>,
    goals: DashMap<UserId, Vec<Goal>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries for a user.
    pub fn entry_count(&self, user: UserId) -> usize {
        self.entries.get(&user).map_or(0, |rows| rows.len())
    }

    /// Number of stored goals for a user.
    pub fn goal_count(&self, user: UserId) -> usize {
        self.goals.get(&user).map_or(0, |rows| rows.len())
    }
}

impl HistoryProvider for InMemoryStore {
    fn history(&self, user: UserId) -> Vec<Entry> {
        self.entries
            .get(&user)
            .map_or_else(Vec::new, |rows| rows.value().clone())
    }
}

impl GoalResolver for InMemoryStore {
    fn active_goal(&self, user: UserId) -> Option<Goal> {
        self.goals
            .get(&user)
            .and_then(|rows| goal::resolve_active(rows.iter()).cloned())
    }

    fn goal(&self, user: UserId, id: GoalId) -> Option<Goal> {
        self.goals
            .get(&user)
            .and_then(|rows| rows.iter().find(|g| g.id == id).cloned())
    }
}

impl MutationSink for InMemoryStore {
    fn upsert_entry(&self, mut entry: Entry) -> Result<Entry, StoreError> {
        let mut rows = self.entries.entry(entry.user).or_default();
        match rows.iter_mut().find(|e| e.id == entry.id) {
            Some(stored) => {
                if stored.revision != entry.revision {
                    return Err(StoreError::RevisionConflict {
                        id: entry.id.0,
                        expected: entry.revision,
                        found: stored.revision,
                    });
                }
                entry.revision = Uuid::new_v4();
                *stored = entry.clone();
            }
            None => {
                entry.revision = Uuid::new_v4();
                rows.push(entry.clone());
            }
        }
        Ok(entry)
    }

    fn remove_entry(&self, user: UserId, id: EntryId) -> Result<(), StoreError> {
        let mut rows = self
            .entries
            .get_mut(&user)
            .ok_or(StoreError::EntryNotFound { id })?;
        let idx = rows
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::EntryNotFound { id })?;
        rows.remove(idx);
        Ok(())
    }

    fn upsert_goal(&self, mut goal: Goal) -> Result<Goal, StoreError> {
        let mut rows = self.goals.entry(goal.user).or_default();
        match rows.iter_mut().find(|g| g.id == goal.id) {
            Some(stored) => {
                if stored.revision != goal.revision {
                    return Err(StoreError::RevisionConflict {
                        id: goal.id.0,
                        expected: goal.revision,
                        found: stored.revision,
                    });
                }
                goal.revision = Uuid::new_v4();
                *stored = goal.clone();
            }
            None => {
                goal.revision = Uuid::new_v4();
                rows.push(goal.clone());
            }
        }
        Ok(goal)
    }
}
