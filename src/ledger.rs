//! Ledger facade: the top-level API tying store, validation, and
//! recomputation together.
//!
//! A [`Ledger`] owns a store (anything implementing the collaborator traits
//! in [`crate::store`]) and exposes the operations an embedding application
//! needs: goal management, entry CRUD with freshly derived metrics on every
//! read, and bulk import. All validation happens here at the boundary; by
//! the time the recomputation layer runs, its input is known-good.
//!
//! One call processes one user's history synchronously. Mutations for the
//! same user serialize on an internal per-user lock, so two concurrent
//! writers cannot interleave their read-validate-write sequences; reads are
//! lock-free. Different users are fully independent and may be driven from
//! different threads.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::entry::{Entry, EntryDraft, EntryId, EntryPatch, UserId};
use crate::error::{GoalError, LedgerResult, StoreError};
use crate::goal::{Goal, GoalId};
use crate::metrics::{ComputedEntry, MetricsConfig};
use crate::recompute;
use crate::store::{GoalResolver, HistoryProvider, InMemoryStore, MutationSink};
use crate::validate;

/// Configuration for a ledger instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerConfig {
    pub metrics: MetricsConfig,
    /// Refuse goals whose start date is before today. Off by default so
    /// historical data (and the demo seeds) can be loaded freely.
    pub reject_past_start: bool,
}

/// Per-row outcome of a bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BulkOutcome {
    Created { date: NaiveDate },
    Updated { date: NaiveDate },
    Rejected { date: NaiveDate, reason: String },
}

/// The energy-balance ledger.
pub struct Ledger<S = InMemoryStore> {
    config: LedgerConfig,
    store: S,
    write_locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl Ledger<InMemoryStore> {
    /// A ledger over a fresh in-memory store with default configuration.
    pub fn in_memory() -> Self {
        Self::new(InMemoryStore::new(), LedgerConfig::default())
    }
}

impl<S> Ledger<S>
where
    S: HistoryProvider + GoalResolver + MutationSink,
{
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self {
            config,
            store,
            write_locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Serialize mutations for one user. Every write path holds this lock
    /// from its history read through its store write, so a concurrent
    /// mutation cannot validate against a stale history.
    fn lock_user(&self, user: UserId) -> Arc<Mutex<()>> {
        self.write_locks.entry(user).or_default().clone()
    }

    // -----------------------------------------------------------------------
    // Goals
    // -----------------------------------------------------------------------

    /// Create a goal for a user.
    pub fn create_goal(
        &self,
        user: UserId,
        target: i64,
        window_days: u16,
        start: NaiveDate,
    ) -> LedgerResult<Goal> {
        if self.config.reject_past_start && start < chrono::Utc::now().date_naive() {
            return Err(GoalError::StartInPast { start }.into());
        }
        let lock = self.lock_user(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let goal = Goal::new(user, target, window_days, start)?;
        let stored = self.store.upsert_goal(goal)?;
        tracing::info!(
            user = %user,
            goal = %stored.id,
            target = stored.target,
            window_days = stored.window_days,
            start = %stored.start,
            "goal created"
        );
        Ok(stored)
    }

    /// Replace a goal's terms.
    pub fn update_goal(
        &self,
        user: UserId,
        id: GoalId,
        target: i64,
        window_days: u16,
        start: NaiveDate,
    ) -> LedgerResult<Goal> {
        let lock = self.lock_user(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut goal = self
            .store
            .goal(user, id)
            .ok_or(StoreError::GoalNotFound { id })?;
        goal.set_terms(target, window_days, start)?;
        let stored = self.store.upsert_goal(goal)?;
        tracing::info!(user = %user, goal = %id, "goal updated");
        Ok(stored)
    }

    /// The goal entries are currently measured against.
    pub fn active_goal(&self, user: UserId) -> LedgerResult<Goal> {
        self.store
            .active_goal(user)
            .ok_or_else(|| GoalError::NoActiveGoal { user: user.0 }.into())
    }

    // -----------------------------------------------------------------------
    // Entries
    // -----------------------------------------------------------------------

    /// Record a new entry and return it with freshly derived metrics.
    pub fn create_entry(&self, user: UserId, draft: EntryDraft) -> LedgerResult<ComputedEntry> {
        let lock = self.lock_user(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let goal = self.active_goal(user)?;
        let history = self.store.history(user);
        validate::admit_new(draft.date, &goal, &history)?;

        let entry = Entry::new(user, draft.date, draft.burned, draft.consumed);
        let out =
            recompute::fold_and_compute(&entry, &history, Some(&goal), &self.config.metrics);
        let stored = self.store.upsert_entry(entry)?;
        tracing::info!(
            user = %user,
            entry = %stored.id,
            date = %stored.date,
            diff = stored.diff(),
            "entry created"
        );

        let mut row = out.candidate;
        row.entry = stored;
        Ok(row)
    }

    /// Update an entry's kcal figures. The date is immutable.
    pub fn update_entry(
        &self,
        user: UserId,
        id: EntryId,
        patch: EntryPatch,
    ) -> LedgerResult<ComputedEntry> {
        let lock = self.lock_user(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let history = self.store.history(user);
        let mut candidate = history
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(StoreError::EntryNotFound { id })?;
        candidate.set_kcals(patch.burned, patch.consumed);

        // An entry may outlive its goal; metrics degrade to zeros then.
        let goal = self.store.active_goal(user);
        let out =
            recompute::fold_and_compute(&candidate, &history, goal.as_ref(), &self.config.metrics);
        let stored = self.store.upsert_entry(candidate)?;
        tracing::info!(user = %user, entry = %id, diff = stored.diff(), "entry updated");

        let mut row = out.candidate;
        row.entry = stored;
        Ok(row)
    }

    /// Fetch one entry with metrics derived over the user's full history.
    pub fn entry(&self, user: UserId, id: EntryId) -> LedgerResult<ComputedEntry> {
        let history = self.store.history(user);
        let stored = history
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(StoreError::EntryNotFound { id })?;
        let goal = self.active_goal(user)?;

        let out =
            recompute::fold_and_compute(&stored, &history, Some(&goal), &self.config.metrics);
        Ok(out.candidate)
    }

    /// List entries with metrics, optionally restricted to a date range.
    ///
    /// Metrics are computed over exactly the returned range: the cumulative
    /// sum starts at the first listed entry, matching the window-scoping
    /// obligation the metrics engine places on its callers.
    pub fn entries(
        &self,
        user: UserId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> LedgerResult<Vec<ComputedEntry>> {
        let goal = self.active_goal(user)?;
        let history: Vec<Entry> = self
            .store
            .history(user)
            .into_iter()
            .filter(|e| from.is_none_or(|lo| e.date >= lo) && to.is_none_or(|hi| e.date <= hi))
            .collect();
        tracing::debug!(user = %user, entries = history.len(), "computing listing");
        Ok(crate::metrics::compute(
            &history,
            Some(&goal),
            &self.config.metrics,
        ))
    }

    /// Delete an entry.
    pub fn delete_entry(&self, user: UserId, id: EntryId) -> LedgerResult<()> {
        let lock = self.lock_user(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.remove_entry(user, id)?;
        tracing::info!(user = %user, entry = %id, "entry deleted");
        Ok(())
    }

    /// Import many drafts at once, reporting a per-row outcome.
    ///
    /// Unlike [`create_entry`](Self::create_entry), a draft whose date is
    /// already taken updates the existing entry in place; only out-of-window
    /// dates are rejected. Rejections do not abort the rest of the batch.
    pub fn bulk_import(
        &self,
        user: UserId,
        drafts: &[EntryDraft],
    ) -> LedgerResult<Vec<BulkOutcome>> {
        let lock = self.lock_user(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let goal = self.active_goal(user)?;
        let mut outcomes = Vec::with_capacity(drafts.len());

        for draft in drafts {
            if let Err(err) = validate::check_window(draft.date, &goal) {
                outcomes.push(BulkOutcome::Rejected {
                    date: draft.date,
                    reason: err.to_string(),
                });
                continue;
            }

            let existing = self
                .store
                .history(user)
                .into_iter()
                .find(|e| e.date == draft.date);
            match existing {
                Some(mut entry) => {
                    entry.set_kcals(draft.burned, draft.consumed);
                    self.store.upsert_entry(entry)?;
                    outcomes.push(BulkOutcome::Updated { date: draft.date });
                }
                None => {
                    let entry = Entry::new(user, draft.date, draft.burned, draft.consumed);
                    self.store.upsert_entry(entry)?;
                    outcomes.push(BulkOutcome::Created { date: draft.date });
                }
            }
        }

        tracing::info!(user = %user, rows = drafts.len(), "bulk import finished");
        Ok(outcomes)
    }
}
