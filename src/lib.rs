//! # kcal-ledger
//!
//! A daily energy-balance ledger: record kcal burned and consumed per day,
//! set a fixed-window goal, and get a consistent set of rolling statistics
//! for every entry — running cumulative sum, distance to goal, trailing
//! 4- and 7-entry averages, all-time average, and a 1-based day index.
//!
//! ## Architecture
//!
//! - **Metrics engine** (`metrics`): pure, order-insensitive derivation of
//!   every rolling statistic in one pass over the sorted history
//! - **Recomputation** (`recompute`): folds a single created/updated entry
//!   into the full history and re-derives everything
//! - **Validation** (`validate`): window-membership and date-uniqueness
//!   checks at the ingestion boundary
//! - **Store** (`store`): collaborator traits plus an in-memory,
//!   revision-checked implementation
//! - **Ledger** (`ledger`): the facade wiring it all together
//!
//! ## Library usage
//!
//! ```
//! use kcal_ledger::entry::{EntryDraft, UserId};
//! use kcal_ledger::ledger::Ledger;
//!
//! let ledger = Ledger::in_memory();
//! let user = UserId::new();
//!
//! let start = "2025-01-01".parse().unwrap();
//! ledger.create_goal(user, 5000, 30, start).unwrap();
//!
//! let row = ledger
//!     .create_entry(user, EntryDraft { date: start, burned: 2100, consumed: 1600 })
//!     .unwrap();
//! assert_eq!(row.metrics.diff, 500);
//! assert_eq!(row.metrics.goal_delta, 4500);
//! assert_eq!(row.metrics.day_index, 1);
//! ```

pub mod entry;
pub mod error;
pub mod goal;
pub mod ledger;
pub mod metrics;
pub mod recompute;
pub mod seeds;
pub mod store;
pub mod validate;
