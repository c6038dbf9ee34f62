//! The derived-metrics engine.
//!
//! [`compute`] is a pure function of (entry sequence, goal): it sorts a
//! defensive copy of the input by date, then derives every rolling statistic
//! in a single left-to-right pass. It performs no I/O, holds no state across
//! calls, and is total — an empty history or an absent goal degrades to a
//! no-op rather than an error.
//!
//! Sums accumulate in `i64`, which comfortably covers any realistic
//! multi-year series of daily kcal differences. Averages are exact
//! `rust_decimal` quotients rounded once to a fixed scale, so output is
//! deterministic and reproducible across platforms.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::goal::Goal;

/// Tuning for the metrics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Fractional digits kept on trailing averages.
    pub avg_scale: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { avg_scale: 2 }
    }
}

/// Derived, never-persisted statistics for one entry, positioned inside a
/// sorted history.
///
/// Kept separate from [`Entry`] so computed values cannot leak into storage;
/// the two are joined only at the response boundary as a [`ComputedEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryMetrics {
    /// Burned minus consumed for the day.
    pub diff: i64,
    /// Running total of diffs from the first supplied entry through this one.
    pub cumulative: i64,
    /// Goal target minus the cumulative sum.
    pub goal_delta: i64,
    /// Mean diff over the trailing 4 entries (or all entries if fewer exist).
    pub avg4: Decimal,
    /// Mean diff over the trailing 7 entries (or all entries if fewer exist).
    pub avg7: Decimal,
    /// Mean diff over every entry up to and including this one.
    pub avg_all: Decimal,
    /// 1-based day offset from the goal's start date. Not clamped: dates
    /// outside the goal window yield indices ≤ 0 or beyond the window length.
    pub day_index: i64,
}

/// An entry joined with its derived metrics, produced fresh on every compute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedEntry {
    #[serde(flatten)]
    pub entry: Entry,
    #[serde(flatten)]
    pub metrics: EntryMetrics,
}

/// Annotate every entry with its derived metrics.
///
/// The input need not be sorted; a defensive copy is sorted by date ascending
/// before the pass. With no goal the entries are returned in their supplied
/// order with zeroed metrics — the no-op degradation for a user who has not
/// set a goal yet.
///
/// The cumulative sum runs across the entire supplied sequence and is never
/// reset at the goal's window boundary; callers wanting window-scoped sums
/// must scope the history they pass in.
pub fn compute(entries: &[Entry], goal: Option<&Goal>, config: &MetricsConfig) -> Vec<ComputedEntry> {
    let Some(goal) = goal else {
        return entries
            .iter()
            .cloned()
            .map(|entry| ComputedEntry {
                entry,
                metrics: EntryMetrics::default(),
            })
            .collect();
    };

    let mut sorted: Vec<Entry> = entries.to_vec();
    sorted.sort_by_key(|e| e.date);

    let diffs: Vec<i64> = sorted.iter().map(Entry::diff).collect();
    let mut cumulative = 0i64;
    let mut out = Vec::with_capacity(sorted.len());

    for (i, entry) in sorted.into_iter().enumerate() {
        let diff = diffs[i];
        cumulative += diff;
        let metrics = EntryMetrics {
            diff,
            cumulative,
            goal_delta: goal.target - cumulative,
            avg4: trailing_mean(&diffs, i, 4, config.avg_scale),
            avg7: trailing_mean(&diffs, i, 7, config.avg_scale),
            avg_all: trailing_mean(&diffs, i, i + 1, config.avg_scale),
            day_index: (entry.date - goal.start).num_days() + 1,
        };
        out.push(ComputedEntry { entry, metrics });
    }

    out
}

/// Mean of the last `window` diffs ending at index `end`, shrunk to the
/// available prefix when fewer than `window` entries precede it.
fn trailing_mean(diffs: &[i64], end: usize, window: usize, scale: u32) -> Decimal {
    let lo = (end + 1).saturating_sub(window);
    let slice = &diffs[lo..=end];
    let sum: i64 = slice.iter().sum();
    (Decimal::from(sum) / Decimal::from(slice.len() as u64))
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::UserId;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    /// Entries on consecutive days starting 2025-01-01, one per diff, with
    /// consumed fixed at 2000 so burned = 2000 + diff.
    fn history(user: UserId, diffs: &[i64]) -> Vec<Entry> {
        diffs
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let day = date("2025-01-01") + chrono::Days::new(i as u64);
                Entry::new(user, day, (2000 + d) as u32, 2000)
            })
            .collect()
    }

    fn test_goal(user: UserId, target: i64) -> Goal {
        Goal::new(user, target, 30, date("2025-01-01")).unwrap()
    }

    #[test]
    fn concrete_scenario_four_days() {
        let user = UserId::new();
        let entries = history(user, &[100, -50, 200, 300]);
        let goal = test_goal(user, 5000);

        let computed = compute(&entries, Some(&goal), &MetricsConfig::default());
        let sums: Vec<i64> = computed.iter().map(|c| c.metrics.cumulative).collect();
        assert_eq!(sums, vec![100, 50, 250, 550]);

        let last = &computed[3].metrics;
        assert_eq!(last.avg_all, dec("137.5"));
        assert_eq!(last.avg4, dec("137.5"));
        assert_eq!(last.goal_delta, 4450);

        let days: Vec<i64> = computed.iter().map(|c| c.metrics.day_index).collect();
        assert_eq!(days, vec![1, 2, 3, 4]);
    }

    #[test]
    fn cumulative_recurrence_and_goal_delta_identity() {
        let user = UserId::new();
        let entries = history(user, &[5, -3, 12, 0, -8, 21, 4, -1]);
        let goal = test_goal(user, 1000);
        let computed = compute(&entries, Some(&goal), &MetricsConfig::default());

        assert_eq!(computed[0].metrics.cumulative, computed[0].metrics.diff);
        for pair in computed.windows(2) {
            assert_eq!(
                pair[1].metrics.cumulative,
                pair[0].metrics.cumulative + pair[1].metrics.diff
            );
        }
        for c in &computed {
            assert_eq!(c.metrics.goal_delta, goal.target - c.metrics.cumulative);
        }
    }

    #[test]
    fn short_windows_degrade_to_avg_all() {
        let user = UserId::new();
        let entries = history(user, &[10, 20, 30, 40, 50, 60, 70, 80]);
        let goal = test_goal(user, 0);
        let computed = compute(&entries, Some(&goal), &MetricsConfig::default());

        for (i, c) in computed.iter().enumerate() {
            if i < 3 {
                assert_eq!(c.metrics.avg4, c.metrics.avg_all, "i = {i}");
            }
            if i < 6 {
                assert_eq!(c.metrics.avg7, c.metrics.avg_all, "i = {i}");
            }
        }
        // Full windows thereafter.
        assert_eq!(computed[3].metrics.avg4, dec("25")); // (10+20+30+40)/4
        assert_eq!(computed[7].metrics.avg4, dec("65")); // (50+60+70+80)/4
        assert_eq!(computed[6].metrics.avg7, dec("40")); // (10..=70)/7
    }

    #[test]
    fn eighth_entry_drops_first_day_from_avg7() {
        let user = UserId::new();
        let diffs = [100, -50, 200, 300, 150, -20, 90, -700];
        let entries = history(user, &diffs);
        let goal = test_goal(user, 5000);
        let computed = compute(&entries, Some(&goal), &MetricsConfig::default());

        let last7: i64 = diffs[1..].iter().sum();
        let expected7 = (Decimal::from(last7) / Decimal::from(7u64))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        assert_eq!(computed[7].metrics.avg7, expected7);

        let all: i64 = diffs.iter().sum();
        let expected_all = (Decimal::from(all) / Decimal::from(8u64))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        assert_eq!(computed[7].metrics.avg_all, expected_all);
        assert_ne!(computed[7].metrics.avg7, computed[7].metrics.avg_all);
    }

    #[test]
    fn input_order_does_not_matter() {
        let user = UserId::new();
        let entries = history(user, &[7, -2, 14, 3, -9, 5]);
        let goal = test_goal(user, 100);
        let config = MetricsConfig::default();

        let forward = compute(&entries, Some(&goal), &config);

        let mut shuffled = entries.clone();
        shuffled.swap(0, 5);
        shuffled.swap(1, 3);
        shuffled.swap(2, 4);
        let permuted = compute(&shuffled, Some(&goal), &config);

        assert_eq!(forward, permuted);
    }

    #[test]
    fn compute_is_idempotent() {
        let user = UserId::new();
        let entries = history(user, &[1, 2, 3, 4, 5]);
        let goal = test_goal(user, 50);
        let config = MetricsConfig::default();

        let once = compute(&entries, Some(&goal), &config);
        let twice = compute(&entries, Some(&goal), &config);
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_goal_is_a_no_op() {
        let user = UserId::new();
        let mut entries = history(user, &[10, 20]);
        entries.reverse(); // unsorted input stays untouched without a goal
        let computed = compute(&entries, None, &MetricsConfig::default());

        assert_eq!(computed.len(), 2);
        for (c, e) in computed.iter().zip(&entries) {
            assert_eq!(&c.entry, e);
            assert_eq!(c.metrics, EntryMetrics::default());
        }
    }

    #[test]
    fn empty_history_yields_empty_output() {
        let user = UserId::new();
        let goal = test_goal(user, 5000);
        assert!(compute(&[], Some(&goal), &MetricsConfig::default()).is_empty());
    }

    #[test]
    fn day_index_is_not_clamped_outside_the_window() {
        let user = UserId::new();
        let goal = test_goal(user, 0); // window 2025-01-01..=2025-01-30
        let before = Entry::new(user, date("2024-12-30"), 2000, 2000);
        let after = Entry::new(user, date("2025-02-05"), 2000, 2000);

        let computed = compute(&[before, after], Some(&goal), &MetricsConfig::default());
        assert_eq!(computed[0].metrics.day_index, -1);
        assert_eq!(computed[1].metrics.day_index, 36);
    }

    #[test]
    fn midpoints_round_away_from_zero() {
        let user = UserId::new();
        // Eight diffs summing to 1: mean 0.125 rounds to 0.13 at scale 2.
        let entries = history(user, &[1, 0, 0, 0, 0, 0, 0, 0]);
        let goal = test_goal(user, 0);
        let computed = compute(&entries, Some(&goal), &MetricsConfig::default());
        assert_eq!(computed[7].metrics.avg_all, dec("0.13"));

        // And symmetrically for negative means.
        let entries = history(user, &[-1, 0, 0, 0, 0, 0, 0, 0]);
        let computed = compute(&entries, Some(&goal), &MetricsConfig::default());
        assert_eq!(computed[7].metrics.avg_all, dec("-0.13"));
    }
}
