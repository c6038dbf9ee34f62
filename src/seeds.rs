//! Demo fixtures: three user profiles with seeded goals and histories.
//!
//! Useful for demos and for exercising the full stack without hand-writing
//! weeks of data. The generated figures follow rough real-world shapes
//! (weekend activity bumps, weekly cheat days, gym schedules) from a seeded
//! RNG, so repeated runs produce identical data.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::entry::{EntryDraft, UserId};
use crate::error::LedgerResult;
use crate::ledger::{BulkOutcome, Ledger};
use crate::store::{GoalResolver, HistoryProvider, MutationSink};

const SEED: u64 = 0x5EED_CA10;

/// What the seeder created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    /// One user per profile: deficit, surplus, maintenance.
    pub users: Vec<UserId>,
    pub goals: usize,
    pub entries: usize,
}

/// Populate a ledger with three demo users relative to `today`:
///
/// - a weight-loss profile, 15 days into a 5000 kcal / 30-day deficit goal;
/// - a muscle-building profile, 30 days into a −3000 kcal / 60-day surplus
///   goal;
/// - a maintenance profile, 45 days into a 0 kcal / 90-day goal.
pub fn seed_demo<S>(ledger: &Ledger<S>, today: NaiveDate) -> LedgerResult<SeedSummary>
where
    S: HistoryProvider + GoalResolver + MutationSink,
{
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut users = Vec::new();
    let mut entries = 0usize;

    // Weight loss: more active on weekends, one cheat day a week.
    let user = UserId::new();
    let start = back(today, 15);
    ledger.create_goal(user, 5000, 30, start)?;
    let drafts: Vec<EntryDraft> = (0..15)
        .map(|i| {
            let date = start + Days::new(i);
            let weekend = is_weekend(date);
            let cheat = i % 7 == 6;
            EntryDraft {
                date,
                burned: if weekend {
                    2300 + rng.gen_range(100..=300)
                } else {
                    2000 + rng.gen_range(50..=150)
                },
                consumed: if cheat {
                    2400 + rng.gen_range(100..=200)
                } else {
                    1600 + rng.gen_range(100..=200)
                },
            }
        })
        .collect();
    entries += applied(&ledger.bulk_import(user, &drafts)?);
    users.push(user);

    // Muscle building: gym five days a week, high intake throughout.
    let user = UserId::new();
    let start = back(today, 30);
    ledger.create_goal(user, -3000, 60, start)?;
    let drafts: Vec<EntryDraft> = (0..30)
        .map(|i| {
            let date = start + Days::new(i);
            let gym_day = i % 7 != 0 && i % 7 != 3;
            EntryDraft {
                date,
                burned: if gym_day {
                    2800 + rng.gen_range(100..=300)
                } else {
                    2000 + rng.gen_range(50..=150)
                },
                consumed: 3000 + rng.gen_range(200..=500),
            }
        })
        .collect();
    entries += applied(&ledger.bulk_import(user, &drafts)?);
    users.push(user);

    // Maintenance: weekly activity pattern, intake tracking burn.
    let user = UserId::new();
    let start = back(today, 45);
    ledger.create_goal(user, 0, 90, start)?;
    let drafts: Vec<EntryDraft> = (0..45)
        .map(|i| {
            let date = start + Days::new(i);
            EntryDraft {
                date,
                burned: 2100 + activity_bump(date) + rng.gen_range(0..=200),
                consumed: 2000 + rng.gen_range(0..=400),
            }
        })
        .collect();
    entries += applied(&ledger.bulk_import(user, &drafts)?);
    users.push(user);

    tracing::info!(users = users.len(), entries, "demo data seeded");
    Ok(SeedSummary {
        users,
        goals: 3,
        entries,
    })
}

/// Rows that actually landed: creations and updates, not rejections.
fn applied(outcomes: &[BulkOutcome]) -> usize {
    outcomes
        .iter()
        .filter(|o| !matches!(o, BulkOutcome::Rejected { .. }))
        .count()
}

fn back(today: NaiveDate, days: u64) -> NaiveDate {
    today
        .checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Rough weekly activity rhythm: gym twice, a long weekend outing, light
/// recovery days in between.
fn activity_bump(date: NaiveDate) -> u32 {
    match date.weekday() {
        Weekday::Mon => 200,
        Weekday::Tue => 300,
        Weekday::Wed => 100,
        Weekday::Thu => 300,
        Weekday::Fri => 200,
        Weekday::Sat => 400,
        Weekday::Sun => 100,
    }
}
