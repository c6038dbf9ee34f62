//! Goals and the active-window predicate.
//!
//! A [`Goal`] names a signed kcal target to reach over a fixed, inclusive
//! window of calendar days. A negative target expresses a surplus goal
//! (consume more than you burn); zero expresses maintenance. The window
//! predicate [`GoalWindow::contains`] is the only date check the core
//! performs — it compares at day granularity and has no side effects.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entry::UserId;
use crate::error::GoalError;

/// Upper bound on the window length, ten years of days.
pub const MAX_WINDOW_DAYS: u16 = 3650;

/// Unique identifier for a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(pub Uuid);

impl GoalId {
    pub fn new() -> Self {
        GoalId(Uuid::new_v4())
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GoalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "goal:{}", self.0)
    }
}

/// A fixed-window kcal target for one user.
///
/// Serializes as its stored attributes plus the computed `end` date, so
/// consumers of the wire form never re-derive the window bound; `end` is
/// ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user: UserId,
    /// Net kcal difference to reach over the window. Signed: negative for a
    /// surplus goal, zero for maintenance.
    pub target: i64,
    /// Window length in days, 1..=[`MAX_WINDOW_DAYS`].
    pub window_days: u16,
    /// First day of the window.
    pub start: NaiveDate,
    /// Optimistic-concurrency token, replaced by the store on every
    /// successful write.
    pub revision: Uuid,
}

impl Goal {
    /// Create a goal, validating the window length.
    pub fn new(
        user: UserId,
        target: i64,
        window_days: u16,
        start: NaiveDate,
    ) -> Result<Self, GoalError> {
        validate_window_days(window_days)?;
        Ok(Self {
            id: GoalId::new(),
            user,
            target,
            window_days,
            start,
            revision: Uuid::new_v4(),
        })
    }

    /// Last day of the window, inclusive: `start + (window_days − 1)`.
    pub fn end(&self) -> NaiveDate {
        // Saturates at the calendar edge; window_days is capped well below it.
        self.start
            .checked_add_days(Days::new(u64::from(self.window_days).saturating_sub(1)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// The inclusive active window of this goal.
    pub fn window(&self) -> GoalWindow {
        GoalWindow {
            start: self.start,
            end: self.end(),
        }
    }

    /// Replace the goal's terms, re-validating the window length.
    pub fn set_terms(
        &mut self,
        target: i64,
        window_days: u16,
        start: NaiveDate,
    ) -> Result<(), GoalError> {
        validate_window_days(window_days)?;
        self.target = target;
        self.window_days = window_days;
        self.start = start;
        Ok(())
    }
}

impl Serialize for Goal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Goal", 7)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("user", &self.user)?;
        state.serialize_field("target", &self.target)?;
        state.serialize_field("window_days", &self.window_days)?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end())?;
        state.serialize_field("revision", &self.revision)?;
        state.end()
    }
}

fn validate_window_days(days: u16) -> Result<(), GoalError> {
    if days == 0 || days > MAX_WINDOW_DAYS {
        return Err(GoalError::InvalidWindowLength { days });
    }
    Ok(())
}

/// An inclusive day range derived from a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl GoalWindow {
    /// True iff `date` falls inside the window, comparing whole days.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Pick the active goal from a user's goals: the most recently started one.
///
/// Goal resolution policy mirrors the store's "latest start date wins"; ties
/// on start date are broken arbitrarily and should not occur in practice.
pub fn resolve_active<'a, I>(goals: I) -> Option<&'a Goal>
where
    I: IntoIterator<Item = &'a Goal>,
{
    goals.into_iter().max_by_key(|g| g.start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn goal(window_days: u16, start: &str) -> Goal {
        Goal::new(UserId::new(), 5000, window_days, date(start)).unwrap()
    }

    #[test]
    fn window_end_is_inclusive() {
        let g = goal(30, "2025-01-01");
        assert_eq!(g.end(), date("2025-01-30"));
    }

    #[test]
    fn one_day_window_starts_and_ends_same_day() {
        let g = goal(1, "2025-06-15");
        assert_eq!(g.end(), date("2025-06-15"));
        assert!(g.window().contains(date("2025-06-15")));
        assert!(!g.window().contains(date("2025-06-16")));
    }

    #[test]
    fn contains_accepts_both_bounds() {
        let w = goal(30, "2025-01-01").window();
        assert!(w.contains(date("2025-01-01")));
        assert!(w.contains(date("2025-01-30")));
        assert!(w.contains(date("2025-01-17")));
    }

    #[test]
    fn contains_rejects_outside_bounds() {
        let w = goal(30, "2025-01-01").window();
        assert!(!w.contains(date("2024-12-31")));
        assert!(!w.contains(date("2025-01-31")));
    }

    #[test]
    fn zero_and_oversized_windows_are_rejected() {
        let user = UserId::new();
        assert!(matches!(
            Goal::new(user, 0, 0, date("2025-01-01")),
            Err(GoalError::InvalidWindowLength { days: 0 })
        ));
        assert!(matches!(
            Goal::new(user, 0, MAX_WINDOW_DAYS + 1, date("2025-01-01")),
            Err(GoalError::InvalidWindowLength { .. })
        ));
        assert!(Goal::new(user, 0, MAX_WINDOW_DAYS, date("2025-01-01")).is_ok());
    }

    #[test]
    fn negative_and_zero_targets_are_valid() {
        let user = UserId::new();
        assert!(Goal::new(user, -3000, 60, date("2025-01-01")).is_ok());
        assert!(Goal::new(user, 0, 90, date("2025-01-01")).is_ok());
    }

    #[test]
    fn active_goal_is_most_recently_started() {
        let user = UserId::new();
        let old = Goal::new(user, 1000, 30, date("2025-01-01")).unwrap();
        let new = Goal::new(user, 2000, 30, date("2025-03-01")).unwrap();
        let goals = vec![old.clone(), new.clone()];
        assert_eq!(resolve_active(&goals).map(|g| g.id), Some(new.id));
        assert_eq!(resolve_active(std::iter::empty::<&Goal>()), None);
    }
}
