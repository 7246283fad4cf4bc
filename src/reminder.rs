//! Reminder policy: when to nudge next and which scheduled checks fire.
//!
//! Everything here is a pure function of today's state and a wall-clock
//! reading passed in by the caller, so schedules are reproducible in tests.

use crate::store::HydrationState;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MIN_DOSE_ML: u32 = 150;
pub const MAX_DOSE_ML: u32 = 350;
const DOSE_SHARE_OF_GOAL: f64 = 0.12;

const REGULAR_CADENCE_MIN: i64 = 90;
const CATCH_UP_CADENCE_MIN: i64 = 45;
const INTAKE_THROTTLE_MIN: i64 = 40;
/// Required pace above the ideal pace at which nudges speed up.
const CATCH_UP_FACTOR: f64 = 1.25;

pub const MAX_REMINDERS_PER_DAY: u8 = 4;
/// Hours at which scheduled checks run.
pub const CHECK_HOURS: [u32; 7] = [8, 10, 12, 14, 18, 20, 21];

/// Waking hours of the user; outside them nothing is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwakeWindow {
    pub wake_at: NaiveTime,
    pub sleep_at: NaiveTime,
}

impl Default for AwakeWindow {
    fn default() -> Self {
        Self {
            wake_at: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            sleep_at: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl AwakeWindow {
    pub fn is_quiet(&self, at: NaiveTime) -> bool {
        !(self.wake_at <= at && at <= self.sleep_at)
    }

    fn awake_minutes(&self) -> i64 {
        (self.sleep_at - self.wake_at).num_minutes().max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Nudge {
    /// Today's goal is met; nothing to schedule.
    GoalMet,
    /// Past bedtime; the next nudge belongs to tomorrow's schedule.
    QuietUntilTomorrow,
    /// Before waking hours; re-evaluate at wake time.
    AtWake(NaiveDateTime),
    Drink { at: NaiveDateTime, dose_ml: u32 },
}

/// Suggested serving: 12% of the goal, kept within `[MIN_DOSE_ML, MAX_DOSE_ML]`.
pub fn dose_for_goal(goal_ml: u32) -> u32 {
    let share = (f64::from(goal_ml) * DOSE_SHARE_OF_GOAL) as u32;
    share.clamp(MIN_DOSE_ML, MAX_DOSE_ML)
}

pub fn next_nudge(
    state: &HydrationState,
    window: &AwakeWindow,
    now: NaiveDateTime,
    last_intake: Option<NaiveDateTime>,
) -> Nudge {
    if window.is_quiet(now.time()) {
        if now.time() < window.wake_at {
            return Nudge::AtWake(now.date().and_time(window.wake_at));
        }
        return Nudge::QuietUntilTomorrow;
    }

    let remaining = i64::from(state.goal_ml) - state.consumed_ml;
    if remaining <= 0 {
        return Nudge::GoalMet;
    }

    let bedtime = now.date().and_time(window.sleep_at);
    let minutes_left = (bedtime - now).num_minutes().max(1);
    let ideal_rate = f64::from(state.goal_ml) / window.awake_minutes() as f64;
    let needed_rate = remaining as f64 / minutes_left as f64;

    let cadence = if needed_rate > CATCH_UP_FACTOR * ideal_rate {
        CATCH_UP_CADENCE_MIN
    } else {
        REGULAR_CADENCE_MIN
    };
    let mut at = now + Duration::minutes(cadence);

    if let Some(last) = last_intake {
        if now - last < Duration::minutes(INTAKE_THROTTLE_MIN) {
            at = at.max(last + Duration::minutes(INTAKE_THROTTLE_MIN));
        }
    }

    debug!(%at, cadence, remaining, "scheduled next nudge");
    Nudge::Drink {
        at,
        dose_ml: dose_for_goal(state.goal_ml),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckPeriod {
    Morning,
    Day,
    Evening,
    /// Last check of the day for users far behind.
    Critical,
}

impl CheckPeriod {
    pub fn for_hour(hour: u32) -> Option<Self> {
        match hour {
            8 | 10 => Some(Self::Morning),
            12 | 14 => Some(Self::Day),
            18 | 20 => Some(Self::Evening),
            21 => Some(Self::Critical),
            _ => None,
        }
    }

    /// Whether the user is behind enough for this period's reminder.
    pub fn is_due(self, state: &HydrationState) -> bool {
        let progress = state.consumed_ml as f64 / f64::from(state.goal_ml.max(1)) * 100.0;
        match self {
            Self::Morning => state.consumed_ml < 200,
            Self::Day => progress < 40.0,
            Self::Evening => progress < 70.0,
            Self::Critical => progress < 50.0,
        }
    }

    pub fn message(self, state: &HydrationState) -> String {
        let remaining = (i64::from(state.goal_ml) - state.consumed_ml).max(0);
        let glass = state.default_glass_ml;
        match self {
            Self::Morning => format!(
                "Good morning! Start the day with a glass of water. Today: {} / {} ml",
                state.consumed_ml, state.goal_ml
            ),
            Self::Day => format!("Time for water! {remaining} ml left, have {glass} ml now."),
            Self::Evening => format!(
                "Don't forget to drink: {} / {} ml, {remaining} ml to go.",
                state.consumed_ml, state.goal_ml
            ),
            Self::Critical => format!(
                "The day is almost over and {remaining} ml are still missing. Drink {glass} ml."
            ),
        }
    }
}

/// Scheduled checks never fire between 22:00 and 07:00.
pub fn is_check_quiet_hour(hour: u32) -> bool {
    hour >= 22 || hour < 7
}

/// Counts reminders sent per calendar day and enforces the daily cap.
#[derive(Debug, Clone, Default)]
pub struct ReminderLedger {
    day: Option<NaiveDate>,
    sent: u8,
}

impl ReminderLedger {
    pub fn sent_today(&self, today: NaiveDate) -> u8 {
        if self.day == Some(today) {
            self.sent
        } else {
            0
        }
    }

    /// Runs the scheduled check for `now` and records a reminder when one is due.
    pub fn check(&mut self, state: &HydrationState, now: NaiveDateTime) -> Option<CheckPeriod> {
        let today = now.date();
        if self.day != Some(today) {
            self.day = Some(today);
            self.sent = 0;
        }

        let hour = now.hour();
        if is_check_quiet_hour(hour) || self.sent >= MAX_REMINDERS_PER_DAY {
            return None;
        }

        let period = CheckPeriod::for_hour(hour)?;
        if !period.is_due(state) {
            return None;
        }

        self.sent += 1;
        Some(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(consumed_ml: i64, goal_ml: u32) -> HydrationState {
        HydrationState {
            consumed_ml,
            goal_ml,
            default_glass_ml: 250,
        }
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 14)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn dose_is_a_share_of_goal_within_bounds() {
        assert_eq!(dose_for_goal(500), 150);
        assert_eq!(dose_for_goal(2000), 240);
        assert_eq!(dose_for_goal(2500), 300);
        assert_eq!(dose_for_goal(10_000), 350);
    }

    #[test]
    fn before_wake_waits_for_wake_time() {
        let nudge = next_nudge(&state(0, 2000), &AwakeWindow::default(), at(6, 30), None);
        assert_eq!(nudge, Nudge::AtWake(at(8, 0)));
    }

    #[test]
    fn after_bedtime_nothing_today() {
        let nudge = next_nudge(&state(0, 2000), &AwakeWindow::default(), at(23, 30), None);
        assert_eq!(nudge, Nudge::QuietUntilTomorrow);
    }

    #[test]
    fn goal_met_stops_nudging() {
        let nudge = next_nudge(&state(2000, 2000), &AwakeWindow::default(), at(12, 0), None);
        assert_eq!(nudge, Nudge::GoalMet);
    }

    #[test]
    fn on_pace_uses_regular_cadence() {
        let nudge = next_nudge(&state(1000, 2000), &AwakeWindow::default(), at(12, 0), None);
        assert_eq!(
            nudge,
            Nudge::Drink {
                at: at(13, 30),
                dose_ml: 240
            }
        );
    }

    #[test]
    fn falling_behind_speeds_up() {
        let nudge = next_nudge(&state(200, 2000), &AwakeWindow::default(), at(19, 0), None);
        assert_eq!(
            nudge,
            Nudge::Drink {
                at: at(19, 45),
                dose_ml: 240
            }
        );
    }

    #[test]
    fn throttle_never_pulls_a_nudge_earlier() {
        let window = AwakeWindow {
            wake_at: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            sleep_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        };
        // Catch-up cadence from 8:50 already lands past the 40 minute throttle.
        let last = at(8, 50) - Duration::minutes(10);
        let nudge = next_nudge(&state(1000, 2000), &window, at(8, 50), Some(last));
        assert_eq!(
            nudge,
            Nudge::Drink {
                at: at(9, 35),
                dose_ml: 240
            }
        );

        let far = next_nudge(&state(1000, 2000), &window, at(8, 50), Some(at(8, 0)));
        assert_eq!(far, nudge);
    }

    #[test]
    fn periods_follow_check_hours() {
        assert_eq!(CheckPeriod::for_hour(8), Some(CheckPeriod::Morning));
        assert_eq!(CheckPeriod::for_hour(14), Some(CheckPeriod::Day));
        assert_eq!(CheckPeriod::for_hour(20), Some(CheckPeriod::Evening));
        assert_eq!(CheckPeriod::for_hour(21), Some(CheckPeriod::Critical));
        assert_eq!(CheckPeriod::for_hour(9), None);
        for hour in CHECK_HOURS {
            assert!(CheckPeriod::for_hour(hour).is_some());
        }
    }

    #[test]
    fn period_thresholds() {
        assert!(CheckPeriod::Morning.is_due(&state(199, 2000)));
        assert!(!CheckPeriod::Morning.is_due(&state(200, 2000)));
        assert!(CheckPeriod::Day.is_due(&state(799, 2000)));
        assert!(!CheckPeriod::Day.is_due(&state(800, 2000)));
        assert!(CheckPeriod::Evening.is_due(&state(1399, 2000)));
        assert!(!CheckPeriod::Evening.is_due(&state(1400, 2000)));
        assert!(CheckPeriod::Critical.is_due(&state(999, 2000)));
        assert!(!CheckPeriod::Critical.is_due(&state(1000, 2000)));
    }

    #[test]
    fn messages_report_what_is_left() {
        let behind = state(600, 2000);
        assert!(CheckPeriod::Day.message(&behind).contains("1400 ml left"));
        assert!(CheckPeriod::Critical.message(&behind).contains("250 ml"));
        assert!(CheckPeriod::Morning.message(&behind).contains("600 / 2000 ml"));
        assert!(CheckPeriod::Evening.message(&state(2100, 2000)).contains("0 ml to go"));
    }

    #[test]
    fn ledger_caps_reminders_per_day() {
        let mut ledger = ReminderLedger::default();
        let behind = state(0, 2000);
        let fired: Vec<_> = CHECK_HOURS
            .iter()
            .filter_map(|hour| ledger.check(&behind, at(*hour, 0)))
            .collect();

        assert_eq!(fired.len(), usize::from(MAX_REMINDERS_PER_DAY));
        assert_eq!(ledger.sent_today(at(0, 0).date()), MAX_REMINDERS_PER_DAY);

        let tomorrow = at(8, 0) + Duration::days(1);
        assert_eq!(ledger.check(&behind, tomorrow), Some(CheckPeriod::Morning));
        assert_eq!(ledger.sent_today(tomorrow.date()), 1);
    }

    #[test]
    fn ledger_skips_quiet_and_non_check_hours() {
        let mut ledger = ReminderLedger::default();
        let behind = state(0, 2000);
        assert_eq!(ledger.check(&behind, at(22, 0)), None);
        assert_eq!(ledger.check(&behind, at(6, 0)), None);
        assert_eq!(ledger.check(&behind, at(11, 0)), None);
        assert_eq!(ledger.check(&state(1900, 2000), at(21, 0)), None);
        assert_eq!(ledger.sent_today(at(0, 0).date()), 0);
    }
}
