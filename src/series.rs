use crate::models::{AppData, DailyRecord, DaysResponse};
use chrono::{Duration, Local, NaiveDate};

pub const DEFAULT_WINDOW_DAYS: i64 = 7;
pub const MAX_WINDOW_DAYS: i64 = 31;

pub fn clamp_window(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_WINDOW_DAYS)
        .clamp(1, MAX_WINDOW_DAYS)
}

pub fn build_days(data: &AppData, window: i64) -> DaysResponse {
    build_days_at(Local::now().date_naive(), data, window)
}

/// One record per calendar day ending at `today`, oldest first, zero-filled.
pub fn build_days_at(today: NaiveDate, data: &AppData, window: i64) -> DaysResponse {
    let window = window.clamp(1, MAX_WINDOW_DAYS);
    let mut days = Vec::with_capacity(window as usize);

    for offset in (0..window).rev() {
        let date = today - Duration::days(offset);
        let net = data.days.get(&date).copied().unwrap_or_default();
        days.push(DailyRecord {
            date,
            ml: net.clamp(0, i64::from(u32::MAX)) as u32,
        });
    }

    DaysResponse {
        days,
        goal_ml: data.goal_ml,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_includes_each_day_oldest_first() {
        let mut data = AppData::default();
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let two_days_ago = today - Duration::days(2);
        data.days.insert(two_days_ago, 1750);

        let response = build_days_at(today, &data, 7);
        assert_eq!(response.days.len(), 7);
        assert_eq!(response.days[0].date, today - Duration::days(6));
        assert_eq!(response.days[6].date, today);
        let point = response
            .days
            .iter()
            .find(|day| day.date == two_days_ago)
            .expect("missing day");
        assert_eq!(point.ml, 1750);
        assert_eq!(response.goal_ml, 2000);
    }

    #[test]
    fn negative_totals_are_reported_as_zero() {
        let mut data = AppData::default();
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        data.days.insert(today, -300);

        let response = build_days_at(today, &data, 1);
        assert_eq!(response.days.len(), 1);
        assert_eq!(response.days[0].ml, 0);
    }

    #[test]
    fn window_is_clamped() {
        assert_eq!(clamp_window(None), 7);
        assert_eq!(clamp_window(Some(0)), 1);
        assert_eq!(clamp_window(Some(-4)), 1);
        assert_eq!(clamp_window(Some(90)), 31);

        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(
            build_days_at(today, &AppData::default(), 400).days.len(),
            31
        );
    }
}
