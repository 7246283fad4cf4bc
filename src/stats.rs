use crate::models::DailyRecord;
use serde::Serialize;
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("cannot summarize an empty day series")]
    EmptyInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub average_ml: u32,
    pub best_day: DailyRecord,
    pub worst_day: DailyRecord,
    pub goal_hit_percent: u8,
    pub trend: TrendCurve,
}

/// A point in normalized `[0,1] x [0,1]` chart space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub x: f64,
    pub y: f64,
}

/// Cubic Bézier segment between two consecutive trend points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveSegment {
    pub from: TrendPoint,
    pub c1: TrendPoint,
    pub c2: TrendPoint,
    pub to: TrendPoint,
}

impl CurveSegment {
    pub fn is_straight(&self) -> bool {
        self.c1 == self.from && self.c2 == self.to
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendCurve {
    pub points: Vec<TrendPoint>,
    pub segments: Vec<CurveSegment>,
}

impl TrendCurve {
    /// SVG path data for a `width` x `height` viewport, larger values drawn higher.
    pub fn to_path(&self, width: f64, height: f64) -> String {
        let project = |p: TrendPoint| (p.x * width, (1.0 - p.y) * height);
        let mut path = String::new();

        let Some(first) = self.points.first() else {
            return path;
        };
        let (x, y) = project(*first);
        let _ = write!(path, "M{x:.1},{y:.1}");

        for segment in &self.segments {
            let (c1x, c1y) = project(segment.c1);
            let (c2x, c2y) = project(segment.c2);
            let (tx, ty) = project(segment.to);
            let _ = write!(
                path,
                " C{c1x:.1},{c1y:.1} {c2x:.1},{c2y:.1} {tx:.1},{ty:.1}"
            );
        }

        path
    }
}

/// Folds an ordered day series and the goal into display statistics.
///
/// Only active days (`ml > 0`) feed the average, extremes and hit rate. With
/// no active day both extremes fall back to the first record. Ties resolve to
/// the earliest day.
pub fn summarize(days: &[DailyRecord], goal_ml: u32) -> Result<WeeklySummary, StatsError> {
    let first = *days.first().ok_or(StatsError::EmptyInput)?;
    let active: Vec<DailyRecord> = days.iter().copied().filter(|day| day.ml > 0).collect();

    let (average_ml, goal_hit_percent) = if active.is_empty() {
        (0, 0)
    } else {
        let count = active.len() as f64;
        let total: u64 = active.iter().map(|day| u64::from(day.ml)).sum();
        let hits = active.iter().filter(|day| day.ml >= goal_ml).count();
        (
            (total as f64 / count).round() as u32,
            (hits as f64 / count * 100.0).round() as u8,
        )
    };

    let best_day = active
        .iter()
        .copied()
        .reduce(|best, day| if day.ml > best.ml { day } else { best })
        .unwrap_or(first);
    let worst_day = active
        .iter()
        .copied()
        .reduce(|worst, day| if day.ml < worst.ml { day } else { worst })
        .unwrap_or(first);

    Ok(WeeklySummary {
        average_ml,
        best_day,
        worst_day,
        goal_hit_percent,
        trend: trend_curve(days, goal_ml),
    })
}

pub fn trend_curve(days: &[DailyRecord], goal_ml: u32) -> TrendCurve {
    let peak = days.iter().map(|day| day.ml).max().unwrap_or(0);
    let scale = f64::from(goal_ml.max(peak).max(1));
    let last_index = days.len().saturating_sub(1);

    let points: Vec<TrendPoint> = days
        .iter()
        .enumerate()
        .map(|(index, day)| TrendPoint {
            x: if last_index == 0 {
                0.0
            } else {
                index as f64 / last_index as f64
            },
            y: f64::from(day.ml) / scale,
        })
        .collect();

    let segment_count = points.len().saturating_sub(1);
    let segments = points
        .windows(2)
        .enumerate()
        .map(|(index, pair)| {
            let (from, to) = (pair[0], pair[1]);
            if index + 1 == segment_count {
                return CurveSegment {
                    from,
                    c1: from,
                    c2: to,
                    to,
                };
            }
            let third = (to.x - from.x) / 3.0;
            CurveSegment {
                from,
                c1: TrendPoint {
                    x: from.x + third,
                    y: from.y,
                },
                c2: TrendPoint {
                    x: to.x - third,
                    y: to.y,
                },
                to,
            }
        })
        .collect();

    TrendCurve { points, segments }
}
