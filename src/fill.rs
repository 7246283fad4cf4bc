use serde::Serialize;

/// Height of the fillable region of the bottle graphic.
pub const BOTTLE_LEVEL_HEIGHT: f64 = 230.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FillModel {
    pub ratio_percent: f64,
    pub is_goal_reached: bool,
    pub remaining_ml: u32,
}

impl FillModel {
    /// Water level inside a container of `height` units.
    pub fn level(&self, height: f64) -> f64 {
        self.ratio_percent / 100.0 * height
    }

    pub fn rounded_percent(&self) -> u32 {
        self.ratio_percent.round() as u32
    }
}

/// Maps today's consumption against the goal. `goal_ml` must be non-zero.
pub fn derive_fill(consumed_ml: i64, goal_ml: u32) -> FillModel {
    debug_assert!(goal_ml > 0, "goal must be validated before deriving fill");
    let goal = i64::from(goal_ml.max(1));
    let ratio = consumed_ml as f64 / goal as f64 * 100.0;

    FillModel {
        ratio_percent: ratio.clamp(0.0, 100.0),
        is_goal_reached: consumed_ml >= goal,
        remaining_ml: (goal - consumed_ml).clamp(0, goal) as u32,
    }
}
