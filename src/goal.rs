use thiserror::Error;

pub const MIN_GOAL_ML: u32 = 500;
pub const MAX_GOAL_ML: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GoalRangeError {
    #[error("goal must be at least {bound} ml, got {candidate}")]
    Below { bound: u32, candidate: i64 },
    #[error("goal must be at most {bound} ml, got {candidate}")]
    Above { bound: u32, candidate: i64 },
}

impl GoalRangeError {
    /// The bound the candidate violated.
    pub fn bound(&self) -> u32 {
        match self {
            Self::Below { bound, .. } | Self::Above { bound, .. } => *bound,
        }
    }
}

/// Accepts a daily goal only when it lies in `[MIN_GOAL_ML, MAX_GOAL_ML]`.
pub fn validate_goal(candidate: i64) -> Result<u32, GoalRangeError> {
    if candidate < i64::from(MIN_GOAL_ML) {
        return Err(GoalRangeError::Below {
            bound: MIN_GOAL_ML,
            candidate,
        });
    }
    if candidate > i64::from(MAX_GOAL_ML) {
        return Err(GoalRangeError::Above {
            bound: MAX_GOAL_ML,
            candidate,
        });
    }

    Ok(candidate as u32)
}
