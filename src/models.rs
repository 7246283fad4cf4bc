use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_GOAL_ML: u32 = 2000;
pub const DEFAULT_GLASS_ML: u32 = 250;

/// Net consumption for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub ml: u32,
}

/// Authoritative view of today as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodaySnapshot {
    pub consumed_ml: i64,
    pub goal_ml: u32,
    pub default_glass_ml: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaysResponse {
    pub days: Vec<DailyRecord>,
    pub goal_ml: u32,
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogRequest {
    pub amount_ml: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoalRequest {
    pub goal_ml: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppData {
    pub goal_ml: u32,
    pub default_glass_ml: u32,
    /// Net millilitres logged per local calendar day.
    pub days: BTreeMap<NaiveDate, i64>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            goal_ml: DEFAULT_GOAL_ML,
            default_glass_ml: DEFAULT_GLASS_ML,
            days: BTreeMap::new(),
        }
    }
}
