//! Session state for today's hydration, reconciled against the remote service.
//!
//! The store never changes local state speculatively: every mutation goes to
//! the service first and the displayed values only move once a fresh
//! `/today` snapshot has been loaded. Round trips are serialized through an
//! operation gate, so overlapping calls complete in the order they were issued.

use crate::fill::{FillModel, derive_fill};
use crate::goal::{GoalRangeError, validate_goal};
use crate::models::TodaySnapshot;
use crate::remote::{HydrationRemote, RemoteError};
use crate::stats::{StatsError, WeeklySummary, summarize};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fixed serving sizes offered next to the user's default glass.
pub const PRESET_SERVINGS_ML: [u32; 2] = [500, 750];
/// Step used for quick manual corrections in either direction.
pub const NUDGE_ML: i64 = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Goal(#[from] GoalRangeError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("today's state has not been loaded yet")]
    NotLoaded,
    #[error("amount must be non-zero")]
    ZeroAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Uninitialized,
    Refreshing,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Freshness {
    Fresh,
    /// The last round trip failed; held values are the last known good ones.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HydrationState {
    pub consumed_ml: i64,
    pub goal_ml: u32,
    pub default_glass_ml: u32,
}

impl TryFrom<TodaySnapshot> for HydrationState {
    type Error = RemoteError;

    fn try_from(snapshot: TodaySnapshot) -> Result<Self, Self::Error> {
        let goal_ml = validate_goal(i64::from(snapshot.goal_ml))
            .map_err(|err| RemoteError::Decode(format!("service sent invalid goal: {err}")))?;
        if snapshot.default_glass_ml == 0 {
            return Err(RemoteError::Decode(
                "service sent a zero default glass".to_string(),
            ));
        }

        Ok(Self {
            consumed_ml: snapshot.consumed_ml,
            goal_ml,
            default_glass_ml: snapshot.default_glass_ml,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub phase: Phase,
    pub freshness: Freshness,
    pub hydration: Option<HydrationState>,
    pub fill: Option<FillModel>,
    pub weekly: Option<WeeklySummary>,
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    freshness: Freshness,
    hydration: Option<HydrationState>,
    fill: Option<FillModel>,
    weekly: Option<WeeklySummary>,
    weekly_window: Option<u32>,
}

pub struct HydrationStore<R> {
    remote: R,
    inner: Mutex<Inner>,
    gate: tokio::sync::Mutex<()>,
}

impl<R: HydrationRemote> HydrationStore<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            inner: Mutex::new(Inner {
                phase: Phase::Uninitialized,
                freshness: Freshness::Fresh,
                hydration: None,
                fill: None,
                weekly: None,
                weekly_window: None,
            }),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner();
        StoreSnapshot {
            phase: inner.phase,
            freshness: inner.freshness,
            hydration: inner.hydration,
            fill: inner.fill,
            weekly: inner.weekly.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.inner().phase
    }

    pub fn is_stale(&self) -> bool {
        self.inner().freshness == Freshness::Stale
    }

    pub fn hydration(&self) -> Option<HydrationState> {
        self.inner().hydration
    }

    pub fn fill(&self) -> Option<FillModel> {
        self.inner().fill
    }

    pub fn weekly(&self) -> Option<WeeklySummary> {
        self.inner().weekly.clone()
    }

    /// Serving sizes for the quick-add buttons, default glass first.
    pub fn quick_add_amounts(&self) -> Option<[u32; 3]> {
        self.hydration().map(|state| {
            [
                state.default_glass_ml,
                PRESET_SERVINGS_ML[0],
                PRESET_SERVINGS_ML[1],
            ]
        })
    }

    /// Fetches today's authoritative state. On failure prior state is kept.
    pub async fn load(&self) -> Result<HydrationState, StoreError> {
        let _turn = self.gate.lock().await;
        self.load_today().await
    }

    /// Fetches the trailing `days` series and folds it into a summary.
    /// Later mutations keep refreshing it with the same window.
    pub async fn load_weekly(&self, days: u32) -> Result<WeeklySummary, StoreError> {
        let _turn = self.gate.lock().await;
        self.inner().weekly_window = Some(days);
        self.load_series(days).await
    }

    /// Sends a signed delta, positive for water drunk, negative for a correction.
    pub async fn apply_delta(&self, amount_ml: i64) -> Result<HydrationState, StoreError> {
        if amount_ml == 0 {
            return Err(StoreError::ZeroAmount);
        }
        let _turn = self.gate.lock().await;
        self.ensure_loaded()?;

        debug!(amount_ml, "logging intake");
        self.round_trip(self.remote.log(amount_ml)).await?;
        self.refresh_after_mutation().await
    }

    pub async fn reset(&self) -> Result<HydrationState, StoreError> {
        let _turn = self.gate.lock().await;
        self.ensure_loaded()?;

        debug!("resetting today's intake");
        self.round_trip(self.remote.reset()).await?;
        self.refresh_after_mutation().await
    }

    /// Validates before anything goes over the wire; a rejected goal is never sent.
    pub async fn set_goal(&self, candidate: i64) -> Result<HydrationState, StoreError> {
        let goal_ml = validate_goal(candidate)?;
        let _turn = self.gate.lock().await;
        self.ensure_loaded()?;

        debug!(goal_ml, "updating daily goal");
        self.round_trip(self.remote.set_goal(goal_ml)).await?;
        self.refresh_after_mutation().await
    }

    /// The mutation has been applied once this runs, so only the reload of
    /// today can fail it. A failed weekly refresh leaves the summary stale.
    async fn refresh_after_mutation(&self) -> Result<HydrationState, StoreError> {
        let state = self.load_today().await?;
        let window = self.inner().weekly_window;
        if let Some(days) = window {
            if let Err(err) = self.load_series(days).await {
                warn!(days, "weekly summary not refreshed after mutation: {err}");
            }
        }
        Ok(state)
    }

    async fn load_today(&self) -> Result<HydrationState, StoreError> {
        let snapshot = self.round_trip(self.remote.fetch_today()).await?;
        let state = match HydrationState::try_from(snapshot) {
            Ok(state) => state,
            Err(err) => {
                self.mark_stale(&err);
                return Err(err.into());
            }
        };
        let fill = derive_fill(state.consumed_ml, state.goal_ml);

        let mut inner = self.inner();
        if inner.hydration.is_none() {
            info!(goal_ml = state.goal_ml, "hydration session ready");
        }
        inner.hydration = Some(state);
        inner.fill = Some(fill);
        inner.phase = Phase::Ready;
        inner.freshness = Freshness::Fresh;
        debug!(
            consumed_ml = state.consumed_ml,
            ratio = fill.ratio_percent,
            "loaded today"
        );
        Ok(state)
    }

    async fn load_series(&self, days: u32) -> Result<WeeklySummary, StoreError> {
        let response = self.round_trip(self.remote.fetch_days(days)).await?;
        let summary = summarize(&response.days, response.goal_ml)
            .inspect_err(|err| self.mark_stale(err))?;

        let mut inner = self.inner();
        inner.weekly = Some(summary.clone());
        inner.freshness = Freshness::Fresh;
        Ok(summary)
    }

    /// Runs one remote call, tracking the transient `Refreshing` phase.
    async fn round_trip<T>(
        &self,
        call: impl Future<Output = Result<T, RemoteError>>,
    ) -> Result<T, StoreError> {
        let previous = {
            let mut inner = self.inner();
            std::mem::replace(&mut inner.phase, Phase::Refreshing)
        };

        let result = call.await;

        let mut inner = self.inner();
        inner.phase = match previous {
            Phase::Refreshing if inner.hydration.is_some() => Phase::Ready,
            Phase::Refreshing => Phase::Uninitialized,
            other => other,
        };
        drop(inner);

        result.map_err(|err| {
            self.mark_stale(&err);
            StoreError::Remote(err)
        })
    }

    fn mark_stale(&self, err: &dyn std::error::Error) {
        warn!("hydration refresh failed, keeping last known state: {err}");
        self.inner().freshness = Freshness::Stale;
    }

    fn ensure_loaded(&self) -> Result<(), StoreError> {
        if self.inner().hydration.is_none() {
            return Err(StoreError::NotLoaded);
        }
        Ok(())
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
