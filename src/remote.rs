use crate::config::{ClientConfig, IDENTITY_HEADER};
use crate::models::{Ack, DaysResponse, GoalRequest, LogRequest, TodaySnapshot};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service answered {0}")]
    Status(StatusCode),
    #[error("unreadable response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// The service that owns hydration state. Injected into a `HydrationStore`.
pub trait HydrationRemote {
    fn fetch_today(&self) -> impl Future<Output = Result<TodaySnapshot, RemoteError>> + Send;

    fn fetch_days(
        &self,
        days: u32,
    ) -> impl Future<Output = Result<DaysResponse, RemoteError>> + Send;

    fn log(&self, amount_ml: i64) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn reset(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn set_goal(&self, goal_ml: u32) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    config: ClientConfig,
}

impl HttpRemote {
    pub fn new(config: ClientConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .user_agent(concat!("hydration/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.config.url(path))
            .header(IDENTITY_HEADER, &self.config.init_data)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(self.config.url(path))
            .header(IDENTITY_HEADER, &self.config.init_data)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }
        Ok(response.json::<T>().await?)
    }

    async fn send_ack(request: RequestBuilder) -> Result<(), RemoteError> {
        let ack: Ack = Self::send_json(request).await?;
        debug!(ok = ack.ok, "mutation acknowledged");
        Ok(())
    }
}

impl HydrationRemote for HttpRemote {
    async fn fetch_today(&self) -> Result<TodaySnapshot, RemoteError> {
        Self::send_json(self.get("/today")).await
    }

    async fn fetch_days(&self, days: u32) -> Result<DaysResponse, RemoteError> {
        Self::send_json(self.get("/stats/days").query(&[("days", days)])).await
    }

    async fn log(&self, amount_ml: i64) -> Result<(), RemoteError> {
        Self::send_ack(self.post("/log").json(&LogRequest { amount_ml })).await
    }

    async fn reset(&self) -> Result<(), RemoteError> {
        Self::send_ack(self.post("/reset")).await
    }

    async fn set_goal(&self, goal_ml: u32) -> Result<(), RemoteError> {
        Self::send_ack(self.post("/goal").json(&GoalRequest {
            goal_ml: i64::from(goal_ml),
        }))
        .await
    }
}
