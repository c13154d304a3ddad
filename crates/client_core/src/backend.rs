use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::protocol::{
    DisruptionRecord, FastForwardRequest, InventoryMap, LogEntry, RouteRecord,
};
use tracing::debug;

use crate::{engine::RawPoll, error::FetchError};

pub const INVENTORY_ENDPOINT: &str = "/inventory";
pub const LOGS_ENDPOINT: &str = "/logs";
pub const ROUTES_ENDPOINT: &str = "/routes";
pub const DISRUPTIONS_ENDPOINT: &str = "/disruptions";
pub const PAUSE_ENDPOINT: &str = "/pause";
pub const TRIGGER_DISRUPTION_ENDPOINT: &str = "/trigger-disruption";
pub const FAST_FORWARD_ENDPOINT: &str = "/fast-forward";

/// The simulation backend as seen by the dashboard: four reads and three
/// fire-and-forget commands.
#[async_trait]
pub trait SimulationBackend: Send + Sync {
    async fn inventory(&self) -> Result<InventoryMap, FetchError>;
    async fn logs(&self) -> Result<Vec<LogEntry>, FetchError>;
    async fn routes(&self) -> Result<Vec<RouteRecord>, FetchError>;
    async fn disruptions(&self) -> Result<Vec<DisruptionRecord>, FetchError>;
    async fn pause(&self) -> Result<(), FetchError>;
    async fn trigger_disruption(&self) -> Result<(), FetchError>;
    async fn fast_forward(&self, steps: u32) -> Result<(), FetchError>;
}

/// Issues the four reads concurrently and fails as a whole if any one fails.
pub async fn fetch_raw(backend: &dyn SimulationBackend) -> Result<RawPoll, FetchError> {
    let (inventory, logs, routes, disruptions) = futures::try_join!(
        backend.inventory(),
        backend.logs(),
        backend.routes(),
        backend.disruptions()
    )?;
    Ok(RawPoll {
        inventory,
        logs,
        routes,
        disruptions,
    })
}

pub struct HttpSimulationClient {
    http: Client,
    base_url: String,
}

impl HttpSimulationClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build HTTP client for the simulation backend")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, FetchError> {
        let transport = |source| FetchError::Transport { endpoint, source };
        let body = self
            .http
            .get(format!("{}{endpoint}", self.base_url))
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(transport)?
            .bytes()
            .await
            .map_err(transport)?;
        debug!(endpoint, bytes = body.len(), "fetched");
        serde_json::from_slice(&body).map_err(|source| FetchError::Parse { endpoint, source })
    }

    async fn post_command<B: Serialize + Sync>(
        &self,
        endpoint: &'static str,
        body: Option<&B>,
    ) -> Result<(), FetchError> {
        let mut request = self.http.post(format!("{}{endpoint}", self.base_url));
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|source| FetchError::Transport { endpoint, source })?;
        debug!(endpoint, "command sent");
        Ok(())
    }
}

#[async_trait]
impl SimulationBackend for HttpSimulationClient {
    async fn inventory(&self) -> Result<InventoryMap, FetchError> {
        self.get_json(INVENTORY_ENDPOINT).await
    }

    async fn logs(&self) -> Result<Vec<LogEntry>, FetchError> {
        self.get_json(LOGS_ENDPOINT).await
    }

    async fn routes(&self) -> Result<Vec<RouteRecord>, FetchError> {
        self.get_json(ROUTES_ENDPOINT).await
    }

    async fn disruptions(&self) -> Result<Vec<DisruptionRecord>, FetchError> {
        self.get_json(DISRUPTIONS_ENDPOINT).await
    }

    async fn pause(&self) -> Result<(), FetchError> {
        self.post_command::<()>(PAUSE_ENDPOINT, None).await
    }

    async fn trigger_disruption(&self) -> Result<(), FetchError> {
        self.post_command::<()>(TRIGGER_DISRUPTION_ENDPOINT, None).await
    }

    async fn fast_forward(&self, steps: u32) -> Result<(), FetchError> {
        self.post_command(FAST_FORWARD_ENDPOINT, Some(&FastForwardRequest { n: steps }))
            .await
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
