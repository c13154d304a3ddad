use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use shared::protocol::{
    DisruptionRecord, InventoryLevel, InventoryMap, LogEntry, RouteRecord,
};
use tokio::sync::Mutex;

use crate::{backend::SimulationBackend, error::FetchError};

pub fn ts(seconds: u32) -> String {
    format!(
        "2024-05-01T{:02}:{:02}:{:02}.000000Z",
        10 + seconds / 3600,
        seconds / 60 % 60,
        seconds % 60
    )
}

pub fn entry(seconds: u32, agent: &str, action: &str, target: Option<&str>) -> LogEntry {
    LogEntry {
        timestamp: ts(seconds),
        agent: agent.to_string(),
        action: action.to_string(),
        target: target.map(str::to_string),
        explanation: None,
        details: None,
    }
}

pub fn restock(seconds: u32, location: &str) -> LogEntry {
    entry(seconds, "InventoryAgent", "restock", Some(location))
}

pub fn disruption(seconds: u32, location: &str) -> LogEntry {
    entry(
        seconds,
        "DisruptionAgent",
        "inventory_disruption",
        Some(location),
    )
}

pub fn reroute(seconds: u32, truck: &str) -> LogEntry {
    entry(seconds, "RouteAgent", "reroute", Some(truck))
}

pub fn inventory(levels: &[(&str, f64, f64)]) -> InventoryMap {
    levels
        .iter()
        .map(|(location, stock, threshold)| {
            (
                location.to_string(),
                InventoryLevel {
                    stock: *stock,
                    threshold: *threshold,
                },
            )
        })
        .collect()
}

pub fn parse_failure(endpoint: &'static str) -> FetchError {
    let source = serde_json::from_str::<serde_json::Value>("{").expect_err("malformed json");
    FetchError::Parse { endpoint, source }
}

/// In-memory backend whose log and failure mode tests can change between
/// polls.
#[derive(Default)]
pub struct FakeBackend {
    pub inventory: Mutex<InventoryMap>,
    pub logs: Mutex<Vec<LogEntry>>,
    pub routes: Mutex<Vec<RouteRecord>>,
    pub disruptions: Mutex<Vec<DisruptionRecord>>,
    pub failing: Mutex<bool>,
    pub log_fetches: Mutex<u32>,
    /// Delay applied to every `/logs` fetch after the first.
    pub slow_logs: Mutex<Option<Duration>>,
    pub commands: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_logs(logs: Vec<LogEntry>) -> Arc<Self> {
        Arc::new(Self {
            logs: Mutex::new(logs),
            ..Self::default()
        })
    }

    pub async fn set_logs(&self, logs: Vec<LogEntry>) {
        *self.logs.lock().await = logs;
    }

    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    pub async fn set_slow_logs(&self, delay: Duration) {
        *self.slow_logs.lock().await = Some(delay);
    }
}

#[async_trait]
impl SimulationBackend for FakeBackend {
    async fn inventory(&self) -> Result<InventoryMap, FetchError> {
        Ok(self.inventory.lock().await.clone())
    }

    async fn logs(&self) -> Result<Vec<LogEntry>, FetchError> {
        let fetch = {
            let mut fetches = self.log_fetches.lock().await;
            *fetches += 1;
            *fetches
        };
        let delay = *self.slow_logs.lock().await;
        if let Some(delay) = delay.filter(|_| fetch > 1) {
            tokio::time::sleep(delay).await;
        }
        if *self.failing.lock().await {
            return Err(parse_failure("/logs"));
        }
        Ok(self.logs.lock().await.clone())
    }

    async fn routes(&self) -> Result<Vec<RouteRecord>, FetchError> {
        Ok(self.routes.lock().await.clone())
    }

    async fn disruptions(&self) -> Result<Vec<DisruptionRecord>, FetchError> {
        Ok(self.disruptions.lock().await.clone())
    }

    async fn pause(&self) -> Result<(), FetchError> {
        self.record("pause").await
    }

    async fn trigger_disruption(&self) -> Result<(), FetchError> {
        self.record("trigger-disruption").await
    }

    async fn fast_forward(&self, steps: u32) -> Result<(), FetchError> {
        self.record(&format!("fast-forward {steps}")).await
    }
}

impl FakeBackend {
    async fn record(&self, command: &str) -> Result<(), FetchError> {
        if *self.failing.lock().await {
            return Err(parse_failure("/command"));
        }
        self.commands.lock().await.push(command.to_string());
        Ok(())
    }
}
