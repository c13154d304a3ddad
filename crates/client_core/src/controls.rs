use std::sync::Arc;

use tracing::{info, warn};

use crate::{backend::SimulationBackend, error::FetchError};

/// Command side of the dashboard.
///
/// `/pause` toggles on the backend and reports nothing back, so the running
/// flag here is a local mirror flipped on every successful call.
pub struct SimulationControls {
    backend: Arc<dyn SimulationBackend>,
    running: bool,
    fast_forward_steps: u32,
}

impl SimulationControls {
    pub fn new(backend: Arc<dyn SimulationBackend>, fast_forward_steps: u32) -> Self {
        Self {
            backend,
            running: true,
            fast_forward_steps,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn fast_forward_steps(&self) -> u32 {
        self.fast_forward_steps
    }

    /// Returns the running state after the toggle.
    pub async fn toggle_pause(&mut self) -> Result<bool, FetchError> {
        match self.backend.pause().await {
            Ok(()) => {
                self.running = !self.running;
                info!(running = self.running, "simulation pause toggled");
                Ok(self.running)
            }
            Err(err) => {
                warn!(error = %err, "pause command failed");
                Err(err)
            }
        }
    }

    pub async fn trigger_disruption(&self) -> Result<(), FetchError> {
        if let Err(err) = self.backend.trigger_disruption().await {
            warn!(error = %err, "trigger-disruption command failed");
            return Err(err);
        }
        info!("disruption triggered");
        Ok(())
    }

    /// Advances the simulation by `steps`, or by the configured default.
    pub async fn fast_forward(&self, steps: Option<u32>) -> Result<u32, FetchError> {
        let steps = steps.unwrap_or(self.fast_forward_steps);
        match self.backend.fast_forward(steps).await {
            Ok(()) => {
                info!(steps, "simulation fast-forwarded");
                Ok(steps)
            }
            Err(err) => {
                warn!(error = %err, steps, "fast-forward command failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controls_tests.rs"]
mod tests;
