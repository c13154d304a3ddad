//! Client core for the supply-chain simulation dashboard.
//!
//! Polls the simulation backend, reconciles its event log into a disrupted
//! location set and a decision feed, tracks which decisions are new, and
//! publishes each result as one atomic [`Snapshot`].

pub mod backend;
pub mod config;
pub mod controls;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod identity;
pub mod poller;
pub mod reconciler;
pub mod snapshot;

pub use backend::{fetch_raw, HttpSimulationClient, SimulationBackend};
pub use config::{load_settings, PollerConfig, Settings};
pub use controls::SimulationControls;
pub use engine::{RawPoll, ReconcileEngine};
pub use error::FetchError;
pub use poller::{Clock, Poller, PollerEvent, PollerHandle, SystemClock};
pub use reconciler::DerivedDecision;
pub use snapshot::{InventoryStatus, Snapshot, SnapshotStore};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
