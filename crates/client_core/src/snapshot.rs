use std::{collections::BTreeSet, sync::Arc};

use serde::Serialize;
use shared::protocol::{DisruptionRecord, InventoryMap, RouteRecord};
use tokio::sync::watch;

use crate::reconciler::DerivedDecision;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryStatus {
    pub location: String,
    pub stock: f64,
    pub threshold: f64,
    pub recently_disrupted: bool,
    /// Below threshold; the backend restocks these on its next step.
    pub replenishing: bool,
}

/// One fully reconciled view of the simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Sorted by location name.
    pub inventory: Vec<InventoryStatus>,
    pub routes: Vec<RouteRecord>,
    pub disruptions: Vec<DisruptionRecord>,
    pub disrupted: BTreeSet<String>,
    /// Newest first.
    pub decisions: Vec<DerivedDecision>,
}

impl Snapshot {
    pub fn assemble(
        inventory: InventoryMap,
        routes: Vec<RouteRecord>,
        disruptions: Vec<DisruptionRecord>,
        disrupted: BTreeSet<String>,
        decisions: Vec<DerivedDecision>,
    ) -> Self {
        let inventory = inventory
            .into_iter()
            .map(|(location, level)| InventoryStatus {
                recently_disrupted: disrupted.contains(&location),
                replenishing: level.stock < level.threshold,
                stock: level.stock,
                threshold: level.threshold,
                location,
            })
            .collect();

        Self {
            inventory,
            routes,
            disruptions,
            disrupted,
            decisions,
        }
    }

    pub fn new_decisions(&self) -> impl Iterator<Item = &DerivedDecision> {
        self.decisions.iter().filter(|decision| decision.is_new)
    }

    pub fn is_disrupted(&self, location: &str) -> bool {
        self.disrupted.contains(location)
    }
}

/// Latest committed [`Snapshot`].
///
/// A commit swaps the whole `Arc`, so readers see either the previous snapshot
/// or the next one, never a mix.
#[derive(Clone)]
pub struct SnapshotStore {
    tx: Arc<watch::Sender<Arc<Snapshot>>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Snapshot::default()));
        Self { tx: Arc::new(tx) }
    }

    pub fn commit(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.tx.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }
}
