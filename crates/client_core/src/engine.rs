use std::time::{Duration, Instant};

use shared::{
    domain::DecisionIdentity,
    protocol::{DisruptionRecord, InventoryMap, LogEntry, RouteRecord},
};

use crate::{
    highlight::HighlightScheduler,
    identity::IdentityTracker,
    reconciler::{decision_feed, disrupted_locations},
    snapshot::Snapshot,
};

/// Bodies of the four read endpoints from one poll cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPoll {
    pub inventory: InventoryMap,
    pub logs: Vec<LogEntry>,
    pub routes: Vec<RouteRecord>,
    pub disruptions: Vec<DisruptionRecord>,
}

/// Owns the only state that survives between polls: the identities seen last
/// time and the pending highlight deadlines.
///
/// Time is always supplied by the caller, so the engine can be driven by a
/// virtual clock.
#[derive(Debug)]
pub struct ReconcileEngine {
    tracker: IdentityTracker,
    highlights: HighlightScheduler,
}

impl Default for ReconcileEngine {
    fn default() -> Self {
        Self {
            tracker: IdentityTracker::new(),
            highlights: HighlightScheduler::default(),
        }
    }
}

impl ReconcileEngine {
    pub fn new(highlight_ttl: Duration) -> Self {
        Self {
            tracker: IdentityTracker::new(),
            highlights: HighlightScheduler::new(highlight_ttl),
        }
    }

    pub fn poll(&mut self, raw: RawPoll, now: Instant) -> Snapshot {
        let disrupted = disrupted_locations(&raw.logs);
        let mut decisions = decision_feed(&raw.logs);

        for identity in self.tracker.observe(&decisions) {
            self.highlights.arm(identity, now);
        }
        for decision in &mut decisions {
            decision.is_new = self.highlights.is_highlighted(&decision.identity);
        }

        Snapshot::assemble(
            raw.inventory,
            raw.routes,
            raw.disruptions,
            disrupted,
            decisions,
        )
    }

    /// Drains expired highlights. An empty result means the visible "new" set
    /// did not change.
    pub fn tick(&mut self, now: Instant) -> Vec<DecisionIdentity> {
        self.highlights.expire(now)
    }

    /// Copy of `snapshot` with `is_new` recomputed from the current highlights.
    pub fn apply_highlights(&self, snapshot: &Snapshot) -> Snapshot {
        let mut refreshed = snapshot.clone();
        for decision in &mut refreshed.decisions {
            decision.is_new = self.highlights.is_highlighted(&decision.identity);
        }
        refreshed
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.highlights.next_deadline()
    }

    pub fn is_new(&self, identity: &DecisionIdentity) -> bool {
        self.highlights.is_highlighted(identity)
    }

    pub fn seen_identities(&self) -> usize {
        self.tracker.seen().len()
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
