use std::collections::HashSet;

use shared::domain::DecisionIdentity;

use crate::reconciler::DerivedDecision;

/// Remembers which decision identities the previous poll's feed contained.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    seen: HashSet<DecisionIdentity>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identities in `feed` that the previous call did not see, in
    /// feed order and without duplicates, then forgets everything not in
    /// `feed`. An identity that drops out and later returns is new again.
    pub fn observe(&mut self, feed: &[DerivedDecision]) -> Vec<DecisionIdentity> {
        let mut current = HashSet::with_capacity(feed.len());
        let mut fresh = Vec::new();
        for decision in feed {
            if current.insert(decision.identity.clone()) && !self.seen.contains(&decision.identity)
            {
                fresh.push(decision.identity.clone());
            }
        }
        self.seen = current;
        fresh
    }

    pub fn seen(&self) -> &HashSet<DecisionIdentity> {
        &self.seen
    }
}

#[cfg(test)]
#[path = "tests/identity_tests.rs"]
mod tests;
