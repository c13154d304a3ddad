use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
    time::{Duration, Instant},
};

use shared::domain::DecisionIdentity;

pub const DEFAULT_HIGHLIGHT_TTL: Duration = Duration::from_millis(3000);

/// Tracks which decisions are highlighted as new and when each highlight
/// lapses.
///
/// Deadlines sit in a min-heap and are only drained by [`expire`]. Re-arming an
/// identity that is still highlighted moves its deadline; the older heap entry
/// is left in place and skipped when it surfaces.
///
/// [`expire`]: HighlightScheduler::expire
#[derive(Debug)]
pub struct HighlightScheduler {
    ttl: Duration,
    deadlines: BinaryHeap<Reverse<(Instant, DecisionIdentity)>>,
    active: HashMap<DecisionIdentity, Instant>,
}

impl Default for HighlightScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_HIGHLIGHT_TTL)
    }
}

impl HighlightScheduler {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            deadlines: BinaryHeap::new(),
            active: HashMap::new(),
        }
    }

    pub fn arm(&mut self, identity: DecisionIdentity, now: Instant) -> Instant {
        let deadline = now + self.ttl;
        self.active.insert(identity.clone(), deadline);
        self.deadlines.push(Reverse((deadline, identity)));
        deadline
    }

    /// Clears every highlight whose deadline is at or before `now` and returns
    /// the cleared identities in deadline order.
    pub fn expire(&mut self, now: Instant) -> Vec<DecisionIdentity> {
        let mut expired = Vec::new();
        while let Some(Reverse((deadline, _))) = self.deadlines.peek() {
            if *deadline > now {
                break;
            }
            let Some(Reverse((deadline, identity))) = self.deadlines.pop() else {
                break;
            };
            // A later arm() for the same identity supersedes this entry.
            if self.active.get(&identity) == Some(&deadline) {
                self.active.remove(&identity);
                expired.push(identity);
            }
        }
        expired
    }

    pub fn is_highlighted(&self, identity: &DecisionIdentity) -> bool {
        self.active.contains_key(identity)
    }

    pub fn highlighted(&self) -> impl Iterator<Item = &DecisionIdentity> {
        self.active.keys()
    }

    /// Earliest pending heap entry. May belong to a superseded arm, in which
    /// case draining it changes nothing.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.peek().map(|Reverse((deadline, _))| *deadline)
    }

    pub fn pending(&self) -> usize {
        self.deadlines.len()
    }
}

#[cfg(test)]
#[path = "tests/highlight_tests.rs"]
mod tests;
