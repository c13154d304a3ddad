//! Pure derivations over the raw `/logs` array.
//!
//! The array is append-ordered: the last element is the most recent entry.
//! Nothing here re-sorts by timestamp, and nothing here looks at state from a
//! previous poll.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use shared::{
    domain::{actions, agents, is_disruption_event, DecisionIdentity},
    protocol::LogEntry,
};

/// How many of the newest log entries decide disruption status.
pub const DISRUPTION_LOOKBACK: usize = 20;
/// Maximum length of the decision feed.
pub const FEED_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedDecision {
    pub identity: DecisionIdentity,
    pub agent: String,
    pub target: Option<String>,
    pub display_action: String,
    pub display_timestamp: String,
    pub reasoning: String,
    pub is_new: bool,
}

impl DerivedDecision {
    pub fn from_entry(entry: &LogEntry) -> Self {
        Self {
            identity: entry.identity(),
            agent: entry.agent.clone(),
            target: entry.target.clone(),
            display_action: display_action(&entry.action),
            display_timestamp: display_timestamp(&entry.timestamp),
            reasoning: reasoning(entry),
            is_new: false,
        }
    }
}

/// Locations whose newest relevant event in the lookback window is a
/// disruption.
///
/// Scans newest first. A restock by the inventory agent shadows every older
/// disruption of the same location for the rest of the scan.
pub fn disrupted_locations(logs: &[LogEntry]) -> BTreeSet<String> {
    let mut restocked: BTreeSet<&str> = BTreeSet::new();
    let mut disrupted = BTreeSet::new();

    for entry in logs.iter().rev().take(DISRUPTION_LOOKBACK) {
        let Some(target) = entry.target.as_deref() else {
            continue;
        };
        if entry.action == actions::RESTOCK && entry.agent == agents::INVENTORY {
            restocked.insert(target);
        } else if is_disruption_event(&entry.action) && !restocked.contains(target) {
            disrupted.insert(target.to_string());
        }
    }

    disrupted
}

/// The newest [`FEED_LIMIT`] decisions, newest first, with monitoring noise
/// removed. Every entry comes back with `is_new == false`.
pub fn decision_feed(logs: &[LogEntry]) -> Vec<DerivedDecision> {
    logs.iter()
        .rev()
        .filter(|entry| is_decision(entry))
        .take(FEED_LIMIT)
        .map(DerivedDecision::from_entry)
        .collect()
}

/// Disruption checks and everything the disruption monitor writes are
/// bookkeeping, not decisions.
pub fn is_decision(entry: &LogEntry) -> bool {
    entry.action != actions::DISRUPTION_CHECK && entry.agent != agents::DISRUPTION
}

pub fn display_action(action: &str) -> String {
    match action {
        actions::REROUTE => "ReRouting".to_string(),
        actions::RESTOCK => "ReStock".to_string(),
        other => other.to_string(),
    }
}

/// `HH:MM:SS` in UTC when the timestamp parses, otherwise the raw string.
///
/// The backend writes both `...Z` RFC 3339 values and naive local times with a
/// bare `Z` glued on, so a naive fallback is tried too.
pub fn display_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.naive_utc().format("%H:%M:%S").to_string();
    }
    let naive = raw.trim_end_matches('Z');
    match NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(parsed) => parsed.format("%H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// `explanation`, then `details`, then nothing. Empty strings count as absent.
pub fn reasoning(entry: &LogEntry) -> String {
    [entry.explanation.as_deref(), entry.details.as_deref()]
        .into_iter()
        .flatten()
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
#[path = "tests/reconciler_tests.rs"]
mod tests;
