use std::fmt::Write;

use client_core::{DerivedDecision, InventoryStatus, Snapshot};
use shared::protocol::{DisruptionRecord, RouteRecord};

const MISSING: &str = "-";

pub fn inventory_line(status: &InventoryStatus) -> String {
    let mut line = format!(
        "{:<16} {:>8.1} / {:<8.1}",
        status.location, status.stock, status.threshold
    );
    if status.replenishing {
        line.push_str(" replenishing");
    }
    if status.recently_disrupted {
        line.push_str(" DISRUPTED");
    }
    line
}

pub fn route_line(route: &RouteRecord) -> String {
    format!(
        "{} {} -> {} via {}",
        route.truck.as_deref().unwrap_or(MISSING),
        route.origin.as_deref().unwrap_or(MISSING),
        route.destination.as_deref().unwrap_or(MISSING),
        route.route.as_deref().unwrap_or(MISSING),
    )
}

pub fn disruption_line(disruption: &DisruptionRecord) -> String {
    format!(
        "{} at {} ({})",
        disruption.kind.as_deref().unwrap_or(MISSING),
        disruption.location.as_deref().unwrap_or(MISSING),
        disruption.severity.as_deref().unwrap_or(MISSING),
    )
}

/// `*` marks a decision still inside its highlight window.
pub fn decision_line(decision: &DerivedDecision) -> String {
    let marker = if decision.is_new { '*' } else { ' ' };
    let mut line = format!(
        "{marker} {} {} {}",
        decision.display_timestamp, decision.agent, decision.display_action
    );
    if let Some(target) = &decision.target {
        let _ = write!(line, " {target}");
    }
    if !decision.reasoning.is_empty() {
        let _ = write!(line, ": {}", decision.reasoning);
    }
    line
}

pub fn snapshot(snapshot: &Snapshot, clock: &str) -> String {
    let mut out = format!("== supply chain @ {clock} ==\n");

    out.push_str("-- inventory\n");
    for status in &snapshot.inventory {
        out.push_str(&inventory_line(status));
        out.push('\n');
    }
    if !snapshot.routes.is_empty() {
        out.push_str("-- routes\n");
        for route in &snapshot.routes {
            out.push_str(&route_line(route));
            out.push('\n');
        }
    }
    if !snapshot.disruptions.is_empty() {
        out.push_str("-- disruptions\n");
        for disruption in &snapshot.disruptions {
            out.push_str(&disruption_line(disruption));
            out.push('\n');
        }
    }
    out.push_str("-- decisions\n");
    if snapshot.decisions.is_empty() {
        out.push_str("  (none yet)\n");
    }
    for decision in &snapshot.decisions {
        out.push_str(&decision_line(decision));
        out.push('\n');
    }
    out
}
