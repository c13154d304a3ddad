use super::*;
use crate::test_support::{disruption, entry, reroute, restock, ts};

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[test]
fn disruption_after_restock_marks_location_disrupted() {
    let logs = vec![restock(1, "A"), disruption(2, "A")];
    assert_eq!(disrupted_locations(&logs), set(&["A"]));
}

#[test]
fn restock_after_disruption_clears_location() {
    let logs = vec![disruption(1, "A"), restock(2, "A")];
    assert!(disrupted_locations(&logs).is_empty());
}

#[test]
fn newest_restock_shadows_every_older_disruption_in_window() {
    let logs = vec![
        disruption(1, "A"),
        disruption(2, "A"),
        restock(3, "A"),
        disruption(4, "B"),
    ];
    assert_eq!(disrupted_locations(&logs), set(&["B"]));
}

#[test]
fn restock_by_other_agent_does_not_clear_disruption() {
    let logs = vec![
        disruption(1, "A"),
        entry(2, "RouteAgent", "restock", Some("A")),
    ];
    assert_eq!(disrupted_locations(&logs), set(&["A"]));
}

#[test]
fn disruption_outside_lookback_window_is_ignored() {
    let mut logs = vec![disruption(0, "A")];
    logs.extend((1..=DISRUPTION_LOOKBACK as u32).map(|i| reroute(i, "T1")));
    assert!(disrupted_locations(&logs).is_empty());

    // One fewer filler entry brings it back into the window.
    logs.remove(1);
    assert_eq!(disrupted_locations(&logs), set(&["A"]));
}

#[test]
fn bookkeeping_and_resolution_actions_do_not_disrupt() {
    let logs = vec![
        entry(1, "DisruptionAgent", "disruption_check", Some("Route 3")),
        entry(2, "DisruptionAgent", "resolve_disruption", Some("Route 4")),
        entry(3, "DisruptionAgent", "route_disruption", None),
    ];
    assert!(disrupted_locations(&logs).is_empty());
}

#[test]
fn reconciling_twice_gives_same_disrupted_set() {
    let logs = vec![disruption(1, "A"), restock(2, "B"), disruption(3, "C")];
    assert_eq!(disrupted_locations(&logs), disrupted_locations(&logs));
}

#[test]
fn feed_is_bounded_for_large_logs() {
    let logs: Vec<LogEntry> = (0..1000).map(|i| reroute(i, "T1")).collect();
    let feed = decision_feed(&logs);
    assert_eq!(feed.len(), FEED_LIMIT);
    assert_eq!(feed[0].identity.timestamp, ts(999));
    assert_eq!(feed[FEED_LIMIT - 1].identity.timestamp, ts(980));
}

#[test]
fn feed_excludes_disruption_monitoring() {
    let mut logs = Vec::new();
    for i in 0..300 {
        logs.push(entry(i, "DisruptionAgent", "resolve_disruption", Some("Route 1")));
        logs.push(entry(i, "RouteAgent", "disruption_check", Some("Route 2")));
        if i % 10 == 0 {
            logs.push(restock(i, "Store 1"));
        }
    }
    let feed = decision_feed(&logs);
    assert_eq!(feed.len(), 20);
    assert!(feed
        .iter()
        .all(|d| d.agent != "DisruptionAgent" && d.identity.action != "disruption_check"));
}

#[test]
fn feed_is_newest_first_and_takes_window_after_filtering() {
    let mut logs = vec![restock(0, "Store 1")];
    logs.extend((1..=30).map(|i| entry(i, "DisruptionAgent", "disruption_check", None)));
    let feed = decision_feed(&logs);
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].display_action, "ReStock");

    let logs = vec![restock(0, "Store 1"), reroute(1, "T2")];
    let feed = decision_feed(&logs);
    assert_eq!(feed[0].display_action, "ReRouting");
    assert_eq!(feed[1].display_action, "ReStock");
}

#[test]
fn unknown_actions_pass_through() {
    assert_eq!(display_action("reroute"), "ReRouting");
    assert_eq!(display_action("restock"), "ReStock");
    assert_eq!(display_action("adjust_forecast"), "adjust_forecast");
}

#[test]
fn reasoning_prefers_explanation_then_details() {
    let mut e = reroute(1, "T1");
    assert_eq!(reasoning(&e), "");

    e.details = Some("details text".into());
    assert_eq!(reasoning(&e), "details text");

    e.explanation = Some(String::new());
    assert_eq!(reasoning(&e), "details text");

    e.explanation = Some("why it happened".into());
    assert_eq!(reasoning(&e), "why it happened");
}

#[test]
fn formats_backend_timestamps() {
    assert_eq!(display_timestamp("2024-05-01T10:04:05.123456Z"), "10:04:05");
    assert_eq!(display_timestamp("2024-05-01T12:04:05+02:00"), "10:04:05");
    // Naive time without an offset.
    assert_eq!(display_timestamp("2024-05-01T08:30:00.5"), "08:30:00");
    assert_eq!(display_timestamp("yesterday"), "yesterday");
}

#[test]
fn derived_decision_keeps_raw_identity() {
    let mut e = restock(7, "Store 2");
    e.explanation = Some("Restocked 10 units".into());
    let decision = DerivedDecision::from_entry(&e);
    assert_eq!(
        decision.identity,
        DecisionIdentity::new(ts(7), "InventoryAgent", "restock")
    );
    assert_eq!(decision.target.as_deref(), Some("Store 2"));
    assert_eq!(decision.reasoning, "Restocked 10 units");
    assert!(!decision.is_new);
}
