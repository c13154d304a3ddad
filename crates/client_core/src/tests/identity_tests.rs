use super::*;
use crate::{
    reconciler::decision_feed,
    test_support::{reroute, restock},
};

#[test]
fn first_observation_reports_everything_as_new() {
    let feed = decision_feed(&[restock(1, "Store 1"), reroute(2, "T1")]);
    let mut tracker = IdentityTracker::new();
    let fresh = tracker.observe(&feed);
    assert_eq!(fresh.len(), 2);
    assert_eq!(fresh[0], feed[0].identity);
    assert_eq!(tracker.seen().len(), 2);
}

#[test]
fn unchanged_feed_reports_nothing_new() {
    let feed = decision_feed(&[restock(1, "Store 1"), reroute(2, "T1")]);
    let mut tracker = IdentityTracker::new();
    tracker.observe(&feed);
    assert!(tracker.observe(&feed).is_empty());
}

#[test]
fn reindexed_feed_is_not_new() {
    let logs = vec![restock(1, "Store 1"), reroute(2, "T1"), reroute(3, "T2")];
    let mut tracker = IdentityTracker::new();
    tracker.observe(&decision_feed(&logs));

    // Same entries, different positions in the returned array.
    let mut shuffled = decision_feed(&logs);
    shuffled.rotate_left(1);
    assert!(tracker.observe(&shuffled).is_empty());
}

#[test]
fn only_appended_entries_are_new() {
    let mut logs = vec![restock(1, "Store 1")];
    let mut tracker = IdentityTracker::new();
    tracker.observe(&decision_feed(&logs));

    logs.push(reroute(2, "T1"));
    let fresh = tracker.observe(&decision_feed(&logs));
    assert_eq!(fresh, vec![reroute(2, "T1").identity()]);
}

#[test]
fn identity_that_leaves_and_returns_is_new_again() {
    let returning = decision_feed(&[restock(1, "Store 1")]);
    let other = decision_feed(&[reroute(2, "T1")]);
    let mut tracker = IdentityTracker::new();

    tracker.observe(&returning);
    tracker.observe(&other);
    assert!(!tracker.seen().contains(&returning[0].identity));

    let fresh = tracker.observe(&returning);
    assert_eq!(fresh, vec![returning[0].identity.clone()]);
}

#[test]
fn duplicate_identities_in_one_feed_are_reported_once() {
    // Two restocks written in the same instant share an identity.
    let feed = decision_feed(&[restock(5, "Store 1"), restock(5, "Store 2")]);
    assert_eq!(feed.len(), 2);
    let mut tracker = IdentityTracker::new();
    assert_eq!(tracker.observe(&feed).len(), 1);
}
