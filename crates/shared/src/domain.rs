use serde::{Deserialize, Serialize};

macro_rules! name_constants {
    ($module:ident { $($name:ident => $value:literal),+ $(,)? }) => {
        pub mod $module {
            $(pub const $name: &str = $value;)+
        }
    };
}

name_constants!(agents {
    INVENTORY => "InventoryAgent",
    ROUTE => "RouteAgent",
    DISRUPTION => "DisruptionAgent",
});

name_constants!(actions {
    RESTOCK => "restock",
    REROUTE => "reroute",
    DISRUPTION_CHECK => "disruption_check",
    RESOLVE_DISRUPTION => "resolve_disruption",
});

/// Identifies one log entry across polls.
///
/// The backend never assigns ids, so `(timestamp, agent, action)` is the only
/// key that survives re-fetching the whole log. The timestamp is the raw
/// string the backend wrote, never a re-formatted value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecisionIdentity {
    pub timestamp: String,
    pub agent: String,
    pub action: String,
}

impl DecisionIdentity {
    pub fn new(
        timestamp: impl Into<String>,
        agent: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            agent: agent.into(),
            action: action.into(),
        }
    }
}

/// True for actions that open a disruption at their target.
///
/// `resolve_disruption` closes one and `disruption_check` is bookkeeping, so
/// neither counts.
pub fn is_disruption_event(action: &str) -> bool {
    if action == actions::RESOLVE_DISRUPTION || action == actions::DISRUPTION_CHECK {
        return false;
    }
    action == "disruption" || action.ends_with("_disruption")
}
