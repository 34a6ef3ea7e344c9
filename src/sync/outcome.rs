//! Dispatch outcomes
//!
//! Per-peer results of one invalidation broadcast.

use std::collections::BTreeMap;

use serde::Serialize;

// == Dispatch Outcome ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The peer answered 2xx; its entry is gone
    Evicted,
    /// The request never got an answer (connect or transport error)
    Unreachable { reason: String },
    /// No answer within the per-call timeout
    TimedOut,
    /// The peer answered with a non-success status (404 for an unknown cache)
    Rejected { status: u16 },
}

impl DispatchOutcome {
    pub fn is_evicted(&self) -> bool {
        matches!(self, DispatchOutcome::Evicted)
    }
}

// == Dispatch Summary ==
/// Outcome per peer id. Always one entry per peer that was targeted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DispatchSummary {
    outcomes: BTreeMap<String, DispatchOutcome>,
}

impl DispatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, peer_id: impl Into<String>, outcome: DispatchOutcome) {
        self.outcomes.insert(peer_id.into(), outcome);
    }

    pub fn get(&self, peer_id: &str) -> Option<&DispatchOutcome> {
        self.outcomes.get(peer_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DispatchOutcome)> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn evicted(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_evicted()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.evicted()
    }
}

impl FromIterator<(String, DispatchOutcome)> for DispatchSummary {
    fn from_iter<I: IntoIterator<Item = (String, DispatchOutcome)>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}
