// In-memory record of delivered boundary alerts

use crate::evaluator::AlertKind;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub network: String,
    pub proposal_id: u64,
    pub kind: AlertKind,
}

impl AlertKey {
    pub fn new(network: impl Into<String>, proposal_id: u64, kind: AlertKind) -> Self {
        Self {
            network: network.into(),
            proposal_id,
            kind,
        }
    }
}

/// Keeps each (network, proposal, boundary) alert to a single delivery.
///
/// Entries remember the boundary they were sent for and are dropped once it
/// has passed. A boundary that moves (e.g. a rescheduled proposal) is treated
/// as a fresh alert.
#[derive(Debug, Default)]
pub struct AlertLedger {
    sent: HashMap<AlertKey, DateTime<Utc>>,
}

impl AlertLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn already_sent(&self, key: &AlertKey, boundary: DateTime<Utc>) -> bool {
        self.sent.get(key) == Some(&boundary)
    }

    pub fn record(&mut self, key: AlertKey, boundary: DateTime<Utc>) {
        self.sent.insert(key, boundary);
    }

    /// Forget alerts whose boundary is at or before `now`. Returns how many were dropped.
    pub fn evict_passed(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sent.len();
        self.sent.retain(|_, boundary| *boundary > now);
        before - self.sent.len()
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }
}
