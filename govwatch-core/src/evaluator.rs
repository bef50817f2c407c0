//! Voting-window threshold evaluation
//!
//! Decides, for one proposal at one instant, which boundary alerts are due and
//! turns them into messages. Stateless: repeated calls with the same inputs give
//! the same answer.

use crate::config::AlertThresholds;
use crate::notify::AlertMessage;
use crate::proposal::{NetworkDescriptor, Proposal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Which edge of the voting period an alert is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    StartingSoon,
    EndingSoon,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::StartingSoon => write!(f, "starting_soon"),
            AlertKind::EndingSoon => write!(f, "ending_soon"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DueAlert {
    pub kind: AlertKind,
    pub boundary: DateTime<Utc>,
    pub hours_until: f64,
}

/// Fractional hours from `now` until `instant`; negative once it has passed.
pub fn hours_until(instant: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (instant - now).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Alerts due for `proposal` at `now`. Zero, one or both kinds.
///
/// A boundary fires when it lies strictly in the future and no more than the
/// configured lead time away. Start and end are judged independently, so an
/// inverted window never errors.
pub fn evaluate(proposal: &Proposal, now: DateTime<Utc>, thresholds: &AlertThresholds) -> Vec<DueAlert> {
    let candidates = [
        (AlertKind::StartingSoon, proposal.voting_start, thresholds.hours_before_start),
        (AlertKind::EndingSoon, proposal.voting_end, thresholds.hours_before_end),
    ];

    candidates
        .into_iter()
        .filter(|(_, boundary, _)| *boundary > now)
        .filter_map(|(kind, boundary, lead_hours)| {
            let hours = hours_until(boundary, now);
            (hours > 0.0 && hours <= f64::from(lead_hours)).then_some(DueAlert {
                kind,
                boundary,
                hours_until: hours,
            })
        })
        .collect()
}

/// Build the message for a due alert on `network`.
pub fn compose(proposal: &Proposal, due: &DueAlert, network: &NetworkDescriptor) -> AlertMessage {
    let (title, verb) = match due.kind {
        AlertKind::StartingSoon => (
            format!("🚨 Governance Proposal Voting Starting Soon - {}", proposal.network),
            "start",
        ),
        AlertKind::EndingSoon => (
            format!("⏰ Governance Proposal Voting Ending Soon - {}", proposal.network),
            "end",
        ),
    };

    AlertMessage {
        title,
        body: format!(
            "Proposal \"{}\" will {} voting in {:.1} hours.\n\nDescription: {}",
            proposal.title, verb, due.hours_until, proposal.description
        ),
        network: proposal.network.clone(),
        chain_id: network.chain_id.clone(),
        proposal_id: Some(proposal.id),
        explorer_link: network.proposal_link(proposal.id),
    }
}
