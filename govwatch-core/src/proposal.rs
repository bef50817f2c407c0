// Normalized governance data shared by sources, the evaluator and the monitor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const VOTING_PERIOD_STATUS: &str = "PROPOSAL_STATUS_VOTING_PERIOD";

/// Lifecycle status of a Cosmos SDK `x/gov` proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Unspecified,
    DepositPeriod,
    VotingPeriod,
    Passed,
    Rejected,
    Failed,
    Other(String),
}

impl ProposalStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "PROPOSAL_STATUS_UNSPECIFIED" => Self::Unspecified,
            "PROPOSAL_STATUS_DEPOSIT_PERIOD" => Self::DepositPeriod,
            VOTING_PERIOD_STATUS => Self::VotingPeriod,
            "PROPOSAL_STATUS_PASSED" => Self::Passed,
            "PROPOSAL_STATUS_REJECTED" => Self::Rejected,
            "PROPOSAL_STATUS_FAILED" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_voting(&self) -> bool {
        matches!(self, Self::VotingPeriod)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => write!(f, "unspecified"),
            Self::DepositPeriod => write!(f, "deposit period"),
            Self::VotingPeriod => write!(f, "voting period"),
            Self::Passed => write!(f, "passed"),
            Self::Rejected => write!(f, "rejected"),
            Self::Failed => write!(f, "failed"),
            Self::Other(code) => write!(f, "{}", code),
        }
    }
}

/// A proposal as seen on one poll. Rebuilt every cycle, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: ProposalStatus,
    pub voting_start: DateTime<Utc>,
    pub voting_end: DateTime<Utc>,
    /// Display name of the network the proposal lives on.
    pub network: String,
}

/// One monitored chain, fixed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    /// Key of the network in the config map, e.g. `bbn-1`.
    pub key: String,
    /// Human readable name used in alerts, e.g. `Babylon Mainnet`.
    pub name: String,
    pub endpoint: String,
    pub chain_id: String,
    pub explorer_url: Option<String>,
}

impl NetworkDescriptor {
    /// Explorer page for a proposal, when the network has an explorer configured.
    pub fn proposal_link(&self, proposal_id: u64) -> Option<String> {
        self.explorer_url
            .as_deref()
            .map(|base| format!("{}/proposals/{}", base.trim_end_matches('/'), proposal_id))
    }
}

impl fmt::Display for NetworkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}
