use crate::error::{ConfigError, ProposalParseError, SourceError};
use crate::proposal::{NetworkDescriptor, Proposal, ProposalStatus};
use crate::source::ProposalSource;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const USER_AGENT: &str = concat!("govwatch/", env!("CARGO_PKG_VERSION"));

const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug, Deserialize)]
pub struct GovProposalsResponse {
    #[serde(default)]
    pub proposals: Vec<RawProposal>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub next_key: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GovProposalResponse {
    proposal: RawProposal,
}

/// Proposal as served by `x/gov` v1. Everything is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct RawProposal {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub voting_start_time: Option<String>,
    #[serde(default)]
    pub voting_end_time: Option<String>,
}

/// REST client for the governance module of a Cosmos SDK chain.
pub struct CosmosGovClient {
    client: Client,
    network: NetworkDescriptor,
}

impl CosmosGovClient {
    pub fn new(network: NetworkDescriptor) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, network })
    }

    fn proposals_url(&self) -> String {
        format!(
            "{}/cosmos/gov/v1/proposals",
            self.network.endpoint.trim_end_matches('/')
        )
    }

    /// Any single proposal, whatever its status.
    pub async fn fetch_proposal(&self, proposal_id: u64) -> Result<Proposal, SourceError> {
        let url = format!("{}/{}", self.proposals_url(), proposal_id);
        let body = self.get(&url).await?;

        let response: GovProposalResponse =
            serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(normalize_proposal(&response.proposal, &self.network.name)?)
    }

    pub async fn proposal_status(&self, proposal_id: u64) -> Result<ProposalStatus, SourceError> {
        Ok(self.fetch_proposal(proposal_id).await?.status)
    }

    async fn get(&self, url: &str) -> Result<String, SourceError> {
        debug!(network = %self.network.key, url, "GET");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl ProposalSource for CosmosGovClient {
    fn descriptor(&self) -> &NetworkDescriptor {
        &self.network
    }

    async fn fetch_active_proposals(&self) -> Result<Vec<Proposal>, SourceError> {
        info!(
            network = %self.network.key,
            chain_id = %self.network.chain_id,
            "Checking proposals"
        );

        let body = self.get(&self.proposals_url()).await?;
        let response: GovProposalsResponse =
            serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))?;

        let pagination = response.pagination.as_ref();
        debug!(
            network = %self.network.key,
            fetched = response.proposals.len(),
            total = pagination.and_then(|p| p.total.as_deref()).unwrap_or("unknown"),
            "Fetched proposals"
        );
        if let Some(next_key) = pagination.and_then(|p| p.next_key.as_deref()) {
            // Only the first page is read.
            debug!(network = %self.network.key, next_key, "Ignoring further proposal pages");
        }

        let proposals = voting_proposals(&response, &self.network.name);
        info!(
            network = %self.network.key,
            count = proposals.len(),
            "Found proposals in voting period"
        );
        Ok(proposals)
    }
}

/// Keep proposals in their voting period, skipping the ones that do not normalize.
pub fn voting_proposals(response: &GovProposalsResponse, network: &str) -> Vec<Proposal> {
    response
        .proposals
        .iter()
        .filter(|raw| ProposalStatus::from_code(&raw.status).is_voting())
        .filter_map(|raw| match normalize_proposal(raw, network) {
            Ok(proposal) => Some(proposal),
            Err(e) => {
                warn!(network, proposal_id = %raw.id, error = %e, "Skipping malformed proposal");
                None
            }
        })
        .collect()
}

pub fn normalize_proposal(raw: &RawProposal, network: &str) -> Result<Proposal, ProposalParseError> {
    let voting_start = parse_time(raw, "start", raw.voting_start_time.as_deref())?;
    let voting_end = parse_time(raw, "end", raw.voting_end_time.as_deref())?;

    let id = raw
        .id
        .trim()
        .parse::<u64>()
        .map_err(|_| ProposalParseError::InvalidId(raw.id.clone()))?;

    let title = match raw.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => format!("Proposal {}", raw.id),
    };

    // v1 proposals carry a summary where v1beta1 carried a description
    let description = [raw.description.as_deref(), raw.summary.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .unwrap_or(NO_DESCRIPTION)
        .to_string();

    Ok(Proposal {
        id,
        title,
        description,
        status: ProposalStatus::from_code(&raw.status),
        voting_start,
        voting_end,
        network: network.to_string(),
    })
}

fn parse_time(
    raw: &RawProposal,
    field: &'static str,
    value: Option<&str>,
) -> Result<DateTime<Utc>, ProposalParseError> {
    let value = value.unwrap_or_default();
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ProposalParseError::InvalidTimestamp {
            id: raw.id.clone(),
            field,
            value: value.to_string(),
        })
}
