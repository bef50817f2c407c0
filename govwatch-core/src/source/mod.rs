use crate::error::{ConfigError, SourceError};
use crate::proposal::{NetworkDescriptor, Proposal};
use tracing::debug;

pub mod cosmos;

pub use cosmos::CosmosGovClient;

/// Where the proposals of one network come from.
#[async_trait::async_trait]
pub trait ProposalSource: Send + Sync {
    fn descriptor(&self) -> &NetworkDescriptor;

    /// Proposals currently in their voting period. Empty when nothing is being voted on.
    async fn fetch_active_proposals(&self) -> Result<Vec<Proposal>, SourceError>;
}

/// One Cosmos REST client per configured network.
pub fn create_sources(
    networks: &[NetworkDescriptor],
) -> Result<Vec<Box<dyn ProposalSource>>, ConfigError> {
    networks
        .iter()
        .map(|network| {
            debug!(network = %network.key, endpoint = %network.endpoint, "Creating proposal source");
            let client = CosmosGovClient::new(network.clone())?;
            Ok(Box::new(client) as Box<dyn ProposalSource>)
        })
        .collect()
}
