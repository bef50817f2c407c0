use thiserror::Error;

/// Startup failures: the only errors that stop the process.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config validation failed: {0}")]
    Invalid(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Batch-level failure of a proposal source. The network is skipped for this cycle.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to fetch proposals: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    Status(u16),
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("invalid proposal: {0}")]
    Proposal(#[from] ProposalParseError),
}

/// A single malformed proposal. Siblings in the same batch are unaffected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProposalParseError {
    #[error("failed to parse proposal ID {0:?}")]
    InvalidId(String),
    #[error("failed to parse voting {field} time {value:?} for proposal {id}")]
    InvalidTimestamp {
        id: String,
        field: &'static str,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status code {status}: {body}")]
    Status { status: u16, body: String },
    #[error("rejected by API: {0}")]
    Rejected(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum MonitorError {
    #[error("monitor was already started")]
    AlreadyStarted,
}
