//! Govwatch core
//!
//! Polls Cosmos SDK chains for governance proposals in their voting period and
//! alerts configured channels ahead of voting start and end.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod ledger;
pub mod monitor;
pub mod notify;
pub mod proposal;
pub mod source;

pub use config::{AlertThresholds, Config, LogFormat};
pub use error::{ConfigError, DeliveryError, MonitorError, ProposalParseError, SourceError};
pub use evaluator::{compose, evaluate, AlertKind, DueAlert};
pub use ledger::{AlertKey, AlertLedger};
pub use monitor::{Clock, CycleReport, MonitorLoop, MonitorState, SystemClock};
pub use notify::{AlertMessage, ChannelResult, NotificationChannel, Notifier};
pub use proposal::{NetworkDescriptor, Proposal, ProposalStatus};
pub use source::{CosmosGovClient, ProposalSource};
