// Govwatch CLI - governance proposal alerts for Cosmos networks

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use govwatch_core::config::DEFAULT_CONFIG_PATH;
use govwatch_core::{Config, CosmosGovClient, CycleReport, LogFormat, MonitorLoop, Notifier};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "govwatch")]
#[command(about = "Monitors governance proposals on Cosmos networks and alerts before voting starts or ends", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "GOVWATCH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, env = "GOVWATCH_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Monitor all configured networks until interrupted (default)
    Run,

    /// Run a single monitoring cycle and print what it did
    Check {
        /// Evaluate and log alerts without delivering them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show one proposal from a configured network
    Proposal {
        /// Network key from the config file (e.g. bbn-1)
        #[arg(long)]
        network: String,

        /// Proposal ID
        #[arg(long)]
        id: u64,
    },

    /// Validate the configuration file and exit
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()));

    let level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().and_then(|c| c.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let format = loaded
        .as_ref()
        .map(|c| c.logging.format)
        .unwrap_or_default();
    init_tracing(&level, format)?;

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return Err(e);
        }
    };
    info!("Configuration loaded successfully");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::Check { dry_run } => check(config, dry_run).await,
        Commands::Proposal { network, id } => show_proposal(&config, &network, id).await,
        Commands::Validate => {
            println!("✓ Configuration is valid");
            println!("  Monitoring {} networks:", config.networks.len());
            for network in config.network_descriptors() {
                println!("    - {}: {}", network.key, network);
            }
            Ok(())
        }
    }
}

fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let level: tracing::Level = level
        .parse()
        .map_err(|_| anyhow!("invalid log level: {}", level))?;
    let level = level.to_string().to_lowercase();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("govwatch={0},govwatch_core={0}", level))
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Full => builder.init(),
        LogFormat::Compact => builder.compact().init(),
    }
    Ok(())
}

async fn run(config: Config) -> Result<()> {
    info!("Monitoring {} networks", config.networks.len());
    for network in config.network_descriptors() {
        info!("  - {} ({})", network.key, network.name);
    }

    let monitor = Arc::new(MonitorLoop::from_config(&config).context("failed to create service")?);

    for result in monitor.notifier().verify_all().await {
        if let Some(e) = result.error() {
            warn!(channel = %result.channel, error = %e, "Channel credentials could not be verified");
        }
    }
    let cancel = CancellationToken::new();

    let handle = tokio::spawn({
        let monitor = monitor.clone();
        let cancel = cancel.clone();
        async move { monitor.start(cancel).await }
    });

    info!("Service started. Press Ctrl+C to stop.");

    shutdown_signal().await?;
    monitor.stop();
    cancel.cancel();

    handle.await.context("monitor task failed")??;
    info!("Service stopped gracefully");
    Ok(())
}

async fn check(config: Config, dry_run: bool) -> Result<()> {
    let mut monitor = MonitorLoop::from_config(&config).context("failed to create service")?;
    if dry_run {
        info!("Dry run: alerts will be logged, not delivered");
        monitor = monitor.with_notifier(Notifier::empty());
    }

    let report = monitor.run_cycle(&CancellationToken::new()).await;
    println!("\n{}", format_report(&report));
    Ok(())
}

fn format_report(report: &CycleReport) -> String {
    let mut lines = vec![
        "Cycle report:".to_string(),
        format!("  Networks checked:   {}", report.networks_checked),
        format!("  Network failures:   {}", report.network_failures),
        format!("  Voting proposals:   {}", report.proposals_seen),
        format!("  Alerts due:         {}", report.alerts_due),
        format!("  Alerts sent:        {}", report.alerts_sent),
        format!("  Already delivered:  {}", report.alerts_suppressed),
        format!("  Delivery failures:  {}", report.delivery_failures),
    ];
    if report.cancelled {
        lines.push("  (cycle was cancelled before all networks were checked)".to_string());
    }
    lines.join("\n")
}

async fn show_proposal(config: &Config, network_key: &str, id: u64) -> Result<()> {
    let network = config
        .network_descriptors()
        .into_iter()
        .find(|n| n.key == network_key)
        .ok_or_else(|| anyhow!("unknown network: {}", network_key))?;

    let client = CosmosGovClient::new(network.clone())?;
    let proposal = client
        .fetch_proposal(id)
        .await
        .with_context(|| format!("failed to fetch proposal {} on {}", id, network.key))?;

    println!("\n📋 Proposal {}: {}", proposal.id, proposal.title);
    println!("  Network:  {}", network);
    println!("  Status:   {}", proposal.status);
    println!(
        "  Voting:   {} → {}",
        proposal.voting_start.format("%Y-%m-%d %H:%M:%S UTC"),
        proposal.voting_end.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(link) = network.proposal_link(proposal.id) {
        println!("  Explorer: {}", link);
    }
    println!("\n{}", proposal.description);
    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    info!("Signal received - starting graceful shutdown...");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_run() {
        let cli = Cli::try_parse_from(["govwatch"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_check_dry_run() {
        let cli = Cli::try_parse_from(["govwatch", "-c", "alerts.toml", "check", "--dry-run"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("alerts.toml"));
        assert_eq!(cli.command, Some(Commands::Check { dry_run: true }));
    }

    #[test]
    fn test_report_lists_every_counter() {
        let report = CycleReport {
            networks_checked: 2,
            alerts_due: 3,
            alerts_sent: 1,
            alerts_suppressed: 2,
            ..Default::default()
        };
        let text = format_report(&report);
        assert!(text.contains("Alerts sent:        1"));
        assert!(text.contains("Already delivered:  2"));
        assert!(!text.contains("cancelled"));

        let cancelled = CycleReport {
            cancelled: true,
            ..Default::default()
        };
        assert!(format_report(&cancelled).contains("cycle was cancelled"));
    }

    #[test]
    fn test_proposal_arguments() {
        let cli = Cli::try_parse_from([
            "govwatch", "--log-level", "debug", "proposal", "--network", "bbn-1", "--id", "12",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(
            cli.command,
            Some(Commands::Proposal {
                network: "bbn-1".to_string(),
                id: 12
            })
        );

        assert!(Cli::try_parse_from(["govwatch", "proposal", "--network", "bbn-1", "--id", "x"]).is_err());
    }
}
