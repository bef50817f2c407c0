//! Periodic monitoring loop
//!
//! Ticks on a fixed interval and, on every tick, walks all configured networks:
//! fetch the voting proposals, evaluate their boundaries, and hand due alerts to
//! the notifier. Failures stay inside the network, proposal or channel they
//! happened in; nothing raised during a cycle ends the loop.

use crate::config::{AlertThresholds, Config, MAX_CHECK_INTERVAL_MINUTES};
use crate::error::{ConfigError, MonitorError};
use crate::evaluator::{compose, evaluate};
use crate::ledger::{AlertKey, AlertLedger};
use crate::notify::{delivered, first_failure, truncate, AlertMessage, Notifier};
use crate::proposal::{NetworkDescriptor, Proposal};
use crate::source::{create_sources, ProposalSource};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const STARTUP_TITLE: &str = "🚀 Governance Alerts Service Started";

/// Source of the current time for a cycle.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

/// What happened during one cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub networks_checked: usize,
    pub network_failures: usize,
    pub proposals_seen: usize,
    pub alerts_due: usize,
    pub alerts_sent: usize,
    pub alerts_suppressed: usize,
    /// Alerts where at least one channel failed.
    pub delivery_failures: usize,
    /// The cycle was cut short by a stop request.
    pub cancelled: bool,
}

pub struct MonitorLoop {
    thresholds: AlertThresholds,
    sources: Vec<Box<dyn ProposalSource>>,
    notifier: Notifier,
    clock: Box<dyn Clock>,
    ledger: Mutex<AlertLedger>,
    state: watch::Sender<MonitorState>,
    shutdown: CancellationToken,
}

impl MonitorLoop {
    pub fn new(
        thresholds: AlertThresholds,
        sources: Vec<Box<dyn ProposalSource>>,
        notifier: Notifier,
    ) -> Self {
        let (state, _) = watch::channel(MonitorState::Idle);
        Self {
            thresholds,
            sources,
            notifier,
            clock: Box::new(SystemClock),
            ledger: Mutex::new(AlertLedger::new()),
            state,
            shutdown: CancellationToken::new(),
        }
    }

    /// Cosmos REST sources for every network and channels for every enabled sink.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let sources = create_sources(&config.network_descriptors())?;
        let notifier = Notifier::from_config(&config.notifications)?;
        Ok(Self::new(config.alerts.clone(), sources, notifier))
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn state(&self) -> MonitorState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.subscribe()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Time between cycle starts, kept within what the timer can represent.
    pub fn check_period(&self) -> Duration {
        let minutes = self
            .thresholds
            .check_interval_minutes
            .clamp(1, MAX_CHECK_INTERVAL_MINUTES);
        Duration::from_secs(minutes * 60)
    }

    pub fn networks(&self) -> impl Iterator<Item = &NetworkDescriptor> {
        self.sources.iter().map(|source| source.descriptor())
    }

    /// Ask a running loop to finish. Safe to call any number of times.
    pub fn stop(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Stop requested");
        }
        self.shutdown.cancel();
    }

    /// Run until `cancel` fires or `stop` is called.
    ///
    /// Sends the startup notice when configured, runs one cycle immediately and
    /// then one per `check_interval_minutes`. A slow cycle delays the next tick
    /// instead of overlapping with it.
    pub async fn start(&self, cancel: CancellationToken) -> Result<(), MonitorError> {
        let mut claimed = false;
        self.state.send_if_modified(|state| {
            if *state == MonitorState::Idle {
                *state = MonitorState::Running;
                claimed = true;
            }
            claimed
        });
        if !claimed {
            return Err(MonitorError::AlreadyStarted);
        }

        info!(
            networks = self.sources.len(),
            channels = ?self.notifier.channel_names(),
            interval_minutes = self.thresholds.check_interval_minutes,
            "Starting governance monitor"
        );

        if self.thresholds.notify_on_startup && !self.is_stopping(&cancel) {
            self.send_startup_notification().await;
        }

        let mut ticker = tokio::time::interval(self.check_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Cancellation received");
                    break;
                }
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.run_cycle(&cancel).await;
                }
            }
        }

        drop(ticker);
        self.state.send_replace(MonitorState::Stopped);
        info!("Governance monitor stopped");
        Ok(())
    }

    /// One pass over every network at the clock's current time.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> CycleReport {
        let now = self.clock.now();
        let mut report = CycleReport::default();
        info!(at = %now.to_rfc3339(), "Checking proposals");

        if self.thresholds.deduplicate {
            let evicted = self.ledger.lock().await.evict_passed(now);
            if evicted > 0 {
                debug!(evicted, "Dropped alerts for passed boundaries");
            }
        }

        for source in &self.sources {
            if self.is_stopping(cancel) {
                report.cancelled = true;
                break;
            }

            let network = source.descriptor();
            report.networks_checked += 1;

            let proposals = match source.fetch_active_proposals().await {
                Ok(proposals) => proposals,
                Err(e) => {
                    report.network_failures += 1;
                    error!(network = %network.key, error = %e, "Error checking proposals");
                    continue;
                }
            };

            if proposals.is_empty() {
                info!(network = %network.key, "No active proposals found");
                continue;
            }

            info!(network = %network.key, count = proposals.len(), "Found active proposals");
            report.proposals_seen += proposals.len();

            for proposal in &proposals {
                self.check_proposal(proposal, network, now, &mut report).await;
            }
        }

        info!(
            networks = report.networks_checked,
            network_failures = report.network_failures,
            proposals = report.proposals_seen,
            due = report.alerts_due,
            sent = report.alerts_sent,
            suppressed = report.alerts_suppressed,
            delivery_failures = report.delivery_failures,
            "Cycle complete"
        );
        report
    }

    async fn check_proposal(
        &self,
        proposal: &Proposal,
        network: &NetworkDescriptor,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) {
        debug!(
            network = %network.key,
            proposal_id = proposal.id,
            title = %proposal.title,
            description = %truncate(&proposal.description, 100),
            voting_start = %proposal.voting_start,
            voting_end = %proposal.voting_end,
            "Evaluating proposal"
        );

        for due in evaluate(proposal, now, &self.thresholds) {
            report.alerts_due += 1;
            let key = AlertKey::new(&network.key, proposal.id, due.kind);

            if self.thresholds.deduplicate
                && self.ledger.lock().await.already_sent(&key, due.boundary)
            {
                report.alerts_suppressed += 1;
                debug!(
                    network = %network.key,
                    proposal_id = proposal.id,
                    kind = %due.kind,
                    "Alert already delivered"
                );
                continue;
            }

            let message = compose(proposal, &due, network);
            let results = self.notifier.send_all(&message).await;

            if let Some(failure) = first_failure(&results) {
                report.delivery_failures += 1;
                if let Some(e) = failure.error() {
                    warn!(
                        network = %network.key,
                        proposal_id = proposal.id,
                        kind = %due.kind,
                        channel = %failure.channel,
                        error = %e,
                        "Failed to send notification"
                    );
                }
            }

            if delivered(&results) {
                report.alerts_sent += 1;
                info!(
                    network = %network.key,
                    proposal_id = proposal.id,
                    kind = %due.kind,
                    hours_until = due.hours_until,
                    "Sent notification"
                );
                if self.thresholds.deduplicate {
                    self.ledger.lock().await.record(key, due.boundary);
                }
            }
        }
    }

    async fn send_startup_notification(&self) {
        let message = startup_message(self.networks());
        let results = self.notifier.send_all(&message).await;

        if let Some(failure) = first_failure(&results) {
            if let Some(e) = failure.error() {
                warn!(channel = %failure.channel, error = %e, "Failed to send startup notification");
            }
        }
    }

    fn is_stopping(&self, cancel: &CancellationToken) -> bool {
        cancel.is_cancelled() || self.shutdown.is_cancelled()
    }
}

fn startup_message<'a>(networks: impl Iterator<Item = &'a NetworkDescriptor>) -> AlertMessage {
    let lines: Vec<String> = networks.map(|network| format!("• {}", network)).collect();
    AlertMessage::service(
        STARTUP_TITLE,
        format!(
            "Service is now monitoring {} networks:\n{}",
            lines.len(),
            lines.join("\n")
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::evaluator::AlertKind;
    use crate::notify::testing::RecordingChannel;
    use crate::proposal::ProposalStatus;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct FakeSource {
        network: NetworkDescriptor,
        proposals: Vec<Proposal>,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn new(network: NetworkDescriptor, proposals: Vec<Proposal>) -> Self {
            Self {
                network,
                proposals,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(network: NetworkDescriptor) -> Self {
            Self {
                fail: true,
                ..Self::new(network, Vec::new())
            }
        }
    }

    #[async_trait::async_trait]
    impl ProposalSource for FakeSource {
        fn descriptor(&self) -> &NetworkDescriptor {
            &self.network
        }

        async fn fetch_active_proposals(&self) -> Result<Vec<Proposal>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SourceError::Status(503));
            }
            Ok(self.proposals.clone())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn network(key: &str, name: &str) -> NetworkDescriptor {
        NetworkDescriptor {
            key: key.to_string(),
            name: name.to_string(),
            endpoint: format!("https://{}.example", key),
            chain_id: key.to_string(),
            explorer_url: None,
        }
    }

    fn proposal(id: u64, network: &str, starts_in_hours: i64) -> Proposal {
        Proposal {
            id,
            title: format!("Proposal {}", id),
            description: "No description available".to_string(),
            status: ProposalStatus::VotingPeriod,
            voting_start: now() + ChronoDuration::hours(starts_in_hours),
            voting_end: now() + ChronoDuration::days(10),
            network: network.to_string(),
        }
    }

    fn thresholds(hours_before_start: u32, deduplicate: bool) -> AlertThresholds {
        AlertThresholds {
            hours_before_start,
            hours_before_end: 24,
            check_interval_minutes: 60,
            notify_on_startup: false,
            deduplicate,
        }
    }

    fn monitor(
        thresholds: AlertThresholds,
        sources: Vec<Box<dyn ProposalSource>>,
        channel: &RecordingChannel,
    ) -> MonitorLoop {
        MonitorLoop::new(thresholds, sources, Notifier::new(vec![Box::new(channel.clone())]))
            .with_clock(FixedClock(now()))
    }

    fn babylon(proposals: Vec<Proposal>) -> Box<dyn ProposalSource> {
        Box::new(FakeSource::new(network("bbn-1", "Babylon Mainnet"), proposals))
    }

    async fn wait_until<F: Fn() -> bool>(condition: F) {
        for _ in 0..300 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_start_soon_alert_generated() {
        let channel = RecordingChannel::new("test", false);
        let monitor = monitor(
            thresholds(24, true),
            vec![babylon(vec![proposal(17, "Babylon Mainnet", 5)])],
            &channel,
        );

        let report = monitor.run_cycle(&CancellationToken::new()).await;

        let sent = channel.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].network, "Babylon Mainnet");
        assert_eq!(sent[0].proposal_id, Some(17));
        assert!(sent[0].title.contains("Starting Soon"));
        assert_eq!(report.alerts_due, 1);
        assert_eq!(report.alerts_sent, 1);
    }

    #[tokio::test]
    async fn test_start_beyond_threshold_not_alerted() {
        let channel = RecordingChannel::new("test", false);
        let monitor = monitor(
            thresholds(4, true),
            vec![babylon(vec![proposal(17, "Babylon Mainnet", 5)])],
            &channel,
        );

        let report = monitor.run_cycle(&CancellationToken::new()).await;

        assert!(channel.messages().is_empty());
        assert_eq!(report.proposals_seen, 1);
        assert_eq!(report.alerts_due, 0);
    }

    #[tokio::test]
    async fn test_failing_network_does_not_block_others() {
        let channel = RecordingChannel::new("test", false);
        let broken = FakeSource::failing(network("cosmoshub-4", "Cosmos Hub"));
        let broken_calls = broken.calls.clone();
        let monitor = monitor(
            thresholds(24, true),
            vec![Box::new(broken), babylon(vec![proposal(3, "Babylon Mainnet", 2)])],
            &channel,
        );

        let report = monitor.run_cycle(&CancellationToken::new()).await;

        assert_eq!(broken_calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.networks_checked, 2);
        assert_eq!(report.network_failures, 1);
        assert_eq!(channel.messages().len(), 1);
        assert_eq!(channel.messages()[0].network, "Babylon Mainnet");
    }

    #[tokio::test]
    async fn test_failed_send_does_not_block_next_proposal() {
        let broken = RecordingChannel::new("broken", true);
        let monitor = MonitorLoop::new(
            thresholds(24, true),
            vec![babylon(vec![
                proposal(1, "Babylon Mainnet", 2),
                proposal(2, "Babylon Mainnet", 3),
            ])],
            Notifier::new(vec![Box::new(broken.clone())]),
        )
        .with_clock(FixedClock(now()));

        let report = monitor.run_cycle(&CancellationToken::new()).await;

        assert_eq!(broken.attempts(), 2);
        assert_eq!(report.delivery_failures, 2);
        assert_eq!(report.alerts_sent, 0);
    }

    #[tokio::test]
    async fn test_without_dedup_alert_repeats_every_cycle() {
        let channel = RecordingChannel::new("test", false);
        let monitor = monitor(
            thresholds(24, false),
            vec![babylon(vec![proposal(17, "Babylon Mainnet", 5)])],
            &channel,
        );

        monitor.run_cycle(&CancellationToken::new()).await;
        monitor.run_cycle(&CancellationToken::new()).await;

        assert_eq!(channel.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_dedup_sends_once_per_boundary() {
        let channel = RecordingChannel::new("test", false);
        let monitor = monitor(
            thresholds(24, true),
            vec![babylon(vec![proposal(17, "Babylon Mainnet", 5)])],
            &channel,
        );

        monitor.run_cycle(&CancellationToken::new()).await;
        let second = monitor.run_cycle(&CancellationToken::new()).await;

        assert_eq!(channel.messages().len(), 1);
        assert_eq!(second.alerts_due, 1);
        assert_eq!(second.alerts_suppressed, 1);
        assert!(monitor
            .ledger
            .lock()
            .await
            .already_sent(
                &AlertKey::new("bbn-1", 17, AlertKind::StartingSoon),
                now() + ChronoDuration::hours(5)
            ));
    }

    #[tokio::test]
    async fn test_undelivered_alert_is_retried_next_cycle() {
        let broken = RecordingChannel::new("broken", true);
        let monitor = MonitorLoop::new(
            thresholds(24, true),
            vec![babylon(vec![proposal(17, "Babylon Mainnet", 5)])],
            Notifier::new(vec![Box::new(broken.clone())]),
        )
        .with_clock(FixedClock(now()));

        monitor.run_cycle(&CancellationToken::new()).await;
        monitor.run_cycle(&CancellationToken::new()).await;

        assert_eq!(broken.attempts(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_cycle_skips_remaining_networks() {
        let channel = RecordingChannel::new("test", false);
        let monitor = monitor(
            thresholds(24, true),
            vec![babylon(vec![proposal(17, "Babylon Mainnet", 5)])],
            &channel,
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = monitor.run_cycle(&cancel).await;

        assert!(report.cancelled);
        assert_eq!(report.networks_checked, 0);
        assert!(channel.messages().is_empty());
    }

    #[test]
    fn test_startup_message_lists_networks() {
        let networks = [network("bbn-1", "Babylon Mainnet"), network("osmosis-1", "Osmosis")];
        let message = startup_message(networks.iter());

        assert!(message.is_service_level());
        assert_eq!(message.title, STARTUP_TITLE);
        assert_eq!(
            message.body,
            "Service is now monitoring 2 networks:\n• Babylon Mainnet (bbn-1)\n• Osmosis (osmosis-1)"
        );
    }

    #[tokio::test]
    async fn test_start_runs_until_stopped() {
        let channel = RecordingChannel::new("test", false);
        let mut config = thresholds(24, true);
        config.notify_on_startup = true;
        let monitor = Arc::new(monitor(
            config,
            vec![babylon(vec![proposal(17, "Babylon Mainnet", 5)])],
            &channel,
        ));
        assert_eq!(monitor.state(), MonitorState::Idle);

        let handle = tokio::spawn({
            let monitor = monitor.clone();
            async move { monitor.start(CancellationToken::new()).await }
        });

        // Startup notice plus the immediate first cycle
        wait_until(|| channel.messages().len() == 2).await;
        assert_eq!(monitor.state(), MonitorState::Running);
        assert!(channel.messages()[0].is_service_level());
        assert_eq!(channel.messages()[1].proposal_id, Some(17));

        assert_eq!(
            monitor.start(CancellationToken::new()).await,
            Err(MonitorError::AlreadyStarted)
        );

        monitor.stop();
        monitor.stop();
        assert_eq!(handle.await.unwrap(), Ok(()));
        assert_eq!(monitor.state(), MonitorState::Stopped);
    }

    #[tokio::test]
    async fn test_external_cancellation_stops_loop() {
        let channel = RecordingChannel::new("test", false);
        let source = FakeSource::new(network("bbn-1", "Babylon Mainnet"), Vec::new());
        let calls = source.calls.clone();
        let monitor = Arc::new(monitor(thresholds(24, true), vec![Box::new(source)], &channel));
        let cancel = CancellationToken::new();

        let handle = tokio::spawn({
            let monitor = monitor.clone();
            let cancel = cancel.clone();
            async move { monitor.start(cancel).await }
        });

        wait_until(|| calls.load(Ordering::SeqCst) == 1).await;
        cancel.cancel();

        assert_eq!(handle.await.unwrap(), Ok(()));
        assert_eq!(monitor.state(), MonitorState::Stopped);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_check_period_is_clamped() {
        let channel = RecordingChannel::new("test", false);
        let mut config = thresholds(24, true);

        config.check_interval_minutes = 30;
        let regular = monitor(config.clone(), Vec::new(), &channel);
        assert_eq!(regular.check_period(), Duration::from_secs(30 * 60));

        config.check_interval_minutes = 0;
        let zero = monitor(config.clone(), Vec::new(), &channel);
        assert_eq!(zero.check_period(), Duration::from_secs(60));

        config.check_interval_minutes = u64::MAX;
        let huge = monitor(config, Vec::new(), &channel);
        assert_eq!(
            huge.check_period(),
            Duration::from_secs(MAX_CHECK_INTERVAL_MINUTES * 60)
        );
    }

    #[tokio::test]
    async fn test_huge_interval_does_not_kill_loop() {
        let channel = RecordingChannel::new("test", false);
        let source = FakeSource::new(network("bbn-1", "Babylon Mainnet"), Vec::new());
        let calls = source.calls.clone();
        let mut config = thresholds(24, true);
        config.check_interval_minutes = u64::MAX / 30;
        let monitor = Arc::new(monitor(config, vec![Box::new(source)], &channel));
        let cancel = CancellationToken::new();

        let handle = tokio::spawn({
            let monitor = monitor.clone();
            let cancel = cancel.clone();
            async move { monitor.start(cancel).await }
        });

        wait_until(|| calls.load(Ordering::SeqCst) == 1).await;
        cancel.cancel();

        assert_eq!(handle.await.unwrap(), Ok(()));
        assert_eq!(monitor.state(), MonitorState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_repeat_on_interval() {
        let channel = RecordingChannel::new("test", false);
        let source = FakeSource::new(network("bbn-1", "Babylon Mainnet"), Vec::new());
        let calls = source.calls.clone();
        let monitor = Arc::new(monitor(thresholds(24, true), vec![Box::new(source)], &channel));
        let cancel = CancellationToken::new();

        let handle = tokio::spawn({
            let monitor = monitor.clone();
            let cancel = cancel.clone();
            async move { monitor.start(cancel).await }
        });

        // Immediate cycle, then one at 60 and one at 120 minutes
        tokio::time::sleep(Duration::from_secs(121 * 60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), Ok(()));
    }

    /// Records when each fetch started; the first fetch takes `first_fetch`.
    struct SlowFirstSource {
        network: NetworkDescriptor,
        first_fetch: Duration,
        started: Arc<std::sync::Mutex<Vec<Instant>>>,
    }

    #[async_trait::async_trait]
    impl ProposalSource for SlowFirstSource {
        fn descriptor(&self) -> &NetworkDescriptor {
            &self.network
        }

        async fn fetch_active_proposals(&self) -> Result<Vec<Proposal>, SourceError> {
            let first = {
                let mut started = self.started.lock().unwrap();
                started.push(Instant::now());
                started.len() == 1
            };
            if first {
                tokio::time::sleep(self.first_fetch).await;
            }
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_cycle_delays_next_tick() {
        let channel = RecordingChannel::new("test", false);
        let started = Arc::new(std::sync::Mutex::new(Vec::new()));
        let source = SlowFirstSource {
            network: network("bbn-1", "Babylon Mainnet"),
            first_fetch: Duration::from_secs(90 * 60),
            started: started.clone(),
        };
        let monitor = Arc::new(monitor(thresholds(24, true), vec![Box::new(source)], &channel));
        let cancel = CancellationToken::new();
        let base = Instant::now();

        let handle = tokio::spawn({
            let monitor = monitor.clone();
            let cancel = cancel.clone();
            async move { monitor.start(cancel).await }
        });

        tokio::time::sleep(Duration::from_secs(230 * 60)).await;
        cancel.cancel();
        assert_eq!(handle.await.unwrap(), Ok(()));

        // The missed 60 minute tick fires when the slow cycle ends, and the
        // schedule restarts from there instead of bursting to catch up.
        let minutes: Vec<u64> = started
            .lock()
            .unwrap()
            .iter()
            .map(|t| (*t - base).as_secs() / 60)
            .collect();
        assert_eq!(minutes, vec![0, 90, 150, 210]);
    }
}
