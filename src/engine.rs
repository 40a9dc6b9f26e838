// MIT License - Copyright (c) 2026 Peter Wright
// The synchronization engine: owns the device tree and runs the poll loop

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::command::{Command, CommandOutcome, CommandRouter};
use crate::config::BridgeConfig;
use crate::constants::{notice, CONTROLLER_ADDRESS};
use crate::devices::DeviceTree;
use crate::discovery::{DiscoveryEngine, DiscoveryMode, DiscoveryReport};
use crate::error::{BridgeError, Result};
use crate::event::{event_channel, BridgeEvent, EventReceiver, EventSender};
use crate::hub::{controller_drivers, Hub, NodeInfo};
use crate::scheduler::{PassReport, PollScheduler};
use crate::sync::{SyncContext, SyncOutcome};
use crate::upstream::UpstreamClient;

/// Process-level owner of the session, the device tree and the schedules.
///
/// Everything runs on one task: polling passes, commands and discovery are
/// serialized through [`Bridge::run`], so no entity is ever synced twice at
/// the same time and the tree needs no lock.
pub struct Bridge {
    config: BridgeConfig,
    upstream: Arc<dyn UpstreamClient>,
    hub: Arc<dyn Hub>,
    tree: DeviceTree,
    scheduler: PollScheduler,
    started: bool,
    online: bool,
    discovered: bool,
    event_tx: EventSender,
    event_rx: EventReceiver,
}

impl Bridge {
    pub fn new(config: BridgeConfig, upstream: Arc<dyn UpstreamClient>, hub: Arc<dyn Hub>) -> Self {
        let (event_tx, event_rx) = event_channel(64);
        let scheduler = PollScheduler::new(config.query_delay(), config.refresh_auth_interval());
        Self {
            config,
            upstream,
            hub,
            tree: DeviceTree::new(),
            scheduler,
            started: false,
            online: false,
            discovered: false,
            event_tx,
            event_rx,
        }
    }

    /// Sender for commands, discovery and configuration events.
    pub fn handle(&self) -> EventSender {
        self.event_tx.clone()
    }

    pub fn tree(&self) -> &DeviceTree {
        &self.tree
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Register the controller and apply the initial configuration.
    ///
    /// The controller goes online (and every panel is queried once) only
    /// when the configuration carries credentials; otherwise that happens on
    /// the first complete configuration applied later.
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting Total Connect bridge");
        self.started = true;
        self.hub.add_node(&NodeInfo::controller(), false).await;
        let config = self.config.clone();
        self.apply_config(config).await.map(|_| ())
    }

    async fn go_online(&mut self) {
        self.online = true;
        self.hub
            .publish_drivers(CONTROLLER_ADDRESS, &controller_drivers(true))
            .await;
        let report = self.short_poll().await;
        debug!("Initial panel query: {:?}", report);
    }

    /// Replace the configuration and re-run discovery.
    ///
    /// Notices are cleared first. Missing credentials raise a standing notice
    /// and leave the tree untouched until a complete configuration arrives.
    pub async fn apply_config(&mut self, config: BridgeConfig) -> Result<DiscoveryReport> {
        self.hub.clear_notices().await;
        self.scheduler
            .reconfigure(config.query_delay(), config.refresh_auth_interval());
        for panel in self.tree.panels_mut() {
            panel.allow_disarming = config.allow_disarming;
        }
        self.config = config;

        let mode = if self.discovered {
            DiscoveryMode::Refresh
        } else {
            DiscoveryMode::Initial
        };
        let result = self.discover(mode).await;
        if self.started && !self.online && self.config.has_credentials() {
            self.go_online().await;
        }
        result
    }

    /// Run discovery. Failures are logged and surfaced as a notice; entities
    /// reconciled before the failure stay in the tree.
    pub async fn discover(&mut self, mode: DiscoveryMode) -> Result<DiscoveryReport> {
        if let Err(e) = self.config.validate() {
            error!("Cannot discover: {}", e);
            self.hub
                .set_notice(notice::CONFIG, notice::MISSING_CREDENTIALS)
                .await;
            return Err(e);
        }

        let engine = DiscoveryEngine::new(&self.config, self.upstream.as_ref(), self.hub.as_ref());
        match engine.discover(&mut self.tree, mode).await {
            Ok(report) => {
                self.discovered = true;
                Ok(report)
            }
            Err(e) => {
                error!("Discovery failed with error {}", e);
                self.hub
                    .set_notice(notice::DISCOVERY_FAILED, notice::DISCOVERY_FAILED_MSG)
                    .await;
                Err(match e {
                    e @ BridgeError::DiscoveryFailed { .. } => e,
                    other => BridgeError::DiscoveryFailed {
                        reason: other.to_string(),
                    },
                })
            }
        }
    }

    /// Fast cadence pass.
    pub async fn short_poll(&mut self) -> PassReport {
        let ctx = SyncContext {
            upstream: self.upstream.as_ref(),
            hub: self.hub.as_ref(),
        };
        self.scheduler.short_poll(&mut self.tree, ctx).await
    }

    /// Slow cadence pass.
    pub async fn long_poll(&mut self) -> PassReport {
        let ctx = SyncContext {
            upstream: self.upstream.as_ref(),
            hub: self.hub.as_ref(),
        };
        self.scheduler.long_poll(&mut self.tree, ctx).await
    }

    /// Manual full query; doubles as a health check.
    pub async fn query_all(&mut self) -> PassReport {
        let ctx = SyncContext {
            upstream: self.upstream.as_ref(),
            hub: self.hub.as_ref(),
        };
        self.scheduler.query_all(&mut self.tree, ctx, self.online).await
    }

    /// Route one command. Never fails: the outcome is informational.
    pub async fn execute(&mut self, address: &str, command: Command) -> CommandOutcome {
        if address == CONTROLLER_ADDRESS {
            return match command {
                Command::Query => {
                    let report = self.query_all().await;
                    if report.fallbacks == 0 {
                        CommandOutcome::Queried(SyncOutcome::Updated)
                    } else {
                        CommandOutcome::Queried(SyncOutcome::Fallback)
                    }
                }
                Command::Discover => match self.discover(DiscoveryMode::Refresh).await {
                    Ok(_) => CommandOutcome::Sent,
                    Err(_) => CommandOutcome::Failed,
                },
                other => {
                    warn!("Unsupported command {} for {}", other, address);
                    CommandOutcome::Rejected
                }
            };
        }

        let ctx = SyncContext {
            upstream: self.upstream.as_ref(),
            hub: self.hub.as_ref(),
        };
        CommandRouter::execute(&mut self.tree, address, command, ctx).await
    }

    pub async fn handle_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::Command {
                address,
                command,
                params,
            } => {
                if params.is_some() {
                    debug!("Ignoring parameters for {} on {}", command, address);
                }
                let outcome = self.execute(&address, command).await;
                debug!("{} on {}: {:?}", command, address, outcome);
            }
            BridgeEvent::Discover => {
                let _ = self.discover(DiscoveryMode::Refresh).await;
            }
            BridgeEvent::Query => {
                self.query_all().await;
            }
            BridgeEvent::ApplyConfig(config) => {
                let _ = self.apply_config(*config).await;
            }
        }
    }

    fn cadence(period: Duration) -> Interval {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    /// Service both cadences and inbound events until shutdown.
    ///
    /// Polls are skipped while credentials are missing.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let mut periods = (self.config.short_poll(), self.config.long_poll());
        let mut short = Self::cadence(periods.0);
        let mut long = Self::cadence(periods.1);
        info!(
            "Polling every {:?} (panels) and {:?} (zones)",
            periods.0, periods.1
        );

        loop {
            tokio::select! {
                _ = short.tick() => {
                    if self.config.has_credentials() {
                        self.short_poll().await;
                    }
                }
                _ = long.tick() => {
                    if self.config.has_credentials() {
                        self.long_poll().await;
                    }
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event).await;
                    let current = (self.config.short_poll(), self.config.long_poll());
                    if current != periods {
                        periods = current;
                        short = Self::cadence(periods.0);
                        long = Self::cadence(periods.1);
                        info!("Polling intervals changed to {:?} / {:?}", periods.0, periods.1);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Engine shutting down");
                        break;
                    }
                }
            }
        }

        self.online = false;
        self.hub
            .publish_drivers(CONTROLLER_ADDRESS, &controller_drivers(false))
            .await;
    }
}
