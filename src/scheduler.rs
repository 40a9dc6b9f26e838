// MIT License - Copyright (c) 2026 Peter Wright
// Dual-cadence polling of the device tree

use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, error, info};

use crate::constants::CONTROLLER_ADDRESS;
use crate::devices::DeviceTree;
use crate::error::{BridgeError, Result};
use crate::hub::controller_drivers;
use crate::sync::{SyncContext, SyncOutcome, Syncable};
use crate::upstream::UpstreamClient;

/// Fixed pause after every entity query, keeping a pass over N entities at
/// or above N x delay.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn pace(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

/// Periodic re-authentication, run from the slow cadence once due.
#[derive(Debug, Clone)]
pub struct ReauthJob {
    interval: Duration,
    /// `None` when the interval reaches past what `Instant` can represent.
    next_due: Option<Instant>,
}

impl ReauthJob {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: Instant::now().checked_add(interval),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Run the job if it is due. Returns `None` when nothing ran.
    ///
    /// The job stays on schedule after a failure; the keep-alive made before
    /// every entity query covers the gap.
    pub async fn run_pending(&mut self, upstream: &dyn UpstreamClient) -> Option<Result<()>> {
        let now = Instant::now();
        if !self.is_due(now) {
            return None;
        }
        self.next_due = now.checked_add(self.interval);

        info!("Re-authenticating");
        Some(upstream.authenticate().await.map_err(BridgeError::Authentication))
    }
}

/// Counts for one polling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub queried: usize,
    pub fallbacks: usize,
}

impl PassReport {
    fn record(&mut self, outcome: SyncOutcome) {
        self.queried += 1;
        if outcome == SyncOutcome::Fallback {
            self.fallbacks += 1;
        }
    }
}

/// Drives the fast (panels) and slow (re-auth + zones) cadences.
///
/// Entities are queried one at a time. One entity failing never stops the
/// rest of the pass.
#[derive(Debug, Clone)]
pub struct PollScheduler {
    pacer: Pacer,
    reauth: ReauthJob,
}

impl PollScheduler {
    pub fn new(query_delay: Duration, reauth_interval: Duration) -> Self {
        Self {
            pacer: Pacer::new(query_delay),
            reauth: ReauthJob::new(reauth_interval),
        }
    }

    pub fn pacer(&self) -> Pacer {
        self.pacer
    }

    pub fn reauth(&self) -> &ReauthJob {
        &self.reauth
    }

    /// Apply new settings. The re-auth schedule only restarts when its
    /// interval actually changed.
    pub fn reconfigure(&mut self, query_delay: Duration, reauth_interval: Duration) {
        self.pacer = Pacer::new(query_delay);
        if self.reauth.interval() != reauth_interval {
            debug!("Re-auth interval changed to {:?}", reauth_interval);
            self.reauth = ReauthJob::new(reauth_interval);
        }
    }

    async fn pass<'t, S: Syncable + 't>(
        &self,
        entities: impl Iterator<Item = &'t mut S> + Send,
        ctx: SyncContext<'_>,
    ) -> PassReport {
        let mut report = PassReport::default();
        for entity in entities {
            report.record(entity.sync(ctx).await);
            self.pacer.pace().await;
        }
        report
    }

    /// Fast cadence: every panel, nothing else.
    pub async fn short_poll(&self, tree: &mut DeviceTree, ctx: SyncContext<'_>) -> PassReport {
        let report = self.pass(tree.panels_mut(), ctx).await;
        debug!("Short poll: {:?}", report);
        report
    }

    /// Slow cadence: the re-auth job if due, then every zone.
    pub async fn long_poll(&mut self, tree: &mut DeviceTree, ctx: SyncContext<'_>) -> PassReport {
        match self.reauth.run_pending(ctx.upstream).await {
            Some(Ok(())) => debug!("Re-authenticated"),
            Some(Err(e)) => error!("Could not re-authenticate: {}", e),
            None => {}
        }
        let report = self.pass(tree.zones_mut(), ctx).await;
        debug!("Long poll: {:?}", report);
        report
    }

    /// Manual full query: each panel followed by its zones, then the
    /// controller's own drivers.
    pub async fn query_all(&self, tree: &mut DeviceTree, ctx: SyncContext<'_>, online: bool) -> PassReport {
        let mut report = PassReport::default();
        for panel in tree.panels_mut() {
            report.record(panel.sync(ctx).await);
            self.pacer.pace().await;
            for zone in &mut panel.zones {
                report.record(zone.sync(ctx).await);
                self.pacer.pace().await;
            }
        }
        ctx.hub
            .publish_drivers(CONTROLLER_ADDRESS, &controller_drivers(online))
            .await;
        info!(
            "Query complete: {} entities, {} failed",
            report.queried, report.fallbacks
        );
        report
    }
}
