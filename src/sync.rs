// MIT License - Copyright (c) 2026 Peter Wright
// Per-entity query-and-publish for panels and zones

use async_trait::async_trait;
use tracing::{debug, error};

use crate::devices::{Panel, Zone};
use crate::error::{BridgeError, UpstreamError};
use crate::hub::Hub;
use crate::session::with_session;
use crate::upstream::{PanelMetadata, UpstreamClient, ZoneInfo};

/// Result of one entity sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fresh values were fetched and published.
    Updated,
    /// The query failed; the unknown value was published instead.
    Fallback,
}

/// Collaborators a sync needs.
#[derive(Clone, Copy)]
pub struct SyncContext<'a> {
    pub upstream: &'a dyn UpstreamClient,
    pub hub: &'a dyn Hub,
}

/// An entity that can refresh itself from the upstream API and report its
/// drivers to the hub.
///
/// A sync never fails: errors are logged with the entity's address and the
/// entity publishes its unknown value. Publishing always happens.
#[async_trait]
pub trait Syncable: Send {
    fn address(&self) -> &str;

    async fn sync(&mut self, ctx: SyncContext<'_>) -> SyncOutcome;
}

async fn fetch_panel(upstream: &dyn UpstreamClient, location_id: i64) -> Result<PanelMetadata, UpstreamError> {
    with_session!(upstream, upstream.get_panel_metadata(location_id))
}

async fn fetch_zone(
    upstream: &dyn UpstreamClient,
    location_id: i64,
    device_id: i64,
    zone_id: u32,
) -> Result<ZoneInfo, UpstreamError> {
    let status = with_session!(upstream, upstream.get_extended_panel_status(location_id, device_id))?;
    if !status.is_success() {
        return Err(UpstreamError::ResultCode {
            code: status.result_code,
            data: status.result_data,
        });
    }
    status
        .zone(zone_id)
        .cloned()
        .ok_or_else(|| UpstreamError::InvalidResponse {
            details: format!("zone {zone_id} missing from extended status"),
        })
}

#[async_trait]
impl Syncable for Panel {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sync(&mut self, ctx: SyncContext<'_>) -> SyncOutcome {
        debug!("Query panel {}", self.address);
        let outcome = match fetch_panel(ctx.upstream, self.location_id).await {
            Ok(meta) => {
                let status = self.update_status(&meta);
                debug!("Panel {} is {}", self.address, status);
                SyncOutcome::Updated
            }
            Err(source) => {
                let err = BridgeError::EntitySync {
                    address: self.address.clone(),
                    source,
                };
                error!("Refreshing panel failed: {}", err);
                self.mark_unknown();
                SyncOutcome::Fallback
            }
        };
        ctx.hub.publish_drivers(&self.address, &self.drivers()).await;
        outcome
    }
}

#[async_trait]
impl Syncable for Zone {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sync(&mut self, ctx: SyncContext<'_>) -> SyncOutcome {
        debug!("Query zone {}", self.address);
        let outcome = match fetch_zone(ctx.upstream, self.location_id, self.device_id, self.zone_id).await {
            Ok(info) => {
                let state = self.update_status(info.status);
                debug!("Zone {} is {:?}", self.address, state);
                SyncOutcome::Updated
            }
            Err(source) => {
                let err = BridgeError::EntitySync {
                    address: self.address.clone(),
                    source,
                };
                error!("Refreshing zone failed: {}", err);
                self.mark_unknown();
                SyncOutcome::Fallback
            }
        };
        ctx.hub.publish_drivers(&self.address, &self.drivers()).await;
        outcome
    }
}
