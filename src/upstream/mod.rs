// MIT License - Copyright (c) 2026 Peter Wright
// Capability boundary towards the Total Connect cloud API

pub mod replay;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::RESULT_SUCCESS;
use crate::error::UpstreamError;

pub use replay::{AccountSnapshot, ReplayUpstream};

/// One location under the account, with its basic device listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub location_id: i64,
    pub location_name: String,
    /// `None` when the upstream listing carried no device list at all.
    #[serde(default)]
    pub devices: Option<Vec<DeviceInfo>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_id: i64,
    pub device_name: String,
    #[serde(default)]
    pub device_flags: Option<String>,
}

/// Live panel status returned by the metadata query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelMetadata {
    pub arming_state: i64,
    #[serde(default)]
    pub low_battery: bool,
    #[serde(default)]
    pub ac_loss: bool,
    #[serde(default)]
    pub cover_tampered: bool,
}

/// Extended panel status, including per-zone detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedPanelStatus {
    pub result_code: i32,
    #[serde(default)]
    pub result_data: String,
    #[serde(default)]
    pub zones: Option<Vec<ZoneInfo>>,
}

impl ExtendedPanelStatus {
    pub fn is_success(&self) -> bool {
        self.result_code == RESULT_SUCCESS
    }

    pub fn zone(&self, zone_id: u32) -> Option<&ZoneInfo> {
        self.zones.as_deref()?.iter().find(|z| z.zone_id == zone_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    pub zone_id: u32,
    pub description: String,
    pub can_be_bypassed: bool,
    /// Raw zone status bitmask, see [`ZoneStatusFlags`](crate::devices::ZoneStatusFlags).
    #[serde(default)]
    pub status: u32,
}

/// Everything the engine needs from the vendor API.
///
/// The implementation owns the session handle. Every call may fail and the
/// engine treats each one as fallible.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Establish a fresh session.
    async fn authenticate(&self) -> Result<(), UpstreamError>;

    /// Validate (and if needed refresh) the current session.
    async fn keep_alive(&self) -> Result<(), UpstreamError>;

    async fn list_locations(&self) -> Result<Vec<LocationInfo>, UpstreamError>;

    async fn get_panel_metadata(&self, location_id: i64) -> Result<PanelMetadata, UpstreamError>;

    async fn get_extended_panel_status(
        &self,
        location_id: i64,
        device_id: i64,
    ) -> Result<ExtendedPanelStatus, UpstreamError>;

    async fn arm_stay(&self, location_id: i64) -> Result<(), UpstreamError>;

    async fn arm_stay_night(&self, location_id: i64) -> Result<(), UpstreamError>;

    async fn arm_away(&self, location_id: i64) -> Result<(), UpstreamError>;

    async fn disarm(&self, location_id: i64) -> Result<(), UpstreamError>;
}
