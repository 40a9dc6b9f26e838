// MIT License - Copyright (c) 2026 Peter Wright
// Zones: individually monitored sensor points attached to a panel

use bitflags::bitflags;

use crate::constants::{driver, uom, ZONE_ADDRESS_PREFIX};
use crate::hub::{DriverValue, NodeInfo, NodeKind};
use crate::upstream::ZoneInfo;

use super::sanitize_name;

bitflags! {
    /// Zone status bitmask reported in the extended panel status.
    ///
    /// A value of 0 means the zone is closed and normal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ZoneStatusFlags: u32 {
        /// Zone is bypassed
        const BYPASSED     = 1 << 0;
        /// Zone is faulted (open)
        const FAULT        = 1 << 1;
        /// Zone reports trouble
        const TROUBLE      = 1 << 3;
        /// Cover tamper
        const TAMPER       = 1 << 4;
        /// Supervision / communication failure
        const COMM_FAILURE = 1 << 5;
        /// Sensor battery low
        const LOW_BATTERY  = 1 << 6;
        /// Zone triggered an alarm
        const TRIGGERED    = 1 << 8;
    }
}

impl ZoneStatusFlags {
    /// Parse the raw bitmask, ignoring bits we do not model.
    pub fn from_raw(raw: u32) -> Self {
        Self::from_bits_truncate(raw)
    }
}

/// Normalized zone state published as the zone's `GV0` driver.
///
/// Tamper is parsed into [`ZoneStatusFlags::TAMPER`] but does not yet
/// influence the published state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneState {
    Normal,
    Faulted,
    Bypassed,
    Trouble,
    Triggered,
    Unknown,
}

impl ZoneState {
    pub fn from_flags(flags: ZoneStatusFlags) -> Self {
        if flags.contains(ZoneStatusFlags::TRIGGERED) {
            Self::Triggered
        } else if flags.contains(ZoneStatusFlags::BYPASSED) {
            Self::Bypassed
        } else if flags.contains(ZoneStatusFlags::FAULT) {
            Self::Faulted
        } else if flags.intersects(ZoneStatusFlags::TROUBLE | ZoneStatusFlags::COMM_FAILURE) {
            Self::Trouble
        } else {
            Self::Normal
        }
    }

    pub fn driver_value(&self) -> i32 {
        match self {
            Self::Normal => 1,
            Self::Faulted => 2,
            Self::Bypassed => 3,
            Self::Trouble => 4,
            Self::Triggered => 5,
            Self::Unknown => 6,
        }
    }
}

/// Build a zone address from the owning device id and the zone id.
pub fn zone_address(device_id: i64, zone_id: u32) -> String {
    format!("{ZONE_ADDRESS_PREFIX}{device_id}_{zone_id}")
}

/// A zone in the device tree.
#[derive(Debug, Clone)]
pub struct Zone {
    pub address: String,
    pub name: String,
    pub zone_id: u32,
    pub device_id: i64,
    pub location_id: i64,
    pub panel_address: String,
    pub can_be_bypassed: bool,
    pub last_known_state: ZoneState,
    pub last_known_low_battery: bool,
}

impl Zone {
    /// Build a zone from the upstream zone listing of a panel.
    pub fn from_info(
        info: &ZoneInfo,
        location_id: i64,
        location_name: &str,
        device_id: i64,
        panel_address: &str,
    ) -> Self {
        Self {
            address: zone_address(device_id, info.zone_id),
            name: sanitize_name(&format!("{location_name} - {}", info.description)),
            zone_id: info.zone_id,
            device_id,
            location_id,
            panel_address: panel_address.to_string(),
            can_be_bypassed: info.can_be_bypassed,
            last_known_state: ZoneState::Unknown,
            last_known_low_battery: false,
        }
    }

    /// Apply a freshly fetched zone status. Returns the new state.
    pub fn update_status(&mut self, raw: u32) -> ZoneState {
        let flags = ZoneStatusFlags::from_raw(raw);
        self.last_known_state = ZoneState::from_flags(flags);
        self.last_known_low_battery = flags.contains(ZoneStatusFlags::LOW_BATTERY);
        self.last_known_state
    }

    /// Record a failed query; the low-battery flag keeps its prior value.
    pub fn mark_unknown(&mut self) {
        self.last_known_state = ZoneState::Unknown;
    }

    pub fn drivers(&self) -> Vec<DriverValue> {
        vec![
            DriverValue::new(driver::GV0, self.last_known_state.driver_value(), uom::INDEX),
            DriverValue::flag(driver::GV1, self.last_known_low_battery),
        ]
    }

    pub fn node_info(&self) -> NodeInfo {
        NodeInfo {
            address: self.address.clone(),
            name: self.name.clone(),
            parent: Some(self.panel_address.clone()),
            kind: NodeKind::Zone,
        }
    }
}
