// MIT License - Copyright (c) 2026 Peter Wright
// Security panels and their live status

use crate::constants::{driver, uom, PANEL_ADDRESS_PREFIX};
use crate::hub::{DriverValue, NodeInfo, NodeKind};
use crate::status::ArmStatus;
use crate::upstream::{DeviceInfo, PanelMetadata};

use super::sanitize_name;
use super::zone::Zone;

/// Build a panel address from the upstream device id.
///
/// The address is the hub's identity for the panel and must stay stable
/// across restarts.
pub fn panel_address(device_id: i64) -> String {
    format!("{PANEL_ADDRESS_PREFIX}{device_id}")
}

/// A security panel in the device tree.
#[derive(Debug, Clone)]
pub struct Panel {
    pub address: String,
    pub name: String,
    pub device_id: i64,
    pub location_id: i64,
    pub location_name: String,
    pub allow_disarming: bool,
    pub zones: Vec<Zone>,
    pub last_known_status: ArmStatus,
    pub last_known_low_battery: bool,
    pub last_known_ac_loss: bool,
}

impl Panel {
    pub fn from_device(
        device: &DeviceInfo,
        location_id: i64,
        location_name: &str,
        allow_disarming: bool,
    ) -> Self {
        Self {
            address: panel_address(device.device_id),
            name: format!("{location_name} - {}", sanitize_name(&device.device_name)),
            device_id: device.device_id,
            location_id,
            location_name: location_name.to_string(),
            allow_disarming,
            zones: Vec::new(),
            last_known_status: ArmStatus::Unknown,
            last_known_low_battery: false,
            last_known_ac_loss: false,
        }
    }

    /// Add a zone unless one with the same address exists. Returns whether
    /// the zone was added.
    pub fn insert_zone(&mut self, zone: Zone) -> bool {
        if self.zones.iter().any(|z| z.address == zone.address) {
            return false;
        }
        self.zones.push(zone);
        true
    }

    /// Apply freshly fetched panel metadata. Returns the new arming status.
    pub fn update_status(&mut self, meta: &PanelMetadata) -> ArmStatus {
        self.last_known_status = ArmStatus::from_code(meta.arming_state);
        self.last_known_low_battery = meta.low_battery;
        self.last_known_ac_loss = meta.ac_loss;
        self.last_known_status
    }

    /// Record a failed query; battery and AC-loss keep their prior values.
    pub fn mark_unknown(&mut self) {
        self.last_known_status = ArmStatus::Unknown;
    }

    pub fn drivers(&self) -> Vec<DriverValue> {
        vec![
            DriverValue::new(driver::GV0, self.last_known_status.driver_value(), uom::INDEX),
            DriverValue::flag(driver::GV1, self.last_known_low_battery),
            DriverValue::flag(driver::GV2, self.last_known_ac_loss),
        ]
    }

    pub fn node_info(&self) -> NodeInfo {
        NodeInfo {
            address: self.address.clone(),
            name: self.name.clone(),
            parent: None,
            kind: NodeKind::Panel,
        }
    }
}
