// MIT License - Copyright (c) 2026 Peter Wright
// Walk the account's location/device/zone listing into the device tree

use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::constants::{PANEL_TYPE_MARKER, SKIPPED_DEVICES, VALID_DEVICES};
use crate::devices::{sanitize_name, DeviceTree, Panel, Zone};
use crate::error::{BridgeError, Result};
use crate::hub::Hub;
use crate::upstream::{DeviceInfo, UpstreamClient};

/// Whether discovery runs for the first time or refreshes a live tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    Initial,
    Refresh,
}

/// What a discovery pass added to the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub locations: usize,
    pub panels_added: usize,
    pub zones_added: usize,
    pub zones_skipped: usize,
}

/// How a device from the upstream listing is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Known non-security accessory, ignored silently.
    Accessory,
    SecurityPanel,
    /// Anything else; logged and skipped.
    Unsupported,
}

impl DeviceClass {
    pub fn of(device: &DeviceInfo) -> Self {
        let lowered = device.device_name.to_lowercase();
        if SKIPPED_DEVICES.contains(&lowered.as_str()) {
            return Self::Accessory;
        }
        let allow_listed = VALID_DEVICES.contains(&device.device_name.as_str());
        let has_marker = device
            .device_flags
            .as_deref()
            .is_some_and(|flags| flags.contains(PANEL_TYPE_MARKER));
        if allow_listed || has_marker {
            Self::SecurityPanel
        } else {
            Self::Unsupported
        }
    }
}

/// Builds and refreshes the device tree from the upstream listing.
pub struct DiscoveryEngine<'a> {
    config: &'a BridgeConfig,
    upstream: &'a dyn UpstreamClient,
    hub: &'a dyn Hub,
}

impl<'a> DiscoveryEngine<'a> {
    pub fn new(config: &'a BridgeConfig, upstream: &'a dyn UpstreamClient, hub: &'a dyn Hub) -> Self {
        Self {
            config,
            upstream,
            hub,
        }
    }

    /// Reconcile the upstream listing into `tree`.
    ///
    /// Authentication happens before the tree is touched. Any later failure
    /// aborts the pass but keeps whatever was already reconciled. Existing
    /// entities are never duplicated or removed.
    pub async fn discover(&self, tree: &mut DeviceTree, mode: DiscoveryMode) -> Result<DiscoveryReport> {
        debug!("Starting discovery ({:?})", mode);

        self.upstream
            .authenticate()
            .await
            .map_err(BridgeError::Authentication)?;

        let locations = self.upstream.list_locations().await?;
        let mut report = DiscoveryReport {
            locations: locations.len(),
            ..DiscoveryReport::default()
        };

        for location in &locations {
            let loc_name = sanitize_name(&location.location_name);
            debug!(
                "Adding devices for location {} with name {}",
                location.location_id, loc_name
            );

            let devices = match location.devices.as_deref() {
                Some(devices) if !devices.is_empty() => devices,
                _ => {
                    return Err(BridgeError::DiscoveryFailed {
                        reason: format!(
                            "no devices were found for location {} - {}",
                            loc_name, location.location_id
                        ),
                    });
                }
            };

            for device in devices {
                debug!("Found device {} in location {}", device.device_name, loc_name);
                match DeviceClass::of(device) {
                    DeviceClass::Accessory => continue,
                    DeviceClass::SecurityPanel => {
                        self.add_security_device(tree, location.location_id, &loc_name, device, mode, &mut report)
                            .await?;
                    }
                    DeviceClass::Unsupported => {
                        warn!(
                            "Device {} in location {} is not a valid security device",
                            device.device_name, loc_name
                        );
                    }
                }
            }
        }

        info!(
            "Discovery complete: {} locations, {} panels added, {} zones added, {} zones skipped",
            report.locations, report.panels_added, report.zones_added, report.zones_skipped
        );
        Ok(report)
    }

    async fn add_security_device(
        &self,
        tree: &mut DeviceTree,
        location_id: i64,
        loc_name: &str,
        device: &DeviceInfo,
        mode: DiscoveryMode,
        report: &mut DiscoveryReport,
    ) -> Result<()> {
        let update = mode == DiscoveryMode::Refresh;
        let candidate = Panel::from_device(device, location_id, loc_name, self.config.allow_disarming);
        debug!(
            "Adding security device {} with name {} for location {}",
            candidate.address, candidate.name, loc_name
        );

        let location = tree.location_or_insert(location_id, loc_name);
        let (panel, inserted) = location.panel_or_insert(candidate);
        if inserted {
            self.hub.add_node(&panel.node_info(), update).await;
            report.panels_added += 1;
        }

        let status = self
            .upstream
            .get_extended_panel_status(location_id, device.device_id)
            .await?;
        if !status.is_success() {
            warn!(
                "Unable to get extended panel information, code {} data {}",
                status.result_code, status.result_data
            );
            return Ok(());
        }

        debug!("Getting zones for panel {}", panel.address);
        let Some(zones) = status.zones.as_deref() else {
            return Err(BridgeError::DiscoveryFailed {
                reason: format!("no zones were found for {} - {}", panel.name, panel.address),
            });
        };

        for info in zones {
            if !info.can_be_bypassed && !self.config.include_non_bypassable_zones {
                debug!("Skipping zone {} with name {}", info.zone_id, info.description);
                report.zones_skipped += 1;
                continue;
            }
            let zone = Zone::from_info(info, location_id, loc_name, device.device_id, &panel.address);
            let node = zone.node_info();
            if panel.insert_zone(zone) {
                debug!("Adding zone {} with name {} for location {}", node.address, node.name, loc_name);
                self.hub.add_node(&node, update).await;
                report.zones_added += 1;
            }
        }
        Ok(())
    }
}
