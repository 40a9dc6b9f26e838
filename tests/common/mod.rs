// MIT License - Copyright (c) 2026 Peter Wright
// Scripted upstream and recording hub shared by the integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use totalconnect_bridge::{
    Bridge, BridgeConfig, DeviceInfo, DriverValue, ExtendedPanelStatus, Hub, LocationInfo,
    NodeInfo, PanelMetadata, UpstreamClient, UpstreamError, ZoneInfo,
};

/// One upstream call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Authenticate,
    KeepAlive,
    ListLocations,
    PanelMetadata(i64),
    ExtendedStatus(i64, i64),
    ArmStay(i64),
    ArmStayNight(i64),
    ArmAway(i64),
    Disarm(i64),
}

impl Call {
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            Call::ArmStay(_) | Call::ArmStayNight(_) | Call::ArmAway(_) | Call::Disarm(_)
        )
    }
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    locations: Vec<LocationInfo>,
    metadata: HashMap<i64, PanelMetadata>,
    extended: HashMap<(i64, i64), ExtendedPanelStatus>,
    failing_metadata: HashSet<i64>,
    failing_extended: HashSet<(i64, i64)>,
    reject_auth: bool,
    fail_commands: bool,
    expire_keep_alives: usize,
}

/// Scripted [`UpstreamClient`]: returns what the test configured and
/// records every call.
#[derive(Default)]
pub struct FakeUpstream {
    state: Mutex<FakeState>,
}

fn transport(what: &str) -> UpstreamError {
    UpstreamError::Transport(format!("{what} unavailable"))
}

impl FakeUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_location(&self, location_id: i64, name: &str, devices: Option<Vec<DeviceInfo>>) {
        self.state.lock().unwrap().locations.push(LocationInfo {
            location_id,
            location_name: name.to_string(),
            devices,
        });
    }

    pub fn set_metadata(&self, location_id: i64, arming_state: i64) {
        self.state.lock().unwrap().metadata.insert(
            location_id,
            PanelMetadata {
                arming_state,
                ..PanelMetadata::default()
            },
        );
    }

    pub fn set_metadata_full(&self, location_id: i64, meta: PanelMetadata) {
        self.state.lock().unwrap().metadata.insert(location_id, meta);
    }

    pub fn set_zones(&self, location_id: i64, device_id: i64, zones: Vec<ZoneInfo>) {
        self.state.lock().unwrap().extended.insert(
            (location_id, device_id),
            ExtendedPanelStatus {
                result_code: 0,
                result_data: "Success".to_string(),
                zones: Some(zones),
            },
        );
    }

    pub fn set_extended(&self, location_id: i64, device_id: i64, status: ExtendedPanelStatus) {
        self.state
            .lock()
            .unwrap()
            .extended
            .insert((location_id, device_id), status);
    }

    pub fn fail_metadata(&self, location_id: i64) {
        self.state.lock().unwrap().failing_metadata.insert(location_id);
    }

    pub fn fail_extended(&self, location_id: i64, device_id: i64) {
        self.state
            .lock()
            .unwrap()
            .failing_extended
            .insert((location_id, device_id));
    }

    pub fn reject_auth(&self, reject: bool) {
        self.state.lock().unwrap().reject_auth = reject;
    }

    pub fn fail_commands(&self, fail: bool) {
        self.state.lock().unwrap().fail_commands = fail;
    }

    /// The next `count` keep-alives report an expired session.
    pub fn expire_session(&self, count: usize) {
        self.state.lock().unwrap().expire_keep_alives = count;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn command(&self, call: Call) -> Result<(), UpstreamError> {
        let fail = self.state.lock().unwrap().fail_commands;
        self.record(call);
        if fail {
            Err(UpstreamError::ResultCode {
                code: -4108,
                data: "Panel not ready".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UpstreamClient for FakeUpstream {
    async fn authenticate(&self) -> Result<(), UpstreamError> {
        self.record(Call::Authenticate);
        if self.state.lock().unwrap().reject_auth {
            return Err(UpstreamError::AuthenticationRejected {
                reason: "invalid user name or password".to_string(),
            });
        }
        Ok(())
    }

    async fn keep_alive(&self) -> Result<(), UpstreamError> {
        self.record(Call::KeepAlive);
        let mut state = self.state.lock().unwrap();
        if state.expire_keep_alives > 0 {
            state.expire_keep_alives -= 1;
            return Err(UpstreamError::SessionExpired);
        }
        Ok(())
    }

    async fn list_locations(&self) -> Result<Vec<LocationInfo>, UpstreamError> {
        self.record(Call::ListLocations);
        Ok(self.state.lock().unwrap().locations.clone())
    }

    async fn get_panel_metadata(&self, location_id: i64) -> Result<PanelMetadata, UpstreamError> {
        self.record(Call::PanelMetadata(location_id));
        let state = self.state.lock().unwrap();
        if state.failing_metadata.contains(&location_id) {
            return Err(transport("panel metadata"));
        }
        state
            .metadata
            .get(&location_id)
            .copied()
            .ok_or(UpstreamError::UnknownLocation { location_id })
    }

    async fn get_extended_panel_status(
        &self,
        location_id: i64,
        device_id: i64,
    ) -> Result<ExtendedPanelStatus, UpstreamError> {
        self.record(Call::ExtendedStatus(location_id, device_id));
        let state = self.state.lock().unwrap();
        if state.failing_extended.contains(&(location_id, device_id)) {
            return Err(transport("extended status"));
        }
        state
            .extended
            .get(&(location_id, device_id))
            .cloned()
            .ok_or(UpstreamError::UnknownLocation { location_id })
    }

    async fn arm_stay(&self, location_id: i64) -> Result<(), UpstreamError> {
        self.command(Call::ArmStay(location_id))
    }

    async fn arm_stay_night(&self, location_id: i64) -> Result<(), UpstreamError> {
        self.command(Call::ArmStayNight(location_id))
    }

    async fn arm_away(&self, location_id: i64) -> Result<(), UpstreamError> {
        self.command(Call::ArmAway(location_id))
    }

    async fn disarm(&self, location_id: i64) -> Result<(), UpstreamError> {
        self.command(Call::Disarm(location_id))
    }
}

#[derive(Default)]
struct HubState {
    nodes: Vec<(NodeInfo, bool)>,
    drivers: Vec<(String, Vec<DriverValue>)>,
    notices: BTreeMap<String, String>,
}

/// [`Hub`] that records everything it is told.
#[derive(Default)]
pub struct RecordingHub {
    state: Mutex<HubState>,
}

impl RecordingHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn nodes(&self) -> Vec<(NodeInfo, bool)> {
        self.state.lock().unwrap().nodes.clone()
    }

    pub fn node_addresses(&self) -> Vec<String> {
        self.nodes().into_iter().map(|(n, _)| n.address).collect()
    }

    pub fn publish_count(&self, address: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .drivers
            .iter()
            .filter(|(a, _)| a == address)
            .count()
    }

    pub fn last_drivers(&self, address: &str) -> Option<Vec<DriverValue>> {
        self.state
            .lock()
            .unwrap()
            .drivers
            .iter()
            .rev()
            .find(|(a, _)| a == address)
            .map(|(_, d)| d.clone())
    }

    /// Latest published value of one driver of one entity.
    pub fn driver(&self, address: &str, driver: &str) -> Option<i32> {
        self.last_drivers(address)?
            .into_iter()
            .find(|d| d.driver == driver)
            .map(|d| d.value)
    }

    pub fn notices(&self) -> BTreeMap<String, String> {
        self.state.lock().unwrap().notices.clone()
    }

    pub fn clear_published(&self) {
        let mut state = self.state.lock().unwrap();
        state.nodes.clear();
        state.drivers.clear();
    }
}

#[async_trait]
impl Hub for RecordingHub {
    async fn add_node(&self, node: &NodeInfo, update: bool) {
        self.state.lock().unwrap().nodes.push((node.clone(), update));
    }

    async fn publish_drivers(&self, address: &str, drivers: &[DriverValue]) {
        self.state
            .lock()
            .unwrap()
            .drivers
            .push((address.to_string(), drivers.to_vec()));
    }

    async fn set_notice(&self, key: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .notices
            .insert(key.to_string(), message.to_string());
    }

    async fn clear_notices(&self) {
        self.state.lock().unwrap().notices.clear();
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn device(device_id: i64, name: &str) -> DeviceInfo {
    DeviceInfo {
        device_id,
        device_name: name.to_string(),
        device_flags: None,
    }
}

pub fn zone(zone_id: u32, description: &str, can_be_bypassed: bool, status: u32) -> ZoneInfo {
    ZoneInfo {
        zone_id,
        description: description.to_string(),
        can_be_bypassed,
        status,
    }
}

/// Credentials set, no pacing, default cadences.
pub fn config() -> BridgeConfig {
    BridgeConfig::builder()
        .user("alice@example.com")
        .password("hunter2")
        .zone_query_delay_ms(0)
        .build()
}

/// Location 100 "Home" with security panel 7, one bypassable and one
/// non-bypassable zone, disarmed.
pub fn home_account(upstream: &FakeUpstream) {
    upstream.add_location(100, "Home", Some(vec![device(7, "Security Panel")]));
    upstream.set_metadata(100, 10200);
    upstream.set_zones(
        100,
        7,
        vec![
            zone(1, "Front Door", true, 0),
            zone(2, "Smoke Detector", false, 0),
        ],
    );
}

pub fn bridge(config: BridgeConfig, upstream: &Arc<FakeUpstream>, hub: &Arc<RecordingHub>) -> Bridge {
    let upstream: Arc<dyn UpstreamClient> = upstream.clone();
    let hub: Arc<dyn Hub> = hub.clone();
    Bridge::new(config, upstream, hub)
}
