// MIT License - Copyright (c) 2026 Peter Wright
// Discovery against a scripted account

mod common;

use common::{bridge, config, device, home_account, zone, Call, FakeUpstream, RecordingHub};
use totalconnect_bridge::constants::notice;
use totalconnect_bridge::{
    BridgeConfig, BridgeError, DeviceInfo, DeviceTree, DiscoveryEngine, DiscoveryMode,
    ExtendedPanelStatus, NodeKind,
};

#[tokio::test]
async fn test_discovers_panel_and_bypassable_zones() {
    let upstream = FakeUpstream::new();
    home_account(&upstream);
    let hub = RecordingHub::new();
    let cfg = config();

    let mut tree = DeviceTree::new();
    let report = DiscoveryEngine::new(&cfg, upstream.as_ref(), hub.as_ref())
        .discover(&mut tree, DiscoveryMode::Initial)
        .await
        .unwrap();

    assert_eq!(report.locations, 1);
    assert_eq!(report.panels_added, 1);
    assert_eq!(report.zones_added, 1);
    assert_eq!(report.zones_skipped, 1);
    assert_eq!(tree.panel_count(), 1);
    assert_eq!(tree.zone_count(), 1);

    let panel = tree.panel("panel_7").unwrap();
    assert_eq!(panel.name, "Home - Security Panel");
    assert_eq!(panel.location_id, 100);
    let zone = tree.zone("z_7_1").unwrap();
    assert_eq!(zone.name, "Home - Front Door");
    assert_eq!(zone.panel_address, "panel_7");

    let nodes = hub.nodes();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].0.kind, NodeKind::Panel);
    assert_eq!(nodes[1].0.kind, NodeKind::Zone);
    assert_eq!(nodes[1].0.parent.as_deref(), Some("panel_7"));
    assert!(nodes.iter().all(|(_, update)| !update));
}

#[tokio::test]
async fn test_includes_non_bypassable_zones_when_configured() {
    let upstream = FakeUpstream::new();
    home_account(&upstream);
    let hub = RecordingHub::new();
    let cfg = BridgeConfig {
        include_non_bypassable_zones: true,
        ..config()
    };

    let mut tree = DeviceTree::new();
    let report = DiscoveryEngine::new(&cfg, upstream.as_ref(), hub.as_ref())
        .discover(&mut tree, DiscoveryMode::Initial)
        .await
        .unwrap();

    assert_eq!(report.zones_added, 2);
    assert_eq!(report.zones_skipped, 0);
    assert!(tree.contains("z_7_2"));
}

#[tokio::test]
async fn test_discovery_twice_is_idempotent() {
    let upstream = FakeUpstream::new();
    home_account(&upstream);
    let hub = RecordingHub::new();
    let cfg = config();
    let engine = DiscoveryEngine::new(&cfg, upstream.as_ref(), hub.as_ref());

    let mut tree = DeviceTree::new();
    engine.discover(&mut tree, DiscoveryMode::Initial).await.unwrap();
    let before = tree.addresses();

    let report = engine.discover(&mut tree, DiscoveryMode::Refresh).await.unwrap();
    assert_eq!(report.panels_added, 0);
    assert_eq!(report.zones_added, 0);
    assert_eq!(tree.addresses(), before);
    assert_eq!(hub.nodes().len(), 2);
}

#[tokio::test]
async fn test_refresh_registers_new_entities_with_update_flag() {
    let upstream = FakeUpstream::new();
    home_account(&upstream);
    let hub = RecordingHub::new();
    let cfg = config();
    let engine = DiscoveryEngine::new(&cfg, upstream.as_ref(), hub.as_ref());

    let mut tree = DeviceTree::new();
    engine.discover(&mut tree, DiscoveryMode::Initial).await.unwrap();
    upstream.set_zones(
        100,
        7,
        vec![
            zone(1, "Front Door", true, 0),
            zone(3, "Back Door", true, 0),
        ],
    );
    hub.clear_published();

    let report = engine.discover(&mut tree, DiscoveryMode::Refresh).await.unwrap();
    assert_eq!(report.zones_added, 1);
    let nodes = hub.nodes();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].0.address, "z_7_3");
    assert!(nodes[0].1);
    assert_eq!(tree.zone_count(), 2);
}

#[tokio::test]
async fn test_auth_failure_leaves_tree_untouched() {
    let upstream = FakeUpstream::new();
    home_account(&upstream);
    upstream.reject_auth(true);
    let hub = RecordingHub::new();
    let cfg = config();

    let mut tree = DeviceTree::new();
    let err = DiscoveryEngine::new(&cfg, upstream.as_ref(), hub.as_ref())
        .discover(&mut tree, DiscoveryMode::Initial)
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Authentication(_)));
    assert!(tree.is_empty());
    assert!(hub.nodes().is_empty());
    assert_eq!(upstream.calls(), vec![Call::Authenticate]);
}

#[tokio::test]
async fn test_bridge_surfaces_discovery_failure_as_notice() {
    let upstream = FakeUpstream::new();
    home_account(&upstream);
    upstream.reject_auth(true);
    let hub = RecordingHub::new();
    let mut bridge = bridge(config(), &upstream, &hub);

    let err = bridge.discover(DiscoveryMode::Initial).await.unwrap_err();
    assert!(matches!(err, BridgeError::DiscoveryFailed { .. }));
    assert!(hub.notices().contains_key(notice::DISCOVERY_FAILED));
    assert!(bridge.tree().is_empty());
}

#[tokio::test]
async fn test_location_without_devices_fails() {
    for devices in [None, Some(Vec::<DeviceInfo>::new())] {
        let upstream = FakeUpstream::new();
        upstream.add_location(100, "Home", devices);
        let hub = RecordingHub::new();
        let cfg = config();

        let mut tree = DeviceTree::new();
        let err = DiscoveryEngine::new(&cfg, upstream.as_ref(), hub.as_ref())
            .discover(&mut tree, DiscoveryMode::Initial)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::DiscoveryFailed { .. }));
        assert_eq!(tree.panel_count(), 0);
    }
}

#[tokio::test]
async fn test_unsuccessful_extended_status_keeps_panel_without_zones() {
    let upstream = FakeUpstream::new();
    upstream.add_location(100, "Home", Some(vec![device(7, "Security Panel")]));
    upstream.set_extended(
        100,
        7,
        ExtendedPanelStatus {
            result_code: -4002,
            result_data: "Panel offline".to_string(),
            zones: None,
        },
    );
    let hub = RecordingHub::new();
    let cfg = config();

    let mut tree = DeviceTree::new();
    let report = DiscoveryEngine::new(&cfg, upstream.as_ref(), hub.as_ref())
        .discover(&mut tree, DiscoveryMode::Initial)
        .await
        .unwrap();

    assert_eq!(report.panels_added, 1);
    assert_eq!(tree.panel_count(), 1);
    assert_eq!(tree.zone_count(), 0);
}

#[tokio::test]
async fn test_successful_status_without_zone_list_fails() {
    let upstream = FakeUpstream::new();
    upstream.add_location(100, "Home", Some(vec![device(7, "Security Panel")]));
    upstream.set_extended(
        100,
        7,
        ExtendedPanelStatus {
            result_code: 0,
            result_data: String::new(),
            zones: None,
        },
    );
    let hub = RecordingHub::new();
    let cfg = config();

    let mut tree = DeviceTree::new();
    let err = DiscoveryEngine::new(&cfg, upstream.as_ref(), hub.as_ref())
        .discover(&mut tree, DiscoveryMode::Initial)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::DiscoveryFailed { .. }));
    // The panel reconciled before the failure is kept
    assert!(tree.contains("panel_7"));
}

#[tokio::test]
async fn test_accessories_and_unsupported_devices_skipped() {
    let upstream = FakeUpstream::new();
    upstream.add_location(
        100,
        "Home",
        Some(vec![
            device(1, "Automation"),
            device(2, "Video Doorbell"),
            device(3, "Thermostat"),
            DeviceInfo {
                device_id: 4,
                device_name: "Garage Keypad".to_string(),
                device_flags: Some("PromptForUserCode=0,PanelType=12".to_string()),
            },
        ]),
    );
    upstream.set_zones(100, 4, vec![zone(1, "Garage Door", true, 0)]);
    let hub = RecordingHub::new();
    let cfg = config();

    let mut tree = DeviceTree::new();
    DiscoveryEngine::new(&cfg, upstream.as_ref(), hub.as_ref())
        .discover(&mut tree, DiscoveryMode::Initial)
        .await
        .unwrap();

    assert_eq!(tree.addresses(), vec!["panel_4".to_string(), "z_4_1".to_string()]);
    assert_eq!(upstream.count(|c| matches!(c, Call::ExtendedStatus(..))), 1);
}

#[tokio::test]
async fn test_names_are_sanitized() {
    let upstream = FakeUpstream::new();
    upstream.add_location(100, "Mom's House!", Some(vec![device(7, "Security Panel")]));
    upstream.set_zones(100, 7, vec![zone(1, "Door #1 (front)", true, 0)]);
    let hub = RecordingHub::new();
    let cfg = config();

    let mut tree = DeviceTree::new();
    DiscoveryEngine::new(&cfg, upstream.as_ref(), hub.as_ref())
        .discover(&mut tree, DiscoveryMode::Initial)
        .await
        .unwrap();

    assert_eq!(tree.panel("panel_7").unwrap().name, "Moms House - Security Panel");
    assert_eq!(tree.zone("z_7_1").unwrap().name, "Moms House - Door 1 front");
}

#[tokio::test]
async fn test_missing_credentials_raise_notice_without_upstream_calls() {
    let upstream = FakeUpstream::new();
    home_account(&upstream);
    let hub = RecordingHub::new();
    let mut bridge = bridge(BridgeConfig::default(), &upstream, &hub);

    let err = bridge.discover(DiscoveryMode::Initial).await.unwrap_err();
    assert!(matches!(err, BridgeError::ConfigurationIncomplete { missing: "user" }));
    assert_eq!(
        hub.notices().get(notice::CONFIG).map(String::as_str),
        Some(notice::MISSING_CREDENTIALS)
    );
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_apply_config_clears_notices_and_discovers() {
    let upstream = FakeUpstream::new();
    home_account(&upstream);
    let hub = RecordingHub::new();
    let mut bridge = bridge(BridgeConfig::default(), &upstream, &hub);

    assert!(bridge.start().await.is_err());
    assert!(!hub.notices().is_empty());

    let report = bridge.apply_config(config()).await.unwrap();
    assert_eq!(report.panels_added, 1);
    assert!(hub.notices().is_empty());
    assert_eq!(bridge.tree().zone_count(), 1);
}
