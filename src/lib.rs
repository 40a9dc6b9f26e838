// MIT License - Copyright (c) 2026 Peter Wright
// Total Connect bridge
//
//! # totalconnect-bridge
//!
//! Synchronizes a Total Connect cloud security account with a local
//! home-automation hub.
//!
//! The [`Bridge`] discovers the account's locations, security panels and
//! zones, polls panels on a fast cadence and zones on a slow one, and
//! publishes each entity's state as a small set of numeric drivers. Arm and
//! disarm commands from the hub are relayed back to the account; disarming
//! is refused unless explicitly allowed.
//!
//! The vendor API sits behind [`UpstreamClient`] and the hub behind [`Hub`].
//! [`MqttHub`] publishes to an MQTT broker, [`ReplayUpstream`] serves a
//! recorded account snapshot.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use totalconnect_bridge::{Bridge, BridgeConfig, Hub, ReplayUpstream, UpstreamClient};
//!
//! # async fn run(hub: Arc<dyn Hub>) -> anyhow::Result<()> {
//! let config = BridgeConfig::builder()
//!     .user("me@example.com")
//!     .password("secret")
//!     .zone_query_delay_ms(500)
//!     .build();
//!
//! let json = std::fs::read_to_string("account.json")?;
//! let upstream: Arc<dyn UpstreamClient> =
//!     Arc::new(ReplayUpstream::from_json(&config.user, &config.password, &json)?);
//!
//! let mut bridge = Bridge::new(config, upstream, hub);
//! bridge.start().await?;
//!
//! let (_stop_tx, stop_rx) = tokio::sync::watch::channel(false);
//! bridge.run(stop_rx).await;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod constants;
pub mod devices;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod event;
pub mod hub;
pub mod mqtt;
pub mod scheduler;
pub(crate) mod session;
pub mod status;
pub mod sync;
pub mod upstream;

// Re-exports for convenience
pub use command::{Command, CommandOutcome, CommandRouter};
pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use devices::{DeviceTree, Entity, Location, Panel, Zone, ZoneState, ZoneStatusFlags};
pub use discovery::{DiscoveryEngine, DiscoveryMode, DiscoveryReport};
pub use engine::Bridge;
pub use error::{BridgeError, Result, UpstreamError};
pub use event::{BridgeEvent, EventSender};
pub use hub::{DriverValue, Hub, NodeInfo, NodeKind};
pub use mqtt::MqttHub;
pub use scheduler::{Pacer, PassReport, PollScheduler, ReauthJob};
pub use status::{normalize, ArmStatus};
pub use sync::{SyncContext, SyncOutcome, Syncable};
pub use upstream::{
    DeviceInfo, ExtendedPanelStatus, LocationInfo, PanelMetadata, ReplayUpstream, UpstreamClient,
    ZoneInfo,
};
