// MIT License - Copyright (c) 2026 Peter Wright
// Hub surface over MQTT: node/driver/notice publishing and inbound commands

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rumqttc::{AsyncClient, QoS};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::command::Command;
use crate::event::BridgeEvent;
use crate::hub::{DriverValue, Hub, NodeInfo};

// Published messages share a flat {now, op, ...} structure

#[derive(Debug, Serialize)]
pub struct MqttNode<'a> {
    pub now: u64,
    pub op: &'static str,
    #[serde(flatten)]
    pub node: &'a NodeInfo,
    pub update: bool,
}

#[derive(Debug, Serialize)]
pub struct MqttDrivers<'a> {
    pub now: u64,
    pub op: &'static str,
    pub address: &'a str,
    pub drivers: &'a [DriverValue],
}

#[derive(Debug, Serialize)]
pub struct MqttNotices<'a> {
    pub now: u64,
    pub op: &'static str,
    pub notices: &'a BTreeMap<String, String>,
}

/// Inbound command (subscribed).
#[derive(Debug, Deserialize)]
pub struct MqttCommand {
    pub address: String,
    pub cmd: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

impl MqttCommand {
    /// Turn the wire command into an engine event.
    pub fn into_event(self) -> Result<BridgeEvent, String> {
        let command: Command = self.cmd.parse()?;
        Ok(BridgeEvent::Command {
            address: self.address,
            command,
            params: self.params,
        })
    }
}

/// Parse an inbound command payload.
pub fn parse_command(payload: &[u8]) -> Result<BridgeEvent, String> {
    let cmd: MqttCommand = serde_json::from_slice(payload).map_err(|e| e.to_string())?;
    cmd.into_event()
}

fn now_epoch_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

pub fn node_topic(prefix: &str, address: &str) -> String {
    format!("{prefix}/{address}/node")
}

pub fn drivers_topic(prefix: &str, address: &str) -> String {
    format!("{prefix}/{address}/drivers")
}

pub fn notices_topic(prefix: &str) -> String {
    format!("{prefix}/notices")
}

pub fn command_topic(prefix: &str) -> String {
    format!("{prefix}/cmd")
}

/// [`Hub`] backed by an MQTT broker.
///
/// Node, driver and notice messages are retained so that a late subscriber
/// sees the current state.
pub struct MqttHub {
    client: AsyncClient,
    prefix: String,
    notices: Mutex<BTreeMap<String, String>>,
}

impl MqttHub {
    pub fn new(client: AsyncClient, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
            notices: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn publish_json(&self, topic: &str, payload: &impl Serialize, retain: bool) {
        match serde_json::to_string(payload) {
            Ok(json) => {
                if let Err(e) = self.client.publish(topic, QoS::AtLeastOnce, retain, json).await {
                    error!("Failed to publish to {topic}: {e}");
                }
            }
            Err(e) => error!("Failed to serialize MQTT payload: {e}"),
        }
    }

    async fn publish_notices(&self, notices: &BTreeMap<String, String>) {
        let msg = MqttNotices {
            now: now_epoch_ms(),
            op: "NOTICES",
            notices,
        };
        self.publish_json(&notices_topic(&self.prefix), &msg, true).await;
    }
}

#[async_trait]
impl Hub for MqttHub {
    async fn add_node(&self, node: &NodeInfo, update: bool) {
        debug!("Registering node {} ({})", node.address, node.name);
        let msg = MqttNode {
            now: now_epoch_ms(),
            op: "NODE",
            node,
            update,
        };
        self.publish_json(&node_topic(&self.prefix, &node.address), &msg, true)
            .await;
    }

    async fn publish_drivers(&self, address: &str, drivers: &[DriverValue]) {
        let msg = MqttDrivers {
            now: now_epoch_ms(),
            op: "DRIVERS",
            address,
            drivers,
        };
        self.publish_json(&drivers_topic(&self.prefix, address), &msg, true)
            .await;
    }

    async fn set_notice(&self, key: &str, message: &str) {
        warn!("Notice {key}: {message}");
        let mut notices = self.notices.lock().await;
        notices.insert(key.to_string(), message.to_string());
        self.publish_notices(&notices).await;
    }

    async fn clear_notices(&self) {
        let mut notices = self.notices.lock().await;
        notices.clear();
        self.publish_notices(&notices).await;
    }
}
