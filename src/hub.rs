// MIT License - Copyright (c) 2026 Peter Wright
// Outbound surface towards the home-automation hub

use async_trait::async_trait;
use serde::Serialize;

use crate::constants::{driver, uom, CONTROLLER_ADDRESS, CONTROLLER_NAME};

/// One driver value for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverValue {
    pub driver: &'static str,
    pub value: i32,
    pub uom: u8,
}

impl DriverValue {
    pub fn new(driver: &'static str, value: i32, uom: u8) -> Self {
        Self { driver, value, uom }
    }

    /// Boolean driver rendered as 0/1.
    pub fn flag(driver: &'static str, set: bool) -> Self {
        Self::new(driver, i32::from(set), uom::BOOLEAN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Controller,
    Panel,
    Zone,
}

/// Registration record for an entity the hub should know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    pub address: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub kind: NodeKind,
}

impl NodeInfo {
    pub fn controller() -> Self {
        Self {
            address: CONTROLLER_ADDRESS.to_string(),
            name: CONTROLLER_NAME.to_string(),
            parent: None,
            kind: NodeKind::Controller,
        }
    }
}

/// Controller drivers: online status.
pub fn controller_drivers(online: bool) -> Vec<DriverValue> {
    vec![DriverValue::flag(driver::ST, online)]
}

/// What the engine needs from the hub.
///
/// Publishing never fails from the engine's point of view: implementations
/// log their own transport errors.
#[async_trait]
pub trait Hub: Send + Sync {
    /// Register (or with `update`, re-register) an entity.
    async fn add_node(&self, node: &NodeInfo, update: bool);

    /// Publish the full driver set of one entity.
    async fn publish_drivers(&self, address: &str, drivers: &[DriverValue]);

    /// Raise or replace a user-visible notice.
    async fn set_notice(&self, key: &str, message: &str);

    /// Remove every notice.
    async fn clear_notices(&self);
}
