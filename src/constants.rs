// MIT License - Copyright (c) 2026 Peter Wright
// Fixed identifiers shared with the hub and the upstream account model

/// Device names that are always treated as security panels.
pub const VALID_DEVICES: [&str; 11] = [
    "Security Panel",
    "Security System",
    "L5100-WiFi",
    "Lynx Touch-WiFi",
    "ILP5",
    "LTE-XV",
    "GSMX4G",
    "GSMVLP5-4G",
    "7874i",
    "GSMV4G",
    "VISTA-21IP4G",
];

/// Non-security accessories, compared against the lowercased device name.
pub const SKIPPED_DEVICES: [&str; 2] = ["automation", "video doorbell"];

/// Marker in a device's flag string that only security panels carry.
pub const PANEL_TYPE_MARKER: &str = "PanelType";

/// Extended status result code meaning success.
pub const RESULT_SUCCESS: i32 = 0;

/// Address of the root controller entity.
pub const CONTROLLER_ADDRESS: &str = "controller";
pub const CONTROLLER_NAME: &str = "Total Connect Controller";

pub const PANEL_ADDRESS_PREFIX: &str = "panel_";
pub const ZONE_ADDRESS_PREFIX: &str = "z_";

/// Driver identifiers exposed to the hub.
pub mod driver {
    /// Controller online status.
    pub const ST: &str = "ST";
    /// Panel arming status / zone state.
    pub const GV0: &str = "GV0";
    /// Low battery flag.
    pub const GV1: &str = "GV1";
    /// Panel AC loss flag.
    pub const GV2: &str = "GV2";
}

/// Units of measure understood by the hub.
pub mod uom {
    /// Boolean rendered as 0/1.
    pub const BOOLEAN: u8 = 2;
    /// Index into a hub-side name table.
    pub const INDEX: u8 = 25;
}

/// Notice keys and messages.
pub mod notice {
    pub const CONFIG: &str = "mynotice";
    pub const DISCOVERY_FAILED: &str = "discovery_failed";

    pub const MISSING_CREDENTIALS: &str =
        "Please set proper user and password in configuration page, and restart this nodeserver";
    pub const DISCOVERY_FAILED_MSG: &str =
        "Discovery failed please check logs for a more detailed error.";
    pub const DISARM_DISABLED: &str = "The ability to disarm is disabled for security reasons. To enable set allow_disarming to true in the configuration parameters and restart this nodeserver.";
}
