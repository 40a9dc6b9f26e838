// MIT License - Copyright (c) 2026 Peter Wright
// Device tree: Location -> Panel -> Zone

pub mod location;
pub mod panel;
pub mod tree;
pub mod zone;

pub use location::Location;
pub use panel::{panel_address, Panel};
pub use tree::{DeviceTree, Entity};
pub use zone::{zone_address, Zone, ZoneState, ZoneStatusFlags};

/// Strip every character the hub does not accept in names.
///
/// Keeps ASCII letters and digits, `_`, `-`, and whitespace.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '_' | '-' | ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
        })
        .collect()
}
