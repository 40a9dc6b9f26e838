// MIT License - Copyright (c) 2026 Peter Wright
// Arming-state codes reported by the upstream account

use std::fmt;

/// Panel arming state as reported by the upstream API.
///
/// Every raw code resolves to a variant: codes outside the table become
/// [`ArmStatus::Unknown`]. The numeric driver value of each variant is part
/// of the hub contract and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmStatus {
    /// 10200
    Disarmed,
    /// 10211
    DisarmedBypass,
    /// 10201
    ArmedAway,
    /// 10202
    ArmedAwayBypass,
    /// 10205
    ArmedAwayInstant,
    /// 10206
    ArmedAwayInstantBypass,
    /// 10223
    ArmedCustomBypass,
    /// 10203
    ArmedStay,
    /// 10204
    ArmedStayBypass,
    /// 10209
    ArmedStayInstant,
    /// 10210
    ArmedStayInstantBypass,
    /// 10218
    ArmedStayNight,
    /// 10307
    Arming,
    /// 10308
    Disarming,
    /// 10207
    Alarm,
    /// 10212
    AlarmFire,
    /// 10213. Unconfirmed against vendor documentation; kept as observed.
    AlarmCarbon,
    /// Any other code, and the value published when a query fails.
    Unknown,
}

/// Raw code and driver value for every known variant.
const ARM_STATUS_TABLE: [(i64, ArmStatus, i32); 17] = [
    (10200, ArmStatus::Disarmed, 1),
    (10211, ArmStatus::DisarmedBypass, 2),
    (10201, ArmStatus::ArmedAway, 3),
    (10202, ArmStatus::ArmedAwayBypass, 4),
    (10205, ArmStatus::ArmedAwayInstant, 5),
    (10206, ArmStatus::ArmedAwayInstantBypass, 6),
    (10223, ArmStatus::ArmedCustomBypass, 7),
    (10203, ArmStatus::ArmedStay, 8),
    (10204, ArmStatus::ArmedStayBypass, 9),
    (10209, ArmStatus::ArmedStayInstant, 10),
    (10210, ArmStatus::ArmedStayInstantBypass, 11),
    (10218, ArmStatus::ArmedStayNight, 12),
    (10307, ArmStatus::Arming, 13),
    (10308, ArmStatus::Disarming, 14),
    (10207, ArmStatus::Alarm, 15),
    (10212, ArmStatus::AlarmFire, 16),
    (10213, ArmStatus::AlarmCarbon, 17),
];

/// Driver value published for [`ArmStatus::Unknown`].
pub const UNKNOWN_DRIVER_VALUE: i32 = 18;

impl ArmStatus {
    /// Resolve a raw upstream code. Total: unknown codes map to `Unknown`.
    pub fn from_code(code: i64) -> Self {
        ARM_STATUS_TABLE
            .iter()
            .find(|(raw, _, _)| *raw == code)
            .map_or(Self::Unknown, |(_, status, _)| *status)
    }

    /// The raw upstream code, or `None` for `Unknown`.
    pub fn code(&self) -> Option<i64> {
        ARM_STATUS_TABLE
            .iter()
            .find(|(_, status, _)| status == self)
            .map(|(raw, _, _)| *raw)
    }

    /// Normalized driver value exposed to the hub.
    pub fn driver_value(&self) -> i32 {
        match self {
            Self::Disarmed => 1,
            Self::DisarmedBypass => 2,
            Self::ArmedAway => 3,
            Self::ArmedAwayBypass => 4,
            Self::ArmedAwayInstant => 5,
            Self::ArmedAwayInstantBypass => 6,
            Self::ArmedCustomBypass => 7,
            Self::ArmedStay => 8,
            Self::ArmedStayBypass => 9,
            Self::ArmedStayInstant => 10,
            Self::ArmedStayInstantBypass => 11,
            Self::ArmedStayNight => 12,
            Self::Arming => 13,
            Self::Disarming => 14,
            Self::Alarm => 15,
            Self::AlarmFire => 16,
            Self::AlarmCarbon => 17,
            Self::Unknown => UNKNOWN_DRIVER_VALUE,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Disarmed => "Disarmed",
            Self::DisarmedBypass => "Disarmed Bypass",
            Self::ArmedAway => "Armed Away",
            Self::ArmedAwayBypass => "Armed Away Bypass",
            Self::ArmedAwayInstant => "Armed Away Instant",
            Self::ArmedAwayInstantBypass => "Armed Away Instant Bypass",
            Self::ArmedCustomBypass => "Armed Custom Bypass",
            Self::ArmedStay => "Armed Stay",
            Self::ArmedStayBypass => "Armed Stay Bypass",
            Self::ArmedStayInstant => "Armed Stay Instant",
            Self::ArmedStayInstantBypass => "Armed Stay Instant Bypass",
            Self::ArmedStayNight => "Armed Stay Night",
            Self::Arming => "Arming",
            Self::Disarming => "Disarming",
            Self::Alarm => "Alarm",
            Self::AlarmFire => "Fire Alarm",
            Self::AlarmCarbon => "Carbon Monoxide Alarm",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(
            self,
            Self::ArmedAway
                | Self::ArmedAwayBypass
                | Self::ArmedAwayInstant
                | Self::ArmedAwayInstantBypass
                | Self::ArmedCustomBypass
                | Self::ArmedStay
                | Self::ArmedStayBypass
                | Self::ArmedStayInstant
                | Self::ArmedStayInstantBypass
                | Self::ArmedStayNight
        )
    }

    pub fn is_alarm(&self) -> bool {
        matches!(self, Self::Alarm | Self::AlarmFire | Self::AlarmCarbon)
    }
}

/// Map a raw arming-state code straight to its driver value.
pub fn normalize(code: i64) -> i32 {
    ArmStatus::from_code(code).driver_value()
}

impl fmt::Display for ArmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
