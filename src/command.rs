// MIT License - Copyright (c) 2026 Peter Wright
// Inbound hub commands routed to the upstream API

use std::fmt;
use std::str::FromStr;

use tracing::{error, info, warn};

use crate::constants::notice;
use crate::devices::{DeviceTree, Panel};
use crate::error::{BridgeError, Result, UpstreamError};
use crate::session::with_session;
use crate::sync::{SyncContext, SyncOutcome, Syncable};

/// Named commands accepted from the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ArmStay,
    ArmStayNight,
    ArmAway,
    Disarm,
    Query,
    /// Controller only: re-run discovery.
    Discover,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArmStay => "ARM_STAY",
            Self::ArmStayNight => "ARM_STAY_NIGHT",
            Self::ArmAway => "ARM_AWAY",
            Self::Disarm => "DISARM",
            Self::Query => "QUERY",
            Self::Discover => "DISCOVER",
        }
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ARM_STAY" => Ok(Self::ArmStay),
            "ARM_STAY_NIGHT" => Ok(Self::ArmStayNight),
            "ARM_AWAY" => Ok(Self::ArmAway),
            "DISARM" => Ok(Self::Disarm),
            "QUERY" => Ok(Self::Query),
            "DISCOVER" => Ok(Self::Discover),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a routed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Forwarded to the upstream API and accepted.
    Sent,
    /// The entity was queried and its drivers published.
    Queried(SyncOutcome),
    /// Disarming is disabled; nothing was sent upstream.
    Refused,
    /// The upstream call failed.
    Failed,
    /// Unknown entity, or a command the entity does not take.
    Rejected,
}

/// Validates and forwards panel and zone commands.
///
/// Commands are fire-and-forget for the hub: every error ends here as a log
/// line (and for a refused disarm, a notice).
pub struct CommandRouter;

impl CommandRouter {
    pub async fn execute(
        tree: &mut DeviceTree,
        address: &str,
        command: Command,
        ctx: SyncContext<'_>,
    ) -> CommandOutcome {
        match Self::try_execute(tree, address, command, ctx).await {
            Ok(outcome) => outcome,
            Err(err @ BridgeError::PolicyRefusal { .. }) => {
                warn!("Disarming panel is disabled: {}", err);
                ctx.hub.set_notice(notice::CONFIG, notice::DISARM_DISABLED).await;
                CommandOutcome::Refused
            }
            Err(err @ (BridgeError::UnknownEntity { .. } | BridgeError::UnsupportedCommand { .. })) => {
                warn!("{}", err);
                CommandOutcome::Rejected
            }
            Err(err) => {
                error!("{}", err);
                CommandOutcome::Failed
            }
        }
    }

    async fn try_execute(
        tree: &mut DeviceTree,
        address: &str,
        command: Command,
        ctx: SyncContext<'_>,
    ) -> Result<CommandOutcome> {
        if let Some(panel) = tree.panel_mut(address) {
            return Self::panel_command(panel, command, ctx).await;
        }
        if let Some(zone) = tree.zone_mut(address) {
            return match command {
                Command::Query => Ok(CommandOutcome::Queried(zone.sync(ctx).await)),
                other => Err(BridgeError::UnsupportedCommand {
                    address: address.to_string(),
                    command: other.to_string(),
                }),
            };
        }
        Err(BridgeError::UnknownEntity {
            address: address.to_string(),
        })
    }

    async fn panel_command(panel: &mut Panel, command: Command, ctx: SyncContext<'_>) -> Result<CommandOutcome> {
        let upstream = ctx.upstream;
        let location_id = panel.location_id;
        let sent = match command {
            Command::Query => return Ok(CommandOutcome::Queried(panel.sync(ctx).await)),
            Command::Discover => {
                return Err(BridgeError::UnsupportedCommand {
                    address: panel.address.clone(),
                    command: command.to_string(),
                });
            }
            Command::Disarm if !panel.allow_disarming => {
                return Err(BridgeError::PolicyRefusal {
                    address: panel.address.clone(),
                    command: command.to_string(),
                    reason: "allow_disarming is false",
                });
            }
            Command::ArmStay => with_session!(upstream, upstream.arm_stay(location_id)),
            Command::ArmStayNight => with_session!(upstream, upstream.arm_stay_night(location_id)),
            Command::ArmAway => with_session!(upstream, upstream.arm_away(location_id)),
            Command::Disarm => with_session!(upstream, upstream.disarm(location_id)),
        };
        Self::finish(panel, command, sent)
    }

    fn finish(
        panel: &Panel,
        command: Command,
        sent: std::result::Result<(), UpstreamError>,
    ) -> Result<CommandOutcome> {
        sent.map_err(|source| BridgeError::Command {
            address: panel.address.clone(),
            command: command.to_string(),
            source,
        })?;
        info!("{} sent for panel {}", command, panel.address);
        Ok(CommandOutcome::Sent)
    }
}
