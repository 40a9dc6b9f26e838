// MIT License - Copyright (c) 2026 Peter Wright
// Offline upstream serving a recorded account snapshot

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::{DeviceInfo, ExtendedPanelStatus, LocationInfo, PanelMetadata, UpstreamClient};
use crate::error::UpstreamError;
use crate::status::ArmStatus;

/// A recorded account: locations, device listings and per-panel status.
///
/// ```json
/// {
///   "user": "me@example.com",
///   "locations": [{
///     "location_id": 100,
///     "location_name": "Home",
///     "devices": [{"device_id": 7, "device_name": "Security Panel"}],
///     "panel": {"arming_state": 10200},
///     "extended_status": {"7": {"result_code": 0, "zones": []}}
///   }]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// When set, `authenticate` rejects any other user.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub locations: Vec<RecordedLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedLocation {
    pub location_id: i64,
    pub location_name: String,
    #[serde(default)]
    pub devices: Option<Vec<DeviceInfo>>,
    #[serde(default)]
    pub panel: PanelMetadata,
    /// Extended status keyed by device id.
    #[serde(default)]
    pub extended_status: HashMap<i64, ExtendedPanelStatus>,
}

struct ReplayState {
    snapshot: AccountSnapshot,
    authenticated: bool,
}

/// [`UpstreamClient`] backed by an [`AccountSnapshot`] held in memory.
///
/// Arm and disarm calls update the recorded arming state so that the next
/// poll observes them, which makes the bridge usable end to end without a
/// cloud account.
pub struct ReplayUpstream {
    user: String,
    password: String,
    state: Mutex<ReplayState>,
}

impl ReplayUpstream {
    pub fn new(user: impl Into<String>, password: impl Into<String>, snapshot: AccountSnapshot) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            state: Mutex::new(ReplayState {
                snapshot,
                authenticated: false,
            }),
        }
    }

    /// Parse a JSON account snapshot.
    pub fn from_json(
        user: impl Into<String>,
        password: impl Into<String>,
        json: &str,
    ) -> Result<Self, UpstreamError> {
        let snapshot: AccountSnapshot =
            serde_json::from_str(json).map_err(|e| UpstreamError::InvalidResponse {
                details: e.to_string(),
            })?;
        Ok(Self::new(user, password, snapshot))
    }

    /// Drop the current session; the next query fails with `SessionExpired`.
    pub async fn expire_session(&self) {
        self.state.lock().await.authenticated = false;
    }

    async fn set_arming_state(&self, location_id: i64, status: ArmStatus) -> Result<(), UpstreamError> {
        let mut state = self.state.lock().await;
        if !state.authenticated {
            return Err(UpstreamError::SessionExpired);
        }
        let location = state
            .snapshot
            .locations
            .iter_mut()
            .find(|l| l.location_id == location_id)
            .ok_or(UpstreamError::UnknownLocation { location_id })?;
        if let Some(code) = status.code() {
            location.panel.arming_state = code;
        }
        debug!("Replay: location {} now {}", location_id, status);
        Ok(())
    }
}

#[async_trait]
impl UpstreamClient for ReplayUpstream {
    async fn authenticate(&self) -> Result<(), UpstreamError> {
        let mut state = self.state.lock().await;
        let user_ok = state.snapshot.user.as_ref().is_none_or(|u| *u == self.user);
        let password_ok = state
            .snapshot
            .password
            .as_ref()
            .is_none_or(|p| *p == self.password);
        if !user_ok || !password_ok {
            state.authenticated = false;
            return Err(UpstreamError::AuthenticationRejected {
                reason: "invalid user name or password".into(),
            });
        }
        state.authenticated = true;
        Ok(())
    }

    async fn keep_alive(&self) -> Result<(), UpstreamError> {
        if self.state.lock().await.authenticated {
            Ok(())
        } else {
            Err(UpstreamError::SessionExpired)
        }
    }

    async fn list_locations(&self) -> Result<Vec<LocationInfo>, UpstreamError> {
        let state = self.state.lock().await;
        if !state.authenticated {
            return Err(UpstreamError::SessionExpired);
        }
        Ok(state
            .snapshot
            .locations
            .iter()
            .map(|l| LocationInfo {
                location_id: l.location_id,
                location_name: l.location_name.clone(),
                devices: l.devices.clone(),
            })
            .collect())
    }

    async fn get_panel_metadata(&self, location_id: i64) -> Result<PanelMetadata, UpstreamError> {
        let state = self.state.lock().await;
        if !state.authenticated {
            return Err(UpstreamError::SessionExpired);
        }
        state
            .snapshot
            .locations
            .iter()
            .find(|l| l.location_id == location_id)
            .map(|l| l.panel)
            .ok_or(UpstreamError::UnknownLocation { location_id })
    }

    async fn get_extended_panel_status(
        &self,
        location_id: i64,
        device_id: i64,
    ) -> Result<ExtendedPanelStatus, UpstreamError> {
        let state = self.state.lock().await;
        if !state.authenticated {
            return Err(UpstreamError::SessionExpired);
        }
        let location = state
            .snapshot
            .locations
            .iter()
            .find(|l| l.location_id == location_id)
            .ok_or(UpstreamError::UnknownLocation { location_id })?;
        location
            .extended_status
            .get(&device_id)
            .cloned()
            .ok_or_else(|| UpstreamError::InvalidResponse {
                details: format!("no extended status recorded for device {device_id}"),
            })
    }

    async fn arm_stay(&self, location_id: i64) -> Result<(), UpstreamError> {
        self.set_arming_state(location_id, ArmStatus::ArmedStay).await
    }

    async fn arm_stay_night(&self, location_id: i64) -> Result<(), UpstreamError> {
        self.set_arming_state(location_id, ArmStatus::ArmedStayNight).await
    }

    async fn arm_away(&self, location_id: i64) -> Result<(), UpstreamError> {
        self.set_arming_state(location_id, ArmStatus::ArmedAway).await
    }

    async fn disarm(&self, location_id: i64) -> Result<(), UpstreamError> {
        self.set_arming_state(location_id, ArmStatus::Disarmed).await
    }
}
