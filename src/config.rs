// MIT License - Copyright (c) 2026 Peter Wright
// Bridge configuration

use tokio::time::Duration;

use crate::error::{BridgeError, Result};

/// Upper bound for every interval derived from the configuration (one year).
pub const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration applied to the bridge engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Total Connect account user name
    pub user: String,
    /// Total Connect account password
    pub password: String,
    /// Also track zones that cannot be bypassed
    pub include_non_bypassable_zones: bool,
    /// Permit the DISARM command to reach the upstream API
    pub allow_disarming: bool,
    /// Interval of the periodic re-authentication job, in minutes
    pub refresh_auth_interval_mins: u64,
    /// Pause after every entity query, in milliseconds
    pub zone_query_delay_ms: u64,
    /// Fast cadence (panels only), in seconds
    pub short_poll_secs: u64,
    /// Slow cadence (re-auth job + zones), in seconds
    pub long_poll_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            password: String::new(),
            include_non_bypassable_zones: false,
            allow_disarming: false,
            refresh_auth_interval_mins: 120,
            zone_query_delay_ms: 500,
            short_poll_secs: 30,
            long_poll_secs: 300,
        }
    }
}

impl BridgeConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Credentials are required before anything can talk to the upstream API.
    pub fn validate(&self) -> Result<()> {
        if self.user.is_empty() {
            return Err(BridgeError::ConfigurationIncomplete { missing: "user" });
        }
        if self.password.is_empty() {
            return Err(BridgeError::ConfigurationIncomplete { missing: "password" });
        }
        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.zone_query_delay_ms)
    }

    pub fn refresh_auth_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_auth_interval_mins.saturating_mul(60).min(MAX_INTERVAL_SECS))
    }

    pub fn short_poll(&self) -> Duration {
        Duration::from_secs(self.short_poll_secs.clamp(1, MAX_INTERVAL_SECS))
    }

    pub fn long_poll(&self) -> Duration {
        Duration::from_secs(self.long_poll_secs.clamp(1, MAX_INTERVAL_SECS))
    }
}

/// Builder for BridgeConfig.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.config.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    pub fn include_non_bypassable_zones(mut self, include: bool) -> Self {
        self.config.include_non_bypassable_zones = include;
        self
    }

    pub fn allow_disarming(mut self, allow: bool) -> Self {
        self.config.allow_disarming = allow;
        self
    }

    pub fn refresh_auth_interval_mins(mut self, mins: u64) -> Self {
        self.config.refresh_auth_interval_mins = mins;
        self
    }

    pub fn zone_query_delay_ms(mut self, ms: u64) -> Self {
        self.config.zone_query_delay_ms = ms;
        self
    }

    pub fn short_poll_secs(mut self, secs: u64) -> Self {
        self.config.short_poll_secs = secs;
        self
    }

    pub fn long_poll_secs(mut self, secs: u64) -> Self {
        self.config.long_poll_secs = secs;
        self
    }

    pub fn build(self) -> BridgeConfig {
        self.config
    }
}
