// MIT License - Copyright (c) 2026 Peter Wright
// Error types for the Total Connect bridge

/// Failure signal raised by an [`UpstreamClient`](crate::upstream::UpstreamClient).
///
/// The engine never assumes an upstream call succeeds. Every variant here is
/// caught at the discovery, sync or command boundary and turned into a log
/// line, a notice or an "unknown" driver value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("Authentication rejected: {reason}")]
    AuthenticationRejected { reason: String },

    #[error("Session expired")]
    SessionExpired,

    #[error("Upstream returned result code {code}: {data}")]
    ResultCode { code: i32, data: String },

    #[error("Unknown location: {location_id}")]
    UnknownLocation { location_id: i64 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {details}")]
    InvalidResponse { details: String },
}

impl UpstreamError {
    /// Whether the session handle should be refreshed before retrying.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, UpstreamError::SessionExpired)
    }
}

/// All errors that can occur in the bridge engine.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Configuration incomplete: {missing} not set")]
    ConfigurationIncomplete { missing: &'static str },

    #[error("Authentication failed: {0}")]
    Authentication(#[source] UpstreamError),

    #[error("Discovery failed: {reason}")]
    DiscoveryFailed { reason: String },

    #[error("Sync of {address} failed: {source}")]
    EntitySync {
        address: String,
        #[source]
        source: UpstreamError,
    },

    #[error("Command {command} on {address} failed: {source}")]
    Command {
        address: String,
        command: String,
        #[source]
        source: UpstreamError,
    },

    #[error("Command {command} refused on {address}: {reason}")]
    PolicyRefusal {
        address: String,
        command: String,
        reason: &'static str,
    },

    #[error("Unknown entity: {address}")]
    UnknownEntity { address: String },

    #[error("Unsupported command {command} for {address}")]
    UnsupportedCommand { address: String, command: String },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl BridgeError {
    /// Whether a later attempt of the same operation may succeed without
    /// any change of configuration.
    pub fn is_retryable(&self) -> bool {
        match self {
            BridgeError::Authentication(_)
            | BridgeError::DiscoveryFailed { .. }
            | BridgeError::EntitySync { .. }
            | BridgeError::Command { .. } => true,
            BridgeError::Upstream(e) => !matches!(e, UpstreamError::AuthenticationRejected { .. }),
            BridgeError::ConfigurationIncomplete { .. }
            | BridgeError::PolicyRefusal { .. }
            | BridgeError::UnknownEntity { .. }
            | BridgeError::UnsupportedCommand { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
