use serde::{Deserialize, Serialize};

/// Channel availability transitions reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdaptorStatus {
    /// Market-data channel logged in and usable
    MdEnable,
    /// Market-data channel lost
    MdDisable,
    /// Trading channel logged in and usable
    TraderEnable,
    /// Trading channel lost
    TraderDisable,
}

/// Status event emitted to the downstream handler whenever a channel
/// becomes available or unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptorEvent {
    /// Which gateway instance the event belongs to
    pub adaptor_id: String,
    pub status: AdaptorStatus,
}

impl AdaptorEvent {
    pub fn new(adaptor_id: impl Into<String>, status: AdaptorStatus) -> Self {
        Self {
            adaptor_id: adaptor_id.into(),
            status,
        }
    }
}
