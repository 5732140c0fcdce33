//! Error types for the gateway crate

use crate::messages::Channel;
use meridian_ports::VendorError;
use thiserror::Error;

/// Gateway-level errors.
///
/// None of these are fatal: the facade maps them to `false` returns and the
/// dispatcher logs and drops the offending message.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Correlation miss: no registry entry for the given key
    #[error("Order reference not found for {0}")]
    OrderRefNotFound(String),

    /// Operation attempted while the owning channel is not logged in
    #[error("Channel unavailable: {0}")]
    ChannelUnavailable(Channel),

    /// Synchronous send failure from the vendor session layer
    #[error("Vendor error: {0}")]
    Vendor(#[from] VendorError),

    /// The inbound buffer's consumer side is gone
    #[error("Inbound buffer closed")]
    BufferClosed,

    /// Could not start a gateway worker thread
    #[error("Thread spawn failed: {0}")]
    Spawn(#[from] std::io::Error),
}
