use thiserror::Error;

/// Errors surfaced by the vendor session layer on outbound requests.
///
/// Asynchronous failures (rejects, login errors) arrive through the SPI
/// callbacks instead; these cover only the synchronous send path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VendorError {
    #[error("Session not connected")]
    NotConnected,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Request rejected by vendor: code={code}, msg={msg}")]
    Rejected { code: i32, msg: String },
}

pub type VendorResult<T> = std::result::Result<T, VendorError>;
