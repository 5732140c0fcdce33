//! Meridian Ports
//!
//! Port definitions (traits) for the Meridian exchange-connectivity
//! gateway. These define the two boundaries the gateway sits between:
//!
//! - the **vendor session layer** ([`MdApi`]/[`TraderApi`] for outbound
//!   requests, [`MdSpi`]/[`TraderSpi`] for the callbacks the vendor runtime
//!   delivers on its own threads), and
//! - the **trading engine** ([`InboundScheduler`], the strictly-ordered
//!   handler contract the gateway feeds).
//!
//! All traits are synchronous: the vendor invokes callbacks inline on its
//! session threads, and the gateway invokes the scheduler from a single
//! dispatcher thread.

mod error;
mod handler;
mod vendor;

pub use error::{VendorError, VendorResult};
pub use handler::{AdaptorEventHandler, InboundScheduler, MarketDataHandler, OrdReportHandler};
pub use vendor::{
    AuthRequest, InputOrder, InputOrderAction, LoginRequest, MdApi, MdSpi, QryOrder, QryPosition,
    QryTradingAccount, RspInfo, RspUserLogin, TraderApi, TraderSpi, VendorOrder, VendorOrderStatus,
    VendorPosition, VendorTick, VendorTrade, VendorTradingAccount,
};
