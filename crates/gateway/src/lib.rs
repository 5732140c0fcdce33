//! Meridian Gateway
//!
//! Bridges a callback-driven, session-oriented vendor trading API onto the
//! strictly-ordered event stream the trading engine consumes. Provides:
//! - Two independent session state machines (market-data, trading)
//! - A bounded multi-producer/single-consumer inbound event buffer
//! - Order-reference correlation (vendor refs <-> internal order ids)
//! - A single-threaded dispatcher feeding the downstream handler contract
//!
//! ## Architecture
//!
//! ```text
//!  Vendor runtime (two session threads)
//!       │ callbacks
//!  ┌────▼──────────┐      ┌──────────────┐
//!  │ MdSession     │      │ TraderSession│   state machines
//!  └────┬──────────┘      └────┬─────────┘
//!       │ enqueue (blocks when full)
//!  ┌────▼─────────────────────▼─────────┐
//!  │        Inbound event buffer        │   bounded FIFO
//!  └────────────────┬───────────────────┘
//!                   │ single consumer thread
//!            ┌──────▼────────┐
//!            │ EventDispatcher│ -> InboundScheduler (engine)
//!            └───────────────┘
//! ```
//!
//! Outbound, the [`Gateway`] facade gates every operation on the owning
//! channel's state, registers order references before a request is sent,
//! and serializes queries behind a single coarse lock.

pub mod buffer;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod messages;
pub mod orderref;
pub mod session;

// Re-export commonly used types
pub use config::GatewayConfig;
pub use dispatch::EventDispatcher;
pub use error::GatewayError;
pub use gateway::Gateway;
pub use messages::{Channel, ConnectionEvent, QueuedEvent, RspMessage, SessionIdentity};
pub use orderref::{OrderRefGenerator, OrderRefRegistry};
pub use session::{MdSession, SessionState, TraderSession};
