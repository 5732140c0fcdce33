//! Meridian Core Domain
//!
//! Pure domain types for the Meridian exchange-connectivity gateway.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod account;
pub mod event;
pub mod instrument;
pub mod market_data;
pub mod order;

// Re-export commonly used types at crate root
pub use account::Account;
pub use event::{AdaptorEvent, AdaptorStatus};
pub use instrument::Instrument;
pub use market_data::MarketDataTick;
pub use order::{OrdId, OrdReport, OrdStatus, OrdType, Order, Side, StrategyId, TrdAction};
