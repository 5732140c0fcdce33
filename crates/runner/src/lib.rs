//! Meridian Runner - Gateway bootstrap
//!
//! Wires a gateway instance for operation:
//!
//! - **Bootstrap**: config loading and component wiring
//! - **Scheduler**: a logging implementation of the downstream handler
//!   contract, useful until a real engine is attached
//!
//! ## Architecture
//!
//! ```text
//!   config.json
//!       │
//!       ▼
//!  ┌──────────┐    vendor API     ┌───────────────┐
//!  │ Bootstrap│ ────────────────▶ │    Gateway    │
//!  └──────────┘                   └───────┬───────┘
//!                                         │ ordered events
//!                                         ▼
//!                                ┌─────────────────┐
//!                                │ InboundScheduler│
//!                                └─────────────────┘
//! ```
//!
//! Dry-run mode swaps the vendor session layer for the in-process
//! simulator, so the whole wiring can be exercised without a broker
//! connection.

pub mod bootstrap;
pub mod scheduler;

pub use bootstrap::{BootstrapError, RunnerConfig, init_logging, load_config, start_dry_run};
pub use scheduler::LoggingScheduler;
