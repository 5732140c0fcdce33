use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tradable contract, identified by exchange code plus instrument code.
///
/// The instrument code is what the vendor keys market data and orders on
/// (e.g. `rb2410`); the exchange code routes queries and cancels
/// (e.g. `SHFE`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Exchange the contract trades on
    pub exchange_code: String,
    /// Vendor instrument code
    pub instrument_code: String,
    /// Minimum price increment
    pub tick_size: Decimal,
    /// Contract multiplier (quantity units per lot)
    pub multiplier: u32,
}

impl Instrument {
    /// Create an instrument with explicit tick size and multiplier
    pub fn new(
        exchange_code: impl Into<String>,
        instrument_code: impl Into<String>,
        tick_size: Decimal,
        multiplier: u32,
    ) -> Self {
        Self {
            exchange_code: exchange_code.into(),
            instrument_code: instrument_code.into(),
            tick_size,
            multiplier,
        }
    }

    /// Convenience constructor for tests and demos: 1-tick, 1-lot contract
    pub fn simple(exchange_code: impl Into<String>, instrument_code: impl Into<String>) -> Self {
        Self::new(exchange_code, instrument_code, Decimal::ONE, 1)
    }
}
