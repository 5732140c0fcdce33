use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalized level-1 market data tick.
///
/// The vendor's depth snapshot is flattened to best bid/ask plus last
/// trade; downstream book building is out of scope for the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDataTick {
    pub instrument_code: String,
    pub last_price: Decimal,
    pub bid_price: Decimal,
    pub bid_qty: u32,
    pub ask_price: Decimal,
    pub ask_qty: u32,
    /// Cumulative session volume
    pub volume: u64,
    /// Venue timestamp of the update
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tick_fields() {
        let tick = MarketDataTick {
            instrument_code: "rb2410".to_string(),
            last_price: dec!(3501),
            bid_price: dec!(3500),
            bid_qty: 12,
            ask_price: dec!(3502),
            ask_qty: 4,
            volume: 120_043,
            timestamp: Utc::now(),
        };
        assert!(tick.bid_price < tick.ask_price);
    }
}
