use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::instrument::Instrument;

/// Internally generated order identifier, unique per process
pub type OrdId = u64;

/// Identifier of the strategy that originated an order
pub type StrategyId = u32;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

/// Position action carried by an order (futures-style open/close)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrdAction {
    /// Open a new position
    Open,
    /// Close an existing position
    Close,
    /// Close a position opened today (exchanges that distinguish it)
    CloseToday,
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrdType {
    Limit,
    Market,
    /// Fill-or-kill limit
    Fok,
    /// Fill-and-kill (immediate-or-cancel) limit
    Fak,
}

/// Order lifecycle status as reported back by the trading channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrdStatus {
    /// Sent, no acknowledgement yet
    PendingNew,
    /// Acknowledged and resting
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    /// Submission rejected by the exchange or the vendor gateway
    NewRejected,
    /// Cancel request rejected
    CancelRejected,
    /// Status not provided by the venue (e.g. on raw fill reports)
    Unprovided,
}

impl OrdStatus {
    /// Terminal statuses receive no further reports
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Filled | Self::Canceled | Self::NewRejected | Self::CancelRejected
        )
    }
}

/// A child order as the trading engine hands it to the gateway.
///
/// The gateway does not mutate orders; it correlates them with
/// vendor-assigned order references and turns vendor callbacks into
/// [`OrdReport`] values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Internal order id, assigned upstream
    pub ord_id: OrdId,
    /// Originating strategy
    pub strategy_id: StrategyId,
    pub instrument: Instrument,
    pub side: Side,
    pub action: TrdAction,
    pub ord_type: OrdType,
    /// Total quantity, in lots
    pub qty: u32,
    /// Quantity still working (used when constructing cancels)
    pub leaves_qty: u32,
    /// Limit price; ignored for market orders
    pub price: Decimal,
}

impl Order {
    /// Create a limit order with full quantity still working
    #[allow(clippy::too_many_arguments)]
    pub fn limit(
        ord_id: OrdId,
        strategy_id: StrategyId,
        instrument: Instrument,
        side: Side,
        action: TrdAction,
        qty: u32,
        price: Decimal,
    ) -> Self {
        Self {
            ord_id,
            strategy_id,
            instrument,
            side,
            action,
            ord_type: OrdType::Limit,
            qty,
            leaves_qty: qty,
            price,
        }
    }
}

/// Normalized order/trade report delivered to the downstream handler.
///
/// Both order acknowledgements and fills arrive as reports; a fill carries
/// `filled_qty`/`trade_price` and, when the venue does not restate the
/// order state on fills, `status == OrdStatus::Unprovided`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdReport {
    /// Internal order id recovered via order-reference correlation
    pub ord_id: OrdId,
    /// Vendor order reference the report arrived under
    pub order_ref: String,
    /// Venue-wide order id, once the exchange assigned one
    pub broker_unique_id: Option<String>,
    pub instrument_code: String,
    pub status: OrdStatus,
    pub side: Option<Side>,
    pub action: Option<TrdAction>,
    /// Cumulative or incremental filled quantity, per venue semantics
    pub filled_qty: u32,
    /// Price of the fill this report describes, if any
    pub trade_price: Option<Decimal>,
    /// `false` only for non-terminal rows of a multi-part query result;
    /// push reports always carry `true`
    pub is_last: bool,
    /// When the gateway produced the report
    pub timestamp: DateTime<Utc>,
}

impl OrdReport {
    /// Report with no fill information, just a status transition
    pub fn status_only(
        ord_id: OrdId,
        order_ref: impl Into<String>,
        instrument_code: impl Into<String>,
        status: OrdStatus,
    ) -> Self {
        Self {
            ord_id,
            order_ref: order_ref.into(),
            broker_unique_id: None,
            instrument_code: instrument_code.into(),
            status,
            side: None,
            action: None,
            filled_qty: 0,
            trade_price: None,
            is_last: true,
            timestamp: Utc::now(),
        }
    }
}
