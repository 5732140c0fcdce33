//! Buffered message types.
//!
//! Everything a vendor callback produces is wrapped into one [`RspMessage`]
//! variant and queued as a [`QueuedEvent`]; classification happens later on
//! the dispatcher thread, never on the vendor's session threads.

use meridian_ports::{
    InputOrder, InputOrderAction, RspInfo, VendorOrder, VendorPosition, VendorTick, VendorTrade,
    VendorTradingAccount,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two independent vendor sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    MarketData,
    Trader,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarketData => "md",
            Self::Trader => "trader",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a live trading session, valid only while logged in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub front_id: i32,
    pub session_id: i32,
}

/// Channel availability transition, emitted by the owning session machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEvent {
    pub channel: Channel,
    pub available: bool,
    /// Present on trading-channel enable events
    pub identity: Option<SessionIdentity>,
}

impl ConnectionEvent {
    pub fn enabled(channel: Channel, identity: Option<SessionIdentity>) -> Self {
        Self {
            channel,
            available: true,
            identity,
        }
    }

    pub fn disabled(channel: Channel) -> Self {
        Self {
            channel,
            available: false,
            identity: None,
        }
    }
}

/// Tagged union over every payload kind the vendor can deliver.
///
/// Each instance carries exactly one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RspMessage {
    /// Channel went up or down
    Connection(ConnectionEvent),
    /// Market data push
    Tick(VendorTick),
    /// Order return (acknowledgement / state change)
    Order(VendorOrder),
    /// Trade (fill) return
    Trade(VendorTrade),
    /// Order submission bounced before acceptance
    InputOrderReject { order: InputOrder, info: RspInfo },
    /// Cancel request bounced
    OrderActionReject {
        action: InputOrderAction,
        info: RspInfo,
    },
    /// Row of an order query result set
    QryOrder(VendorOrder),
    /// Row of a position query result set
    QryPosition(VendorPosition),
    /// Row of a balance query result set
    QryTradingAccount(VendorTradingAccount),
}

impl RspMessage {
    /// Short tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Tick(_) => "tick",
            Self::Order(_) => "order",
            Self::Trade(_) => "trade",
            Self::InputOrderReject { .. } => "input-order-reject",
            Self::OrderActionReject { .. } => "order-action-reject",
            Self::QryOrder(_) => "qry-order",
            Self::QryPosition(_) => "qry-position",
            Self::QryTradingAccount(_) => "qry-trading-account",
        }
    }
}

/// One buffered vendor message plus the terminal-row flag.
///
/// `is_last` matters only for multi-part query results; push messages
/// always carry `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedEvent {
    pub msg: RspMessage,
    pub is_last: bool,
}

impl QueuedEvent {
    /// Wrap a push message (single-part, `is_last = true`)
    pub fn of(msg: RspMessage) -> Self {
        Self { msg, is_last: true }
    }

    /// Wrap one row of a multi-part query result
    pub fn part(msg: RspMessage, is_last: bool) -> Self {
        Self { msg, is_last }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_event_constructors() {
        let up = ConnectionEvent::enabled(
            Channel::Trader,
            Some(SessionIdentity {
                front_id: 7,
                session_id: 3,
            }),
        );
        assert!(up.available);
        assert_eq!(up.identity.map(|i| i.front_id), Some(7));

        let down = ConnectionEvent::disabled(Channel::MarketData);
        assert!(!down.available);
        assert!(down.identity.is_none());
    }

    #[test]
    fn test_queued_event_flags() {
        let ev = QueuedEvent::of(RspMessage::Connection(ConnectionEvent::disabled(
            Channel::Trader,
        )));
        assert!(ev.is_last);
        assert_eq!(ev.msg.kind(), "connection");
    }
}
