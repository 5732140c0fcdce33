//! Vendor session layer surface.
//!
//! Mirrors the request/callback split of session-oriented exchange SDKs:
//! the application calls `req_*` methods on an API handle, and the vendor
//! runtime answers asynchronously through `on_*` callbacks invoked on the
//! session's own thread. The structs here are the wire-shaped payloads
//! those calls exchange; field-by-field mapping to domain types lives in
//! the gateway.

use chrono::{DateTime, Utc};
use meridian_core::{Side, TrdAction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::VendorResult;

/// User login request, sent on both channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub broker_id: String,
    pub user_id: String,
    pub password: String,
    pub client_ip: String,
    pub mac_addr: String,
}

/// Terminal authentication request (trading channel only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub broker_id: String,
    pub user_id: String,
    pub app_id: String,
    pub auth_code: String,
}

/// Login acknowledgement payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RspUserLogin {
    /// Front machine id, valid for the life of the session
    pub front_id: i32,
    /// Session id assigned by the front
    pub session_id: i32,
    pub trading_day: String,
    /// Highest order reference already used this session, if any
    pub max_order_ref: Option<String>,
}

/// Vendor result descriptor attached to response callbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RspInfo {
    pub error_id: i32,
    pub error_msg: String,
}

impl RspInfo {
    /// A zero error id means success
    pub fn ok() -> Self {
        Self {
            error_id: 0,
            error_msg: String::new(),
        }
    }

    pub fn error(error_id: i32, error_msg: impl Into<String>) -> Self {
        Self {
            error_id,
            error_msg: error_msg.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_id != 0
    }
}

/// Raw depth market data pushed on the market-data channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorTick {
    pub instrument_code: String,
    pub last_price: Decimal,
    pub bid_price: Decimal,
    pub bid_qty: u32,
    pub ask_price: Decimal,
    pub ask_qty: u32,
    pub volume: u64,
    pub update_time: DateTime<Utc>,
}

/// New-order request field block.
///
/// `order_ref` is assigned by the gateway before send; the account block
/// is stamped from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputOrder {
    pub order_ref: String,
    pub instrument_code: String,
    pub exchange_code: String,
    pub direction: Side,
    pub offset: TrdAction,
    pub price: Decimal,
    pub volume: u32,
    pub broker_id: String,
    pub investor_id: String,
    pub account_id: String,
    pub user_id: String,
    pub client_ip: String,
    pub mac_addr: String,
}

/// Cancel (order action) request field block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputOrderAction {
    /// Reference of the order being cancelled
    pub order_ref: String,
    /// Reference of this action itself
    pub order_action_ref: u64,
    pub instrument_code: String,
    pub exchange_code: String,
    /// Quantity still working at the time of the cancel
    pub volume_change: u32,
    pub limit_price: Decimal,
    pub broker_id: String,
    pub investor_id: String,
    pub user_id: String,
    pub client_ip: String,
    pub mac_addr: String,
}

/// Order state as the vendor reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendorOrderStatus {
    /// Accepted, nothing traded yet
    NoTradeQueueing,
    PartTradedQueueing,
    AllTraded,
    Canceled,
    Unknown,
}

/// Order return pushed on the trading channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorOrder {
    pub order_ref: String,
    /// Exchange-assigned order id, empty until accepted by the venue
    pub order_sys_id: String,
    pub instrument_code: String,
    pub investor_id: String,
    pub direction: Side,
    pub offset: TrdAction,
    pub status: VendorOrderStatus,
    pub limit_price: Decimal,
    pub volume_total_original: u32,
    pub volume_traded: u32,
}

/// Trade (fill) return pushed on the trading channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorTrade {
    pub order_ref: String,
    pub order_sys_id: String,
    pub instrument_code: String,
    pub investor_id: String,
    pub direction: Side,
    pub offset: TrdAction,
    pub price: Decimal,
    pub volume: u32,
    pub trade_time: DateTime<Utc>,
}

/// Position query row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorPosition {
    pub investor_id: String,
    pub instrument_code: String,
    pub exchange_code: String,
    pub position: i64,
}

/// Trading-account (balance) query row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorTradingAccount {
    pub account_id: String,
    pub balance: Decimal,
    pub available: Decimal,
    pub currency_id: String,
}

/// Order query request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QryOrder {
    pub broker_id: String,
    pub investor_id: String,
    pub exchange_code: String,
}

/// Position query request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QryPosition {
    pub broker_id: String,
    pub investor_id: String,
    pub exchange_code: String,
    pub instrument_code: String,
}

/// Trading-account query request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QryTradingAccount {
    pub broker_id: String,
    pub investor_id: String,
    pub account_id: String,
    pub currency_id: String,
}

/// Outbound surface of the market-data session.
///
/// `connect` returns once the session loop is running; connection progress
/// is reported through [`MdSpi::on_front_connected`].
pub trait MdApi: Send + Sync {
    /// Register the callback sink. Must be called before `connect`.
    fn register_spi(&self, spi: Arc<dyn MdSpi>);

    /// Start the session loop against the configured front address
    fn connect(&self) -> VendorResult<()>;

    fn req_user_login(&self, req: &LoginRequest, request_id: i32) -> VendorResult<()>;

    fn subscribe_market_data(&self, instruments: &[String]) -> VendorResult<()>;
}

/// Callbacks delivered by the market-data session thread
pub trait MdSpi: Send + Sync {
    fn on_front_connected(&self);

    /// `reason` is the vendor's disconnect code
    fn on_front_disconnected(&self, reason: i32);

    fn on_rsp_user_login(&self, rsp: &RspUserLogin, info: &RspInfo);

    fn on_rsp_sub_market_data(&self, instrument_code: &str);

    fn on_rtn_depth_market_data(&self, tick: &VendorTick);

    fn on_rsp_error(&self, info: &RspInfo);
}

/// Outbound surface of the trading session
pub trait TraderApi: Send + Sync {
    /// Register the callback sink. Must be called before `connect`.
    fn register_spi(&self, spi: Arc<dyn TraderSpi>);

    /// Start the session loop against the configured front address
    fn connect(&self) -> VendorResult<()>;

    fn req_authenticate(&self, req: &AuthRequest, request_id: i32) -> VendorResult<()>;

    fn req_user_login(&self, req: &LoginRequest, request_id: i32) -> VendorResult<()>;

    fn req_order_insert(&self, order: &InputOrder, request_id: i32) -> VendorResult<()>;

    fn req_order_action(&self, action: &InputOrderAction, request_id: i32) -> VendorResult<()>;

    fn req_qry_order(&self, qry: &QryOrder, request_id: i32) -> VendorResult<()>;

    fn req_qry_position(&self, qry: &QryPosition, request_id: i32) -> VendorResult<()>;

    fn req_qry_trading_account(&self, qry: &QryTradingAccount, request_id: i32)
    -> VendorResult<()>;
}

/// Callbacks delivered by the trading session thread
pub trait TraderSpi: Send + Sync {
    fn on_front_connected(&self);

    fn on_front_disconnected(&self, reason: i32);

    fn on_rsp_authenticate(&self, info: &RspInfo);

    fn on_rsp_user_login(&self, rsp: &RspUserLogin, info: &RspInfo);

    /// Order submission bounced by the vendor gateway before reaching the
    /// exchange
    fn on_rsp_order_insert(&self, order: &InputOrder, info: &RspInfo);

    /// Order submission bounced by the exchange itself
    fn on_err_rtn_order_insert(&self, order: &InputOrder, info: &RspInfo);

    fn on_rtn_order(&self, order: &VendorOrder);

    fn on_rtn_trade(&self, trade: &VendorTrade);

    /// Cancel bounced by the vendor gateway
    fn on_rsp_order_action(&self, action: &InputOrderAction, info: &RspInfo);

    /// Cancel bounced by the exchange
    fn on_err_rtn_order_action(&self, action: &InputOrderAction, info: &RspInfo);

    fn on_rsp_qry_order(&self, order: &VendorOrder, is_last: bool);

    fn on_rsp_qry_position(&self, position: &VendorPosition, is_last: bool);

    fn on_rsp_qry_trading_account(&self, account: &VendorTradingAccount, is_last: bool);

    fn on_rsp_error(&self, info: &RspInfo);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsp_info_error_flag() {
        assert!(!RspInfo::ok().is_error());
        assert!(RspInfo::error(3, "invalid login").is_error());
    }
}
