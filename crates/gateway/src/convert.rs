//! Field-by-field mapping between vendor payloads and domain types.
//!
//! Outbound, orders and cancels are lowered to the vendor's request blocks
//! with the account fields stamped from configuration. Inbound, vendor
//! returns are lifted to [`OrdReport`]/[`MarketDataTick`] after the order
//! reference has been resolved to an internal id; resolution itself lives
//! in the dispatcher.

use chrono::Utc;
use meridian_core::{MarketDataTick, OrdId, OrdReport, OrdStatus, Order};
use meridian_ports::{
    InputOrder, InputOrderAction, VendorOrder, VendorOrderStatus, VendorTick, VendorTrade,
};

use crate::config::GatewayConfig;

/// Lower a new order to the vendor request block
pub fn to_input_order(order: &Order, order_ref: &str, config: &GatewayConfig) -> InputOrder {
    InputOrder {
        order_ref: order_ref.to_string(),
        instrument_code: order.instrument.instrument_code.clone(),
        exchange_code: order.instrument.exchange_code.clone(),
        direction: order.side,
        offset: order.action,
        price: order.price,
        volume: order.qty,
        broker_id: config.broker_id.clone(),
        investor_id: config.investor_id.clone(),
        account_id: config.effective_account_id().to_string(),
        user_id: config.user_id.clone(),
        client_ip: config.client_ip.clone(),
        mac_addr: config.mac_addr.clone(),
    }
}

/// Lower a cancel to the vendor request block. `order_ref` is the
/// reference of the order being cancelled; `action_ref` identifies this
/// cancel itself.
pub fn to_input_order_action(
    order: &Order,
    order_ref: &str,
    action_ref: u64,
    config: &GatewayConfig,
) -> InputOrderAction {
    InputOrderAction {
        order_ref: order_ref.to_string(),
        order_action_ref: action_ref,
        instrument_code: order.instrument.instrument_code.clone(),
        exchange_code: order.instrument.exchange_code.clone(),
        volume_change: order.leaves_qty,
        limit_price: order.price,
        broker_id: config.broker_id.clone(),
        investor_id: config.investor_id.clone(),
        user_id: config.user_id.clone(),
        client_ip: config.client_ip.clone(),
        mac_addr: config.mac_addr.clone(),
    }
}

/// Lift a depth push to the normalized tick
pub fn from_vendor_tick(tick: &VendorTick) -> MarketDataTick {
    MarketDataTick {
        instrument_code: tick.instrument_code.clone(),
        last_price: tick.last_price,
        bid_price: tick.bid_price,
        bid_qty: tick.bid_qty,
        ask_price: tick.ask_price,
        ask_qty: tick.ask_qty,
        volume: tick.volume,
        timestamp: tick.update_time,
    }
}

/// Map the vendor order state onto the internal lifecycle
pub fn map_vendor_status(status: VendorOrderStatus) -> OrdStatus {
    match status {
        VendorOrderStatus::NoTradeQueueing => OrdStatus::New,
        VendorOrderStatus::PartTradedQueueing => OrdStatus::PartiallyFilled,
        VendorOrderStatus::AllTraded => OrdStatus::Filled,
        VendorOrderStatus::Canceled => OrdStatus::Canceled,
        VendorOrderStatus::Unknown => OrdStatus::PendingNew,
    }
}

/// Lift an order return (or an order query row) to a report
pub fn from_vendor_order(order: &VendorOrder, ord_id: OrdId, is_last: bool) -> OrdReport {
    OrdReport {
        ord_id,
        order_ref: order.order_ref.clone(),
        broker_unique_id: if order.order_sys_id.is_empty() {
            None
        } else {
            Some(order.order_sys_id.clone())
        },
        instrument_code: order.instrument_code.clone(),
        status: map_vendor_status(order.status),
        side: Some(order.direction),
        action: Some(order.offset),
        filled_qty: order.volume_traded,
        trade_price: None,
        is_last,
        timestamp: Utc::now(),
    }
}

/// Lift a trade (fill) return to a report.
///
/// The vendor does not restate the order state on fills, so the status is
/// `Unprovided`; the consumer reconciles it with the order returns around
/// it.
pub fn from_vendor_trade(trade: &VendorTrade, ord_id: OrdId) -> OrdReport {
    OrdReport {
        ord_id,
        order_ref: trade.order_ref.clone(),
        broker_unique_id: if trade.order_sys_id.is_empty() {
            None
        } else {
            Some(trade.order_sys_id.clone())
        },
        instrument_code: trade.instrument_code.clone(),
        status: OrdStatus::Unprovided,
        side: Some(trade.direction),
        action: Some(trade.offset),
        filled_qty: trade.volume,
        trade_price: Some(trade.price),
        is_last: true,
        timestamp: trade.trade_time,
    }
}

/// Bounced submission becomes a terminal `NewRejected` report
pub fn from_input_order_reject(order: &InputOrder, ord_id: OrdId) -> OrdReport {
    let mut report = OrdReport::status_only(
        ord_id,
        order.order_ref.clone(),
        order.instrument_code.clone(),
        OrdStatus::NewRejected,
    );
    report.side = Some(order.direction);
    report.action = Some(order.offset);
    report
}

/// Bounced cancel becomes a terminal `CancelRejected` report
pub fn from_order_action_reject(action: &InputOrderAction, ord_id: OrdId) -> OrdReport {
    OrdReport::status_only(
        ord_id,
        action.order_ref.clone(),
        action.instrument_code.clone(),
        OrdStatus::CancelRejected,
    )
}
