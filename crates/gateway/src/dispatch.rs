//! Event dispatcher.
//!
//! The single consumer of the inbound buffer. Runs on its own named
//! thread, dequeues in FIFO order, classifies each vendor message, and
//! hands the normalized result to the downstream [`InboundScheduler`].
//! Because there is exactly one consumer, downstream handlers observe
//! events in precisely the order the sessions buffered them.
//!
//! A message that cannot be correlated (no registry entry for its order
//! reference) is logged and dropped; it belongs to another session or
//! another process and must not reach the engine with a fabricated id.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};
use meridian_core::{AdaptorEvent, AdaptorStatus};
use meridian_ports::InboundScheduler;

use crate::buffer::EventReceiver;
use crate::convert;
use crate::messages::{Channel, ConnectionEvent, QueuedEvent, RspMessage};
use crate::orderref::OrderRefRegistry;

pub struct EventDispatcher {
    adaptor_id: String,
    registry: Arc<OrderRefRegistry>,
    scheduler: Arc<dyn InboundScheduler>,
}

impl EventDispatcher {
    pub fn new(
        adaptor_id: impl Into<String>,
        registry: Arc<OrderRefRegistry>,
        scheduler: Arc<dyn InboundScheduler>,
    ) -> Self {
        Self {
            adaptor_id: adaptor_id.into(),
            registry,
            scheduler,
        }
    }

    /// Start the consumer thread. It runs until every producer handle has
    /// been dropped and the buffer is drained.
    pub fn spawn(self, mut rx: EventReceiver) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("gateway-dispatch".to_string())
            .spawn(move || {
                info!("[dispatch] consumer thread started");
                while let Some(event) = rx.recv() {
                    self.dispatch(event);
                }
                info!("[dispatch] buffer closed, consumer thread exiting");
            })
    }

    /// Classify and deliver one buffered event
    pub fn dispatch(&self, event: QueuedEvent) {
        match event.msg {
            RspMessage::Connection(conn) => self.dispatch_connection(conn),
            RspMessage::Tick(tick) => {
                self.scheduler.on_market_data(&convert::from_vendor_tick(&tick));
            }
            RspMessage::Order(order) => match self.registry.ord_id(&order.order_ref) {
                Ok(ord_id) => {
                    self.scheduler
                        .on_ord_report(&convert::from_vendor_order(&order, ord_id, true));
                }
                Err(err) => warn!("[dispatch] dropping order return, {err}"),
            },
            RspMessage::Trade(trade) => match self.registry.ord_id(&trade.order_ref) {
                Ok(ord_id) => {
                    self.scheduler
                        .on_ord_report(&convert::from_vendor_trade(&trade, ord_id));
                }
                Err(err) => warn!("[dispatch] dropping trade return, {err}"),
            },
            RspMessage::InputOrderReject { order, info } => {
                match self.registry.ord_id(&order.order_ref) {
                    Ok(ord_id) => {
                        error!(
                            "[dispatch] order rejected, ordId={}, errorId={}, msg={}",
                            ord_id, info.error_id, info.error_msg
                        );
                        self.scheduler
                            .on_ord_report(&convert::from_input_order_reject(&order, ord_id));
                    }
                    Err(err) => warn!("[dispatch] dropping order reject, {err}"),
                }
            }
            RspMessage::OrderActionReject { action, info } => {
                match self.registry.ord_id(&action.order_ref) {
                    Ok(ord_id) => {
                        error!(
                            "[dispatch] cancel rejected, ordId={}, errorId={}, msg={}",
                            ord_id, info.error_id, info.error_msg
                        );
                        self.scheduler
                            .on_ord_report(&convert::from_order_action_reject(&action, ord_id));
                    }
                    Err(err) => warn!("[dispatch] dropping action reject, {err}"),
                }
            }
            RspMessage::QryOrder(order) => match self.registry.ord_id(&order.order_ref) {
                Ok(ord_id) => {
                    self.scheduler.on_ord_report(&convert::from_vendor_order(
                        &order,
                        ord_id,
                        event.is_last,
                    ));
                }
                // Query results include orders from other sessions
                Err(err) => debug!("[dispatch] skipping foreign order row, {err}"),
            },
            RspMessage::QryPosition(position) => {
                info!(
                    "[dispatch] position row, instrument={}, position={}, isLast={}",
                    position.instrument_code, position.position, event.is_last
                );
            }
            RspMessage::QryTradingAccount(account) => {
                info!(
                    "[dispatch] balance row, accountId={}, balance={}, available={}, isLast={}",
                    account.account_id, account.balance, account.available, event.is_last
                );
            }
        }
    }

    fn dispatch_connection(&self, conn: ConnectionEvent) {
        let status = match (conn.channel, conn.available) {
            (Channel::MarketData, true) => AdaptorStatus::MdEnable,
            (Channel::MarketData, false) => AdaptorStatus::MdDisable,
            (Channel::Trader, true) => AdaptorStatus::TraderEnable,
            (Channel::Trader, false) => AdaptorStatus::TraderDisable,
        };
        if let Some(identity) = conn.identity {
            info!(
                "[dispatch] {} channel enabled, frontId={}, sessionId={}",
                conn.channel, identity.front_id, identity.session_id
            );
        }
        self.scheduler
            .on_adaptor_event(&AdaptorEvent::new(self.adaptor_id.clone(), status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use meridian_core::{MarketDataTick, OrdReport, OrdStatus, Side, TrdAction};
    use meridian_ports::{
        AdaptorEventHandler, MarketDataHandler, OrdReportHandler, VendorOrder, VendorOrderStatus,
        VendorTick, VendorTrade,
    };
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        ticks: Mutex<Vec<MarketDataTick>>,
        reports: Mutex<Vec<OrdReport>>,
        events: Mutex<Vec<AdaptorEvent>>,
    }

    impl MarketDataHandler for Recorder {
        fn on_market_data(&self, tick: &MarketDataTick) {
            self.ticks.lock().unwrap().push(tick.clone());
        }
    }

    impl OrdReportHandler for Recorder {
        fn on_ord_report(&self, report: &OrdReport) {
            self.reports.lock().unwrap().push(report.clone());
        }
    }

    impl AdaptorEventHandler for Recorder {
        fn on_adaptor_event(&self, event: &AdaptorEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn dispatcher() -> (EventDispatcher, Arc<OrderRefRegistry>, Arc<Recorder>) {
        let registry = Arc::new(OrderRefRegistry::new());
        let recorder = Arc::new(Recorder::default());
        let dispatcher = EventDispatcher::new("gw-test", registry.clone(), recorder.clone());
        (dispatcher, registry, recorder)
    }

    fn vendor_order(order_ref: &str) -> VendorOrder {
        VendorOrder {
            order_ref: order_ref.to_string(),
            order_sys_id: "SYS-1".into(),
            instrument_code: "rb2410".into(),
            investor_id: "000042".into(),
            direction: Side::Buy,
            offset: TrdAction::Open,
            status: VendorOrderStatus::NoTradeQueueing,
            limit_price: dec!(3500),
            volume_total_original: 5,
            volume_traded: 0,
        }
    }

    #[test]
    fn test_connection_events_map_to_statuses() {
        let (dispatcher, _, recorder) = dispatcher();
        dispatcher.dispatch(QueuedEvent::of(RspMessage::Connection(
            ConnectionEvent::enabled(Channel::Trader, None),
        )));
        dispatcher.dispatch(QueuedEvent::of(RspMessage::Connection(
            ConnectionEvent::disabled(Channel::MarketData),
        )));

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status, AdaptorStatus::TraderEnable);
        assert_eq!(events[0].adaptor_id, "gw-test");
        assert_eq!(events[1].status, AdaptorStatus::MdDisable);
    }

    #[test]
    fn test_tick_is_normalized_and_delivered() {
        let (dispatcher, _, recorder) = dispatcher();
        dispatcher.dispatch(QueuedEvent::of(RspMessage::Tick(VendorTick {
            instrument_code: "rb2410".into(),
            last_price: dec!(3501),
            bid_price: dec!(3500),
            bid_qty: 10,
            ask_price: dec!(3502),
            ask_qty: 3,
            volume: 9001,
            update_time: Utc::now(),
        })));

        let ticks = recorder.ticks.lock().unwrap();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].instrument_code, "rb2410");
        assert_eq!(ticks[0].volume, 9001);
    }

    #[test]
    fn test_order_return_correlated_through_registry() {
        let (dispatcher, registry, recorder) = dispatcher();
        registry.put("100001", 17);

        dispatcher.dispatch(QueuedEvent::of(RspMessage::Order(vendor_order("100001"))));

        let reports = recorder.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].ord_id, 17);
        assert_eq!(reports[0].status, OrdStatus::New);
    }

    #[test]
    fn test_unknown_order_ref_is_dropped() {
        let (dispatcher, _, recorder) = dispatcher();
        dispatcher.dispatch(QueuedEvent::of(RspMessage::Order(vendor_order("999"))));
        assert!(recorder.reports.lock().unwrap().is_empty());
    }

    #[test]
    fn test_trade_return_becomes_fill_report() {
        let (dispatcher, registry, recorder) = dispatcher();
        registry.put("100001", 17);

        dispatcher.dispatch(QueuedEvent::of(RspMessage::Trade(VendorTrade {
            order_ref: "100001".into(),
            order_sys_id: "SYS-1".into(),
            instrument_code: "rb2410".into(),
            investor_id: "000042".into(),
            direction: Side::Buy,
            offset: TrdAction::Open,
            price: dec!(3500),
            volume: 2,
            trade_time: Utc::now(),
        })));

        let reports = recorder.reports.lock().unwrap();
        assert_eq!(reports[0].status, OrdStatus::Unprovided);
        assert_eq!(reports[0].filled_qty, 2);
        assert_eq!(reports[0].trade_price, Some(dec!(3500)));
    }

    #[test]
    fn test_query_rows_forward_is_last_flag() {
        let (dispatcher, registry, recorder) = dispatcher();
        registry.put("100001", 17);
        registry.put("100002", 18);

        dispatcher.dispatch(QueuedEvent::part(
            RspMessage::QryOrder(vendor_order("100001")),
            false,
        ));
        dispatcher.dispatch(QueuedEvent::part(
            RspMessage::QryOrder(vendor_order("100002")),
            true,
        ));

        let reports = recorder.reports.lock().unwrap();
        assert_eq!(reports.len(), 2);
        assert!(!reports[0].is_last);
        assert!(reports[1].is_last);
    }
}
