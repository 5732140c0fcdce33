//! Logging scheduler.
//!
//! The simplest possible consumer of the gateway's event stream: one log
//! line per event. Stands in for the trading engine in dry runs and
//! during bring-up against a new front.

use log::info;
use meridian_core::{AdaptorEvent, MarketDataTick, OrdReport};
use meridian_ports::{AdaptorEventHandler, MarketDataHandler, OrdReportHandler};

#[derive(Debug, Default)]
pub struct LoggingScheduler;

impl MarketDataHandler for LoggingScheduler {
    fn on_market_data(&self, tick: &MarketDataTick) {
        info!(
            "[feed] {} last={} bid={}x{} ask={}x{} vol={}",
            tick.instrument_code,
            tick.last_price,
            tick.bid_price,
            tick.bid_qty,
            tick.ask_price,
            tick.ask_qty,
            tick.volume
        );
    }
}

impl OrdReportHandler for LoggingScheduler {
    fn on_ord_report(&self, report: &OrdReport) {
        info!(
            "[report] ordId={} orderRef={} status={:?} filled={} isLast={}",
            report.ord_id, report.order_ref, report.status, report.filled_qty, report.is_last
        );
    }
}

impl AdaptorEventHandler for LoggingScheduler {
    fn on_adaptor_event(&self, event: &AdaptorEvent) {
        info!("[status] adaptor={} status={:?}", event.adaptor_id, event.status);
    }
}
