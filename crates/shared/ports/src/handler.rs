use meridian_core::{AdaptorEvent, MarketDataTick, OrdReport};

/// Receives normalized market data ticks
pub trait MarketDataHandler {
    fn on_market_data(&self, tick: &MarketDataTick);
}

/// Receives normalized order/trade reports
pub trait OrdReportHandler {
    fn on_ord_report(&self, report: &OrdReport);
}

/// Receives channel availability transitions
pub trait AdaptorEventHandler {
    fn on_adaptor_event(&self, event: &AdaptorEvent);
}

/// The downstream contract the gateway's dispatcher feeds.
///
/// Events are delivered one at a time, from a single thread, in the exact
/// order the gateway buffered them; implementations do not need their own
/// ordering or locking for correctness of the stream itself.
pub trait InboundScheduler:
    MarketDataHandler + OrdReportHandler + AdaptorEventHandler + Send + Sync
{
}

impl<T> InboundScheduler for T where
    T: MarketDataHandler + OrdReportHandler + AdaptorEventHandler + Send + Sync
{
}
