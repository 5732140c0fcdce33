//! Gateway facade.
//!
//! The one type the trading engine talks to. Construction wires the two
//! session machines, the inbound buffer and the dispatcher; [`Gateway::startup`]
//! brings the channels up (trading first, market data after a stagger).
//!
//! Every operation returns `bool`: `true` means the request was handed to
//! the vendor session layer, `false` means it was refused locally (channel
//! down, correlation miss, send failure) and the reason was logged. Nothing
//! here panics on a vendor fault.
//!
//! Ordering contract for submissions: the order reference is registered
//! *before* the request is sent, so even an immediate vendor callback can
//! resolve it.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::{error, info, warn};
use meridian_core::{Order, StrategyId};
use meridian_ports::{InboundScheduler, MdApi, TraderApi};

use crate::buffer;
use crate::config::GatewayConfig;
use crate::convert;
use crate::dispatch::EventDispatcher;
use crate::error::GatewayError;
use crate::messages::{Channel, SessionIdentity};
use crate::orderref::{OrderRefGenerator, OrderRefRegistry};
use crate::session::{MdSession, TraderSession};

/// Room for one million references per strategy per day
const ORDER_REF_STRIDE: u64 = 1_000_000;

pub struct Gateway {
    config: Arc<GatewayConfig>,
    md_api: Arc<dyn MdApi>,
    trader_api: Arc<dyn TraderApi>,
    md_session: Arc<MdSession>,
    trader_session: Arc<TraderSession>,
    registry: Arc<OrderRefRegistry>,
    generator: OrderRefGenerator,
    /// Serializes query traffic; the vendor throttles query requests hard
    query_lock: Arc<Mutex<()>>,
    /// Consumed by `startup`
    pending: Mutex<Option<(EventDispatcher, buffer::EventReceiver)>>,
}

impl Gateway {
    pub fn new(
        config: GatewayConfig,
        md_api: Arc<dyn MdApi>,
        trader_api: Arc<dyn TraderApi>,
        scheduler: Arc<dyn InboundScheduler>,
    ) -> Self {
        let config = Arc::new(config);
        let (tx, rx) = buffer::bounded(config.buffer_capacity);

        let md_session = Arc::new(MdSession::new(md_api.clone(), config.clone(), tx.clone()));
        let trader_session = Arc::new(TraderSession::new(
            trader_api.clone(),
            config.clone(),
            tx,
        ));
        md_api.register_spi(md_session.clone());
        trader_api.register_spi(trader_session.clone());

        let registry = Arc::new(OrderRefRegistry::new());
        let dispatcher = EventDispatcher::new(config.adaptor_id(), registry.clone(), scheduler);

        Self {
            config,
            md_api,
            trader_api,
            md_session,
            trader_session,
            registry,
            generator: OrderRefGenerator::new(),
            query_lock: Arc::new(Mutex::new(())),
            pending: Mutex::new(Some((dispatcher, rx))),
        }
    }

    pub fn adaptor_id(&self) -> String {
        self.config.adaptor_id()
    }

    pub fn is_md_enabled(&self) -> bool {
        self.md_session.is_enabled()
    }

    pub fn is_trader_enabled(&self) -> bool {
        self.trader_session.is_enabled()
    }

    /// Front/session identity of the live trading session
    pub fn trader_identity(&self) -> Option<SessionIdentity> {
        self.trader_session.identity()
    }

    fn ensure_trader_up(&self) -> Result<(), GatewayError> {
        if self.trader_session.is_enabled() {
            Ok(())
        } else {
            Err(GatewayError::ChannelUnavailable(Channel::Trader))
        }
    }

    /// Start the dispatcher thread and bring both channels up. The trading
    /// session connects first; the market-data session follows after the
    /// configured stagger so the trading channel settles before ticks flow.
    pub fn startup(&self) -> Result<(), GatewayError> {
        let taken = match self.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some((dispatcher, rx)) = taken {
            dispatcher.spawn(rx)?;
        } else {
            warn!("[gateway] startup called twice, ignoring");
            return Ok(());
        }

        let account = self.config.account();
        info!(
            "[gateway] {} starting for investor {} (account {}), trading channel first",
            self.adaptor_id(),
            account.investor_id,
            account.account_id
        );
        self.trader_api.connect()?;
        thread::sleep(Duration::from_millis(self.config.startup_stagger_ms));
        self.md_api.connect()?;
        Ok(())
    }

    /// Subscribe to market data. Returns `false` while the channel is
    /// down; the instruments are still remembered and replayed on the
    /// next login.
    pub fn subscribe_market_data(&self, instruments: &[String]) -> bool {
        self.md_session.subscribe(instruments)
    }

    /// Submit a new order. Registers the order-reference mapping before the
    /// request leaves, and refuses locally when the trading channel is down.
    pub fn submit_order(&self, order: &Order) -> bool {
        if let Err(err) = self.ensure_trader_up() {
            warn!("[gateway] refusing order, ordId={}: {err}", order.ord_id);
            return false;
        }
        let order_ref = self.make_order_ref(order.strategy_id);
        self.registry.put(&order_ref, order.ord_id);

        let input = convert::to_input_order(order, &order_ref, &self.config);
        match self
            .trader_api
            .req_order_insert(&input, self.trader_session.next_request_id())
        {
            Ok(()) => {
                info!(
                    "[gateway] order sent, ordId={}, orderRef={}, instrument={}",
                    order.ord_id, order_ref, input.instrument_code
                );
                true
            }
            Err(err) => {
                error!("[gateway] order insert failed, ordId={}: {err}", order.ord_id);
                false
            }
        }
    }

    /// Cancel a working order. Fails locally when the channel is down or
    /// the order was never registered by this gateway.
    pub fn cancel_order(&self, order: &Order) -> bool {
        if let Err(err) = self.ensure_trader_up() {
            warn!("[gateway] refusing cancel, ordId={}: {err}", order.ord_id);
            return false;
        }
        let order_ref = match self.registry.order_ref(order.ord_id) {
            Ok(order_ref) => order_ref,
            Err(err) => {
                error!("[gateway] refusing cancel, {err}");
                return false;
            }
        };

        let action_ref = self.generator.next(order.strategy_id);
        let action = convert::to_input_order_action(order, &order_ref, action_ref, &self.config);
        match self
            .trader_api
            .req_order_action(&action, self.trader_session.next_request_id())
        {
            Ok(()) => {
                info!(
                    "[gateway] cancel sent, ordId={}, orderRef={order_ref}",
                    order.ord_id
                );
                true
            }
            Err(err) => {
                error!("[gateway] order action failed, ordId={}: {err}", order.ord_id);
                false
            }
        }
    }

    /// Request the working-order snapshot. Runs on a worker thread behind
    /// the query lock, after the configured settle delay.
    pub fn query_orders(&self) -> bool {
        if let Err(err) = self.ensure_trader_up() {
            warn!("[gateway] refusing order query: {err}");
            return false;
        }
        let qry = self.config.qry_order();
        let request_id = self.trader_session.next_request_id();
        match self.spawn_query("qry-order", move |api| api.req_qry_order(&qry, request_id)) {
            Ok(()) => true,
            Err(err) => {
                error!("[gateway] order query failed: {err}");
                false
            }
        }
    }

    /// Request the position snapshot for one instrument
    pub fn query_positions(&self, instrument_code: &str) -> bool {
        if let Err(err) = self.ensure_trader_up() {
            warn!("[gateway] refusing position query: {err}");
            return false;
        }
        let qry = self.config.qry_position(instrument_code);
        let request_id = self.trader_session.next_request_id();
        match self.spawn_query("qry-position", move |api| {
            api.req_qry_position(&qry, request_id)
        }) {
            Ok(()) => true,
            Err(err) => {
                error!("[gateway] position query failed: {err}");
                false
            }
        }
    }

    /// Request the account balance snapshot
    pub fn query_balance(&self) -> bool {
        if let Err(err) = self.ensure_trader_up() {
            warn!("[gateway] refusing balance query: {err}");
            return false;
        }
        let qry = self.config.qry_trading_account();
        let request_id = self.trader_session.next_request_id();
        match self.spawn_query("qry-balance", move |api| {
            api.req_qry_trading_account(&qry, request_id)
        }) {
            Ok(()) => true,
            Err(err) => {
                error!("[gateway] balance query failed: {err}");
                false
            }
        }
    }

    /// Unique vendor order reference, strategy-partitioned so two
    /// strategies can never collide
    fn make_order_ref(&self, strategy_id: StrategyId) -> String {
        let seq = self.generator.next(strategy_id);
        (u64::from(strategy_id) * ORDER_REF_STRIDE + seq).to_string()
    }

    fn spawn_query<F>(&self, name: &str, send: F) -> Result<(), GatewayError>
    where
        F: FnOnce(&dyn TraderApi) -> meridian_ports::VendorResult<()> + Send + 'static,
    {
        let api = self.trader_api.clone();
        let lock = self.query_lock.clone();
        let delay = Duration::from_millis(self.config.query_delay_ms);
        let name = name.to_string();
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let _guard = match lock.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                thread::sleep(delay);
                if let Err(err) = send(api.as_ref()) {
                    error!("[gateway] {name} send failed: {err}");
                }
            })?;
        Ok(())
    }
}
