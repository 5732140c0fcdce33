//! Market-data session state machine.
//!
//! Drives login on the market-data channel and keeps the subscription set,
//! so subscriptions made before login (or lost to a reconnect) are replayed
//! on every successful login acknowledgement.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use log::{error, info, warn};
use meridian_ports::{MdApi, MdSpi, RspInfo, RspUserLogin, VendorTick};

use crate::buffer::EventSender;
use crate::config::GatewayConfig;
use crate::messages::{Channel, ConnectionEvent, QueuedEvent, RspMessage};
use crate::session::{AtomicSessionState, SessionState};

pub struct MdSession {
    api: Arc<dyn MdApi>,
    config: Arc<GatewayConfig>,
    tx: EventSender,
    state: AtomicSessionState,
    request_id: AtomicI32,
    /// Everything ever subscribed; replayed in full on each login
    subscriptions: Mutex<BTreeSet<String>>,
}

impl MdSession {
    pub fn new(api: Arc<dyn MdApi>, config: Arc<GatewayConfig>, tx: EventSender) -> Self {
        Self {
            api,
            config,
            tx,
            state: AtomicSessionState::new(),
            request_id: AtomicI32::new(0),
            subscriptions: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.load()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_logged_in()
    }

    fn next_request_id(&self) -> i32 {
        self.request_id.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Record the instruments and subscribe now if the channel is up.
    /// While the channel is down the set is still recorded (it goes out
    /// with the next login), but the call reports `false` like every
    /// other operation against an unavailable channel.
    pub fn subscribe(&self, instruments: &[String]) -> bool {
        {
            let mut set = match self.subscriptions.lock() {
                Ok(set) => set,
                Err(poisoned) => poisoned.into_inner(),
            };
            for code in instruments {
                set.insert(code.clone());
            }
        }
        if !self.is_enabled() {
            warn!(
                "[md] channel not logged in, deferring subscription of {} instrument(s)",
                instruments.len()
            );
            return false;
        }
        match self.api.subscribe_market_data(instruments) {
            Ok(()) => true,
            Err(err) => {
                error!("[md] subscribe request failed: {err}");
                false
            }
        }
    }

    fn replay_subscriptions(&self) {
        let instruments: Vec<String> = {
            let set = match self.subscriptions.lock() {
                Ok(set) => set,
                Err(poisoned) => poisoned.into_inner(),
            };
            set.iter().cloned().collect()
        };
        if instruments.is_empty() {
            return;
        }
        info!("[md] replaying {} subscription(s)", instruments.len());
        if let Err(err) = self.api.subscribe_market_data(&instruments) {
            error!("[md] subscription replay failed: {err}");
        }
    }

    fn enqueue(&self, event: QueuedEvent) {
        if let Err(err) = self.tx.send(event) {
            error!("[md] dropping event, {err}");
        }
    }
}

impl MdSpi for MdSession {
    fn on_front_connected(&self) {
        self.state.store(SessionState::FrontConnected);
        info!("[md] front connected, sending login");
        if let Err(err) = self
            .api
            .req_user_login(&self.config.login_request(), self.next_request_id())
        {
            error!("[md] login request failed: {err}");
        }
    }

    fn on_front_disconnected(&self, reason: i32) {
        let previous = self.state.swap(SessionState::Disconnected);
        warn!("[md] front disconnected, reason={reason}, was {}", previous.as_str());
        if previous == SessionState::LoggedIn {
            self.enqueue(QueuedEvent::of(RspMessage::Connection(
                ConnectionEvent::disabled(Channel::MarketData),
            )));
        }
    }

    fn on_rsp_user_login(&self, rsp: &RspUserLogin, info: &RspInfo) {
        if info.is_error() {
            error!(
                "[md] login rejected, errorId={}, msg={}",
                info.error_id, info.error_msg
            );
            return;
        }
        info!("[md] logged in, tradingDay={}", rsp.trading_day);
        // A duplicated ack must not produce a second Enable
        let previous = self.state.swap(SessionState::LoggedIn);
        if previous != SessionState::LoggedIn {
            self.enqueue(QueuedEvent::of(RspMessage::Connection(
                ConnectionEvent::enabled(Channel::MarketData, None),
            )));
        }
        self.replay_subscriptions();
    }

    fn on_rsp_sub_market_data(&self, instrument_code: &str) {
        info!("[md] subscription confirmed for {instrument_code}");
    }

    fn on_rtn_depth_market_data(&self, tick: &VendorTick) {
        self.enqueue(QueuedEvent::of(RspMessage::Tick(tick.clone())));
    }

    fn on_rsp_error(&self, info: &RspInfo) {
        error!(
            "[md] vendor error, errorId={}, msg={}",
            info.error_id, info.error_msg
        );
    }
}
