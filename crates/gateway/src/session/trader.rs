//! Trading session state machine.
//!
//! Walks the connect -> (authenticate) -> login ladder and enqueues every
//! trading callback onto the inbound buffer. The authenticate step runs
//! only when an auth code is configured; without one the session logs in
//! straight from the front-connected state.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use log::{error, info, warn};
use meridian_ports::{
    InputOrder, InputOrderAction, RspInfo, RspUserLogin, TraderApi, TraderSpi, VendorOrder,
    VendorPosition, VendorTrade, VendorTradingAccount,
};

use crate::buffer::EventSender;
use crate::config::GatewayConfig;
use crate::messages::{Channel, ConnectionEvent, QueuedEvent, RspMessage, SessionIdentity};
use crate::session::{AtomicSessionState, SessionState};

pub struct TraderSession {
    api: Arc<dyn TraderApi>,
    config: Arc<GatewayConfig>,
    tx: EventSender,
    state: AtomicSessionState,
    request_id: AtomicI32,
    /// Set on login ack, cleared on disconnect
    identity: Mutex<Option<SessionIdentity>>,
}

impl TraderSession {
    pub fn new(api: Arc<dyn TraderApi>, config: Arc<GatewayConfig>, tx: EventSender) -> Self {
        Self {
            api,
            config,
            tx,
            state: AtomicSessionState::new(),
            request_id: AtomicI32::new(0),
            identity: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.load()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_logged_in()
    }

    /// Identity of the live session, while logged in
    pub fn identity(&self) -> Option<SessionIdentity> {
        match self.identity.lock() {
            Ok(identity) => *identity,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Next request sequence number on this channel
    pub fn next_request_id(&self) -> i32 {
        self.request_id.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn set_identity(&self, value: Option<SessionIdentity>) {
        match self.identity.lock() {
            Ok(mut identity) => *identity = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    fn send_login(&self) {
        if let Err(err) = self
            .api
            .req_user_login(&self.config.login_request(), self.next_request_id())
        {
            error!("[trader] login request failed: {err}");
        }
    }

    fn enqueue(&self, event: QueuedEvent) {
        if let Err(err) = self.tx.send(event) {
            error!("[trader] dropping event, {err}");
        }
    }
}

impl TraderSpi for TraderSession {
    fn on_front_connected(&self) {
        match self.config.auth_request() {
            Some(auth) => {
                self.state.store(SessionState::Authenticating);
                info!("[trader] front connected, sending authenticate");
                if let Err(err) = self.api.req_authenticate(&auth, self.next_request_id()) {
                    error!("[trader] authenticate request failed: {err}");
                }
            }
            None => {
                self.state.store(SessionState::FrontConnected);
                info!("[trader] front connected, sending login");
                self.send_login();
            }
        }
    }

    fn on_front_disconnected(&self, reason: i32) {
        let previous = self.state.swap(SessionState::Disconnected);
        self.set_identity(None);
        warn!(
            "[trader] front disconnected, reason={reason}, was {}",
            previous.as_str()
        );
        if previous == SessionState::LoggedIn {
            self.enqueue(QueuedEvent::of(RspMessage::Connection(
                ConnectionEvent::disabled(Channel::Trader),
            )));
        }
    }

    fn on_rsp_authenticate(&self, info: &RspInfo) {
        if info.is_error() {
            error!(
                "[trader] authenticate rejected, errorId={}, msg={}",
                info.error_id, info.error_msg
            );
            return;
        }
        info!("[trader] authenticated, sending login");
        self.state.store(SessionState::FrontConnected);
        self.send_login();
    }

    fn on_rsp_user_login(&self, rsp: &RspUserLogin, info: &RspInfo) {
        if info.is_error() {
            error!(
                "[trader] login rejected, errorId={}, msg={}",
                info.error_id, info.error_msg
            );
            return;
        }
        let identity = SessionIdentity {
            front_id: rsp.front_id,
            session_id: rsp.session_id,
        };
        info!(
            "[trader] logged in, frontId={}, sessionId={}, tradingDay={}",
            identity.front_id, identity.session_id, rsp.trading_day
        );
        self.set_identity(Some(identity));
        // A duplicated ack must not produce a second Enable
        let previous = self.state.swap(SessionState::LoggedIn);
        if previous != SessionState::LoggedIn {
            self.enqueue(QueuedEvent::of(RspMessage::Connection(
                ConnectionEvent::enabled(Channel::Trader, Some(identity)),
            )));
        }
    }

    fn on_rsp_order_insert(&self, order: &InputOrder, info: &RspInfo) {
        warn!(
            "[trader] order insert bounced by gateway, orderRef={}, errorId={}",
            order.order_ref, info.error_id
        );
        self.enqueue(QueuedEvent::of(RspMessage::InputOrderReject {
            order: order.clone(),
            info: info.clone(),
        }));
    }

    fn on_err_rtn_order_insert(&self, order: &InputOrder, info: &RspInfo) {
        warn!(
            "[trader] order insert bounced by exchange, orderRef={}, errorId={}",
            order.order_ref, info.error_id
        );
        self.enqueue(QueuedEvent::of(RspMessage::InputOrderReject {
            order: order.clone(),
            info: info.clone(),
        }));
    }

    fn on_rtn_order(&self, order: &VendorOrder) {
        self.enqueue(QueuedEvent::of(RspMessage::Order(order.clone())));
    }

    fn on_rtn_trade(&self, trade: &VendorTrade) {
        self.enqueue(QueuedEvent::of(RspMessage::Trade(trade.clone())));
    }

    fn on_rsp_order_action(&self, action: &InputOrderAction, info: &RspInfo) {
        warn!(
            "[trader] order action bounced by gateway, orderRef={}, errorId={}",
            action.order_ref, info.error_id
        );
        self.enqueue(QueuedEvent::of(RspMessage::OrderActionReject {
            action: action.clone(),
            info: info.clone(),
        }));
    }

    fn on_err_rtn_order_action(&self, action: &InputOrderAction, info: &RspInfo) {
        warn!(
            "[trader] order action bounced by exchange, orderRef={}, errorId={}",
            action.order_ref, info.error_id
        );
        self.enqueue(QueuedEvent::of(RspMessage::OrderActionReject {
            action: action.clone(),
            info: info.clone(),
        }));
    }

    fn on_rsp_qry_order(&self, order: &VendorOrder, is_last: bool) {
        self.enqueue(QueuedEvent::part(
            RspMessage::QryOrder(order.clone()),
            is_last,
        ));
    }

    fn on_rsp_qry_position(&self, position: &VendorPosition, is_last: bool) {
        self.enqueue(QueuedEvent::part(
            RspMessage::QryPosition(position.clone()),
            is_last,
        ));
    }

    fn on_rsp_qry_trading_account(&self, account: &VendorTradingAccount, is_last: bool) {
        self.enqueue(QueuedEvent::part(
            RspMessage::QryTradingAccount(account.clone()),
            is_last,
        ));
    }

    fn on_rsp_error(&self, info: &RspInfo) {
        error!(
            "[trader] vendor error, errorId={}, msg={}",
            info.error_id, info.error_msg
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{self, EventReceiver};
    use meridian_ports::{
        AuthRequest, LoginRequest, QryOrder, QryPosition, QryTradingAccount, VendorResult,
    };

    struct StubTraderApi;

    impl TraderApi for StubTraderApi {
        fn register_spi(&self, _spi: Arc<dyn TraderSpi>) {}

        fn connect(&self) -> VendorResult<()> {
            Ok(())
        }

        fn req_authenticate(&self, _req: &AuthRequest, _request_id: i32) -> VendorResult<()> {
            Ok(())
        }

        fn req_user_login(&self, _req: &LoginRequest, _request_id: i32) -> VendorResult<()> {
            Ok(())
        }

        fn req_order_insert(&self, _order: &InputOrder, _request_id: i32) -> VendorResult<()> {
            Ok(())
        }

        fn req_order_action(
            &self,
            _action: &InputOrderAction,
            _request_id: i32,
        ) -> VendorResult<()> {
            Ok(())
        }

        fn req_qry_order(&self, _qry: &QryOrder, _request_id: i32) -> VendorResult<()> {
            Ok(())
        }

        fn req_qry_position(&self, _qry: &QryPosition, _request_id: i32) -> VendorResult<()> {
            Ok(())
        }

        fn req_qry_trading_account(
            &self,
            _qry: &QryTradingAccount,
            _request_id: i32,
        ) -> VendorResult<()> {
            Ok(())
        }
    }

    fn session() -> (TraderSession, EventReceiver) {
        let (tx, rx) = buffer::bounded(8);
        let session = TraderSession::new(
            Arc::new(StubTraderApi),
            Arc::new(crate::config::GatewayConfig::default()),
            tx,
        );
        (session, rx)
    }

    fn login_ack() -> RspUserLogin {
        RspUserLogin {
            front_id: 7,
            session_id: 3,
            trading_day: "20260831".to_string(),
            max_order_ref: None,
        }
    }

    fn connection_events(rx: &mut EventReceiver) -> usize {
        let mut count = 0;
        while let Some(event) = rx.try_recv() {
            if matches!(event.msg, RspMessage::Connection(_)) {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn test_duplicate_login_ack_emits_single_enable() {
        let (session, mut rx) = session();

        session.on_rsp_user_login(&login_ack(), &RspInfo::ok());
        session.on_rsp_user_login(&login_ack(), &RspInfo::ok());

        assert_eq!(connection_events(&mut rx), 1);
        assert!(session.is_enabled());
        assert_eq!(session.identity().map(|i| i.front_id), Some(7));
    }

    #[test]
    fn test_disconnect_clears_identity_and_emits_once() {
        let (session, mut rx) = session();
        session.on_rsp_user_login(&login_ack(), &RspInfo::ok());
        assert_eq!(connection_events(&mut rx), 1);

        session.on_front_disconnected(129);
        // Second disconnect while already down is silent
        session.on_front_disconnected(129);

        assert_eq!(connection_events(&mut rx), 1);
        assert!(!session.is_enabled());
        assert!(session.identity().is_none());
    }
}
