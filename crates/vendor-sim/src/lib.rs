//! Vendor session simulator.
//!
//! An in-process stand-in for the vendor's session runtime, used by the
//! gateway's integration tests and by the runner's dry-run mode. It
//! implements both channel API surfaces, records every outbound request
//! for later inspection, and lets a test script the callbacks a real
//! front would deliver.
//!
//! Threading mirrors the real thing: `connect` fires `on_front_connected`
//! from a named simulator thread, and the rest of the login handshake runs
//! inline on that thread, exactly as a vendor SDK delivers callbacks on
//! its session thread. Push helpers (`push_tick`, `push_order`, ...) run
//! inline on the caller's thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use log::info;
use meridian_ports::{
    AuthRequest, InputOrder, InputOrderAction, LoginRequest, MdApi, MdSpi, QryOrder, QryPosition,
    QryTradingAccount, RspInfo, RspUserLogin, TraderApi, TraderSpi, VendorError, VendorOrder,
    VendorPosition, VendorResult, VendorTick, VendorTrade, VendorTradingAccount,
};

fn locked<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Everything the simulator has been asked to send
#[derive(Debug, Default)]
pub struct RecordedRequests {
    pub md_logins: Vec<LoginRequest>,
    pub subscriptions: Vec<Vec<String>>,
    pub auths: Vec<AuthRequest>,
    pub trader_logins: Vec<LoginRequest>,
    pub orders: Vec<InputOrder>,
    pub actions: Vec<InputOrderAction>,
    pub qry_orders: Vec<QryOrder>,
    pub qry_positions: Vec<QryPosition>,
    pub qry_accounts: Vec<QryTradingAccount>,
    /// Request ids in arrival order, across all trading-channel requests
    pub trader_request_ids: Vec<i32>,
}

struct Inner {
    md_spi: Mutex<Option<Arc<dyn MdSpi>>>,
    trader_spi: Mutex<Option<Arc<dyn TraderSpi>>>,
    requests: Mutex<RecordedRequests>,
    /// When set, login requests are answered immediately with success
    auto_ack_login: AtomicBool,
    /// When set, every `req_*` call fails synchronously
    fail_requests: AtomicBool,
    front_id: i32,
    session_id: i32,
    trading_day: String,
}

/// Control handle for one simulated vendor front pair
#[derive(Clone)]
pub struct VendorSim {
    inner: Arc<Inner>,
}

impl VendorSim {
    pub fn new(front_id: i32, session_id: i32) -> Self {
        Self {
            inner: Arc::new(Inner {
                md_spi: Mutex::new(None),
                trader_spi: Mutex::new(None),
                requests: Mutex::new(RecordedRequests::default()),
                auto_ack_login: AtomicBool::new(true),
                fail_requests: AtomicBool::new(false),
                front_id,
                session_id,
                trading_day: "20260831".to_string(),
            }),
        }
    }

    /// Stop answering login requests automatically
    pub fn set_auto_ack_login(&self, enabled: bool) {
        self.inner.auto_ack_login.store(enabled, Ordering::SeqCst);
    }

    /// Make every subsequent request fail at the session layer
    pub fn set_fail_requests(&self, enabled: bool) {
        self.inner.fail_requests.store(enabled, Ordering::SeqCst);
    }

    /// Market-data API handle to hand to the gateway
    pub fn md_api(&self) -> Arc<dyn MdApi> {
        Arc::new(self.clone())
    }

    /// Trading API handle to hand to the gateway
    pub fn trader_api(&self) -> Arc<dyn TraderApi> {
        Arc::new(self.clone())
    }

    /// Inspect everything recorded so far
    pub fn with_requests<R>(&self, f: impl FnOnce(&RecordedRequests) -> R) -> R {
        f(&locked(&self.inner.requests))
    }

    pub fn order_count(&self) -> usize {
        self.with_requests(|reqs| reqs.orders.len())
    }

    pub fn action_count(&self) -> usize {
        self.with_requests(|reqs| reqs.actions.len())
    }

    fn md_spi(&self) -> Option<Arc<dyn MdSpi>> {
        locked(&self.inner.md_spi).clone()
    }

    fn trader_spi(&self) -> Option<Arc<dyn TraderSpi>> {
        locked(&self.inner.trader_spi).clone()
    }

    fn login_rsp(&self) -> RspUserLogin {
        RspUserLogin {
            front_id: self.inner.front_id,
            session_id: self.inner.session_id,
            trading_day: self.inner.trading_day.clone(),
            max_order_ref: None,
        }
    }

    fn check_up(&self) -> VendorResult<()> {
        if self.inner.fail_requests.load(Ordering::SeqCst) {
            Err(VendorError::SendFailed("simulated session fault".into()))
        } else {
            Ok(())
        }
    }

    // -- scripted callbacks ------------------------------------------------

    /// Drop the market-data front
    pub fn drop_md_front(&self, reason: i32) {
        if let Some(spi) = self.md_spi() {
            spi.on_front_disconnected(reason);
        }
    }

    /// Drop the trading front
    pub fn drop_trader_front(&self, reason: i32) {
        if let Some(spi) = self.trader_spi() {
            spi.on_front_disconnected(reason);
        }
    }

    /// Bring the market-data front back up, handshake and all
    pub fn reconnect_md(&self) {
        if let Some(spi) = self.md_spi() {
            spi.on_front_connected();
        }
    }

    /// Bring the trading front back up, handshake and all
    pub fn reconnect_trader(&self) {
        if let Some(spi) = self.trader_spi() {
            spi.on_front_connected();
        }
    }

    pub fn push_tick(&self, tick: VendorTick) {
        if let Some(spi) = self.md_spi() {
            spi.on_rtn_depth_market_data(&tick);
        }
    }

    pub fn push_order(&self, order: VendorOrder) {
        if let Some(spi) = self.trader_spi() {
            spi.on_rtn_order(&order);
        }
    }

    pub fn push_trade(&self, trade: VendorTrade) {
        if let Some(spi) = self.trader_spi() {
            spi.on_rtn_trade(&trade);
        }
    }

    /// Bounce a submitted order back with the given error
    pub fn reject_order(&self, order: InputOrder, info: RspInfo) {
        if let Some(spi) = self.trader_spi() {
            spi.on_err_rtn_order_insert(&order, &info);
        }
    }

    /// Bounce a cancel back with the given error
    pub fn reject_action(&self, action: InputOrderAction, info: RspInfo) {
        if let Some(spi) = self.trader_spi() {
            spi.on_err_rtn_order_action(&action, &info);
        }
    }

    /// Answer the last order query with the given rows; the final row
    /// carries the terminal flag
    pub fn answer_qry_order(&self, rows: Vec<VendorOrder>) {
        if let Some(spi) = self.trader_spi() {
            let last = rows.len().saturating_sub(1);
            for (i, row) in rows.iter().enumerate() {
                spi.on_rsp_qry_order(row, i == last);
            }
        }
    }

    pub fn answer_qry_position(&self, rows: Vec<VendorPosition>) {
        if let Some(spi) = self.trader_spi() {
            let last = rows.len().saturating_sub(1);
            for (i, row) in rows.iter().enumerate() {
                spi.on_rsp_qry_position(row, i == last);
            }
        }
    }

    pub fn answer_qry_trading_account(&self, rows: Vec<VendorTradingAccount>) {
        if let Some(spi) = self.trader_spi() {
            let last = rows.len().saturating_sub(1);
            for (i, row) in rows.iter().enumerate() {
                spi.on_rsp_qry_trading_account(row, i == last);
            }
        }
    }
}

impl MdApi for VendorSim {
    fn register_spi(&self, spi: Arc<dyn MdSpi>) {
        *locked(&self.inner.md_spi) = Some(spi);
    }

    fn connect(&self) -> VendorResult<()> {
        self.check_up()?;
        let spi = self
            .md_spi()
            .ok_or_else(|| VendorError::SendFailed("no md spi registered".into()))?;
        thread::Builder::new()
            .name("vendorsim-md".to_string())
            .spawn(move || {
                info!("[sim] md front connected");
                spi.on_front_connected();
            })
            .map_err(|err| VendorError::SendFailed(err.to_string()))?;
        Ok(())
    }

    fn req_user_login(&self, req: &LoginRequest, _request_id: i32) -> VendorResult<()> {
        self.check_up()?;
        locked(&self.inner.requests).md_logins.push(req.clone());
        if self.inner.auto_ack_login.load(Ordering::SeqCst)
            && let Some(spi) = self.md_spi()
        {
            spi.on_rsp_user_login(&self.login_rsp(), &RspInfo::ok());
        }
        Ok(())
    }

    fn subscribe_market_data(&self, instruments: &[String]) -> VendorResult<()> {
        self.check_up()?;
        locked(&self.inner.requests)
            .subscriptions
            .push(instruments.to_vec());
        if let Some(spi) = self.md_spi() {
            for code in instruments {
                spi.on_rsp_sub_market_data(code);
            }
        }
        Ok(())
    }
}

impl TraderApi for VendorSim {
    fn register_spi(&self, spi: Arc<dyn TraderSpi>) {
        *locked(&self.inner.trader_spi) = Some(spi);
    }

    fn connect(&self) -> VendorResult<()> {
        self.check_up()?;
        let spi = self
            .trader_spi()
            .ok_or_else(|| VendorError::SendFailed("no trader spi registered".into()))?;
        thread::Builder::new()
            .name("vendorsim-trader".to_string())
            .spawn(move || {
                info!("[sim] trader front connected");
                spi.on_front_connected();
            })
            .map_err(|err| VendorError::SendFailed(err.to_string()))?;
        Ok(())
    }

    fn req_authenticate(&self, req: &AuthRequest, request_id: i32) -> VendorResult<()> {
        self.check_up()?;
        {
            let mut requests = locked(&self.inner.requests);
            requests.auths.push(req.clone());
            requests.trader_request_ids.push(request_id);
        }
        if let Some(spi) = self.trader_spi() {
            spi.on_rsp_authenticate(&RspInfo::ok());
        }
        Ok(())
    }

    fn req_user_login(&self, req: &LoginRequest, request_id: i32) -> VendorResult<()> {
        self.check_up()?;
        {
            let mut requests = locked(&self.inner.requests);
            requests.trader_logins.push(req.clone());
            requests.trader_request_ids.push(request_id);
        }
        if self.inner.auto_ack_login.load(Ordering::SeqCst)
            && let Some(spi) = self.trader_spi()
        {
            spi.on_rsp_user_login(&self.login_rsp(), &RspInfo::ok());
        }
        Ok(())
    }

    fn req_order_insert(&self, order: &InputOrder, request_id: i32) -> VendorResult<()> {
        self.check_up()?;
        let mut requests = locked(&self.inner.requests);
        requests.orders.push(order.clone());
        requests.trader_request_ids.push(request_id);
        Ok(())
    }

    fn req_order_action(&self, action: &InputOrderAction, request_id: i32) -> VendorResult<()> {
        self.check_up()?;
        let mut requests = locked(&self.inner.requests);
        requests.actions.push(action.clone());
        requests.trader_request_ids.push(request_id);
        Ok(())
    }

    fn req_qry_order(&self, qry: &QryOrder, request_id: i32) -> VendorResult<()> {
        self.check_up()?;
        let mut requests = locked(&self.inner.requests);
        requests.qry_orders.push(qry.clone());
        requests.trader_request_ids.push(request_id);
        Ok(())
    }

    fn req_qry_position(&self, qry: &QryPosition, request_id: i32) -> VendorResult<()> {
        self.check_up()?;
        let mut requests = locked(&self.inner.requests);
        requests.qry_positions.push(qry.clone());
        requests.trader_request_ids.push(request_id);
        Ok(())
    }

    fn req_qry_trading_account(
        &self,
        qry: &QryTradingAccount,
        request_id: i32,
    ) -> VendorResult<()> {
        self.check_up()?;
        let mut requests = locked(&self.inner.requests);
        requests.qry_accounts.push(qry.clone());
        requests.trader_request_ids.push(request_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullTraderSpi;

    impl TraderSpi for NullTraderSpi {
        fn on_front_connected(&self) {}
        fn on_front_disconnected(&self, _reason: i32) {}
        fn on_rsp_authenticate(&self, _info: &RspInfo) {}
        fn on_rsp_user_login(&self, _rsp: &RspUserLogin, _info: &RspInfo) {}
        fn on_rsp_order_insert(&self, _order: &InputOrder, _info: &RspInfo) {}
        fn on_err_rtn_order_insert(&self, _order: &InputOrder, _info: &RspInfo) {}
        fn on_rtn_order(&self, _order: &VendorOrder) {}
        fn on_rtn_trade(&self, _trade: &VendorTrade) {}
        fn on_rsp_order_action(&self, _action: &InputOrderAction, _info: &RspInfo) {}
        fn on_err_rtn_order_action(&self, _action: &InputOrderAction, _info: &RspInfo) {}
        fn on_rsp_qry_order(&self, _order: &VendorOrder, _is_last: bool) {}
        fn on_rsp_qry_position(&self, _position: &VendorPosition, _is_last: bool) {}
        fn on_rsp_qry_trading_account(&self, _account: &VendorTradingAccount, _is_last: bool) {}
        fn on_rsp_error(&self, _info: &RspInfo) {}
    }

    #[test]
    fn test_connect_without_spi_fails() {
        let sim = VendorSim::new(1, 1);
        assert!(MdApi::connect(&sim).is_err());
        assert!(TraderApi::connect(&sim).is_err());
    }

    #[test]
    fn test_requests_are_recorded() {
        let sim = VendorSim::new(1, 1);
        TraderApi::register_spi(&sim, Arc::new(NullTraderSpi));

        let login = LoginRequest {
            broker_id: "9999".into(),
            user_id: "u".into(),
            password: "p".into(),
            client_ip: String::new(),
            mac_addr: String::new(),
        };
        TraderApi::req_user_login(&sim, &login, 1).unwrap();
        sim.with_requests(|reqs| {
            assert_eq!(reqs.trader_logins.len(), 1);
            assert_eq!(reqs.trader_request_ids, vec![1]);
        });
    }

    #[test]
    fn test_fail_requests_flag() {
        let sim = VendorSim::new(1, 1);
        TraderApi::register_spi(&sim, Arc::new(NullTraderSpi));
        sim.set_fail_requests(true);

        let qry = QryOrder {
            broker_id: "9999".into(),
            investor_id: "i".into(),
            exchange_code: "SHFE".into(),
        };
        assert!(matches!(
            sim.req_qry_order(&qry, 2),
            Err(VendorError::SendFailed(_))
        ));
        sim.with_requests(|reqs| assert!(reqs.qry_orders.is_empty()));
    }
}
