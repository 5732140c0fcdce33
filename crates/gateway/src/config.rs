//! Gateway configuration.
//!
//! One [`GatewayConfig`] drives one gateway instance: two front addresses,
//! the credential block stamped into every outbound request, and a handful
//! of timing knobs. Loaded from JSON by the runner; every field has a
//! default so partial config files work.

use meridian_core::Account;
use meridian_ports::{AuthRequest, LoginRequest, QryOrder, QryPosition, QryTradingAccount};
use serde::{Deserialize, Serialize};

fn default_buffer_capacity() -> usize {
    crate::buffer::DEFAULT_CAPACITY
}

fn default_query_delay_ms() -> u64 {
    1500
}

fn default_startup_stagger_ms() -> u64 {
    2000
}

fn default_currency() -> String {
    "CNY".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Market-data front address, e.g. `tcp://180.168.146.187:10131`
    #[serde(default)]
    pub md_addr: String,
    /// Trading front address
    #[serde(default)]
    pub trader_addr: String,

    #[serde(default)]
    pub broker_id: String,
    #[serde(default)]
    pub investor_id: String,
    /// Funding account; falls back to `investor_id` when empty
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub password: String,

    /// Terminal app id for client authentication
    #[serde(default)]
    pub app_id: String,
    /// Auth code; `None` skips the authenticate step and logs in directly
    #[serde(default)]
    pub auth_code: Option<String>,

    #[serde(default = "default_currency")]
    pub currency_id: String,
    #[serde(default)]
    pub client_ip: String,
    #[serde(default)]
    pub mac_addr: String,

    /// Exchange the query requests are scoped to
    #[serde(default)]
    pub exchange_code: String,

    /// Inbound buffer slots
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// Settle delay before each query request is released
    #[serde(default = "default_query_delay_ms")]
    pub query_delay_ms: u64,
    /// Pause between starting the trading session and the market-data
    /// session, so the trading channel settles first
    #[serde(default = "default_startup_stagger_ms")]
    pub startup_stagger_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            md_addr: String::new(),
            trader_addr: String::new(),
            broker_id: String::new(),
            investor_id: String::new(),
            account_id: String::new(),
            user_id: String::new(),
            password: String::new(),
            app_id: String::new(),
            auth_code: None,
            currency_id: default_currency(),
            client_ip: String::new(),
            mac_addr: String::new(),
            exchange_code: String::new(),
            buffer_capacity: default_buffer_capacity(),
            query_delay_ms: default_query_delay_ms(),
            startup_stagger_ms: default_startup_stagger_ms(),
        }
    }
}

impl GatewayConfig {
    /// Stable identifier for this gateway instance, used in status events
    /// and log lines
    pub fn adaptor_id(&self) -> String {
        format!("gateway-{}-{}", self.broker_id, self.investor_id)
    }

    /// Funding account, defaulting to the investor id
    pub fn effective_account_id(&self) -> &str {
        if self.account_id.is_empty() {
            &self.investor_id
        } else {
            &self.account_id
        }
    }

    /// The account identity this gateway trades for
    pub fn account(&self) -> Account {
        Account::new(
            self.broker_id.clone(),
            self.investor_id.clone(),
            self.effective_account_id(),
        )
    }

    pub fn login_request(&self) -> LoginRequest {
        LoginRequest {
            broker_id: self.broker_id.clone(),
            user_id: self.user_id.clone(),
            password: self.password.clone(),
            client_ip: self.client_ip.clone(),
            mac_addr: self.mac_addr.clone(),
        }
    }

    /// Authenticate request; `None` when no auth code is configured
    pub fn auth_request(&self) -> Option<AuthRequest> {
        self.auth_code.as_ref().map(|code| AuthRequest {
            broker_id: self.broker_id.clone(),
            user_id: self.user_id.clone(),
            app_id: self.app_id.clone(),
            auth_code: code.clone(),
        })
    }

    pub fn qry_order(&self) -> QryOrder {
        QryOrder {
            broker_id: self.broker_id.clone(),
            investor_id: self.investor_id.clone(),
            exchange_code: self.exchange_code.clone(),
        }
    }

    pub fn qry_position(&self, instrument_code: &str) -> QryPosition {
        QryPosition {
            broker_id: self.broker_id.clone(),
            investor_id: self.investor_id.clone(),
            exchange_code: self.exchange_code.clone(),
            instrument_code: instrument_code.to_string(),
        }
    }

    pub fn qry_trading_account(&self) -> QryTradingAccount {
        QryTradingAccount {
            broker_id: self.broker_id.clone(),
            investor_id: self.investor_id.clone(),
            account_id: self.effective_account_id().to_string(),
            currency_id: self.currency_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.buffer_capacity, 64);
        assert_eq!(config.query_delay_ms, 1500);
        assert_eq!(config.currency_id, "CNY");
        assert!(config.auth_request().is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: GatewayConfig = serde_json::from_str(
            r#"{"broker_id":"9999","investor_id":"000042","user_id":"000042"}"#,
        )
        .unwrap();
        assert_eq!(config.broker_id, "9999");
        assert_eq!(config.buffer_capacity, 64);
        assert_eq!(config.adaptor_id(), "gateway-9999-000042");
        assert_eq!(config.effective_account_id(), "000042");
    }

    #[test]
    fn test_auth_request_present_with_code() {
        let config = GatewayConfig {
            broker_id: "9999".into(),
            user_id: "u1".into(),
            app_id: "app".into(),
            auth_code: Some("0000".into()),
            ..Default::default()
        };
        let auth = config.auth_request().unwrap();
        assert_eq!(auth.auth_code, "0000");
        assert_eq!(auth.app_id, "app");
    }

    #[test]
    fn test_explicit_account_id_wins() {
        let config = GatewayConfig {
            investor_id: "inv".into(),
            account_id: "acct".into(),
            ..Default::default()
        };
        assert_eq!(config.effective_account_id(), "acct");
        assert_eq!(config.qry_trading_account().account_id, "acct");
    }

    #[test]
    fn test_account_identity() {
        let config = GatewayConfig {
            broker_id: "9999".into(),
            investor_id: "000042".into(),
            ..Default::default()
        };
        let account = config.account();
        assert_eq!(account.broker_name, "9999");
        assert_eq!(account.investor_id, "000042");
        assert_eq!(account.account_id, "000042");
    }
}
