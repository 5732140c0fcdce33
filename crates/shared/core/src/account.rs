use serde::{Deserialize, Serialize};

/// Trading account identity as the broker knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Broker display name
    pub broker_name: String,
    /// Investor id registered with the broker
    pub investor_id: String,
    /// Funding account id
    pub account_id: String,
}

impl Account {
    pub fn new(
        broker_name: impl Into<String>,
        investor_id: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            broker_name: broker_name.into(),
            investor_id: investor_id.into(),
            account_id: account_id.into(),
        }
    }
}
