//! Bootstrap - config loading and gateway wiring.
//!
//! Reads a JSON config file, builds the gateway against a vendor session
//! layer, and brings the channels up. `start_dry_run` wires the in-process
//! simulator instead of a real front, which is how the integration
//! environment and local bring-up operate.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::info;
use meridian_gateway::{Gateway, GatewayConfig, GatewayError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vendor_sim::VendorSim;

use crate::scheduler::LoggingScheduler;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Gateway startup error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Top-level runner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Instruments subscribed at startup
    #[serde(default)]
    pub instruments: Vec<String>,
}

/// Load the runner configuration from a JSON file
pub fn load_config(path: impl AsRef<Path>) -> Result<RunnerConfig, BootstrapError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Initialize logging from `RUST_LOG`, defaulting to `info`.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Wire a gateway against the vendor simulator and bring it up.
///
/// Returns the gateway and the simulator control handle so the caller can
/// script vendor behavior. Startup subscriptions from the config are
/// issued before the channels come up; the gateway replays them on login.
pub fn start_dry_run(config: RunnerConfig) -> Result<(Gateway, VendorSim), BootstrapError> {
    let sim = VendorSim::new(1, 1);
    let gateway = Gateway::new(
        config.gateway,
        sim.md_api(),
        sim.trader_api(),
        Arc::new(LoggingScheduler),
    );

    info!("[bootstrap] starting {} in dry-run mode", gateway.adaptor_id());
    if !config.instruments.is_empty() {
        gateway.subscribe_market_data(&config.instruments);
    }
    gateway.startup()?;
    Ok((gateway, sim))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_config_from_json() {
        let config: RunnerConfig = serde_json::from_str(
            r#"{
                "gateway": {
                    "broker_id": "9999",
                    "investor_id": "000042",
                    "user_id": "000042",
                    "startup_stagger_ms": 0
                },
                "instruments": ["rb2410", "cu2409"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.gateway.broker_id, "9999");
        assert_eq!(config.instruments.len(), 2);
        // Omitted fields keep their defaults
        assert_eq!(config.gateway.buffer_capacity, 64);
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        assert!(matches!(
            load_config("/nonexistent/meridian.json"),
            Err(BootstrapError::Io(_))
        ));
    }

    #[test]
    fn test_dry_run_brings_both_channels_up() {
        init_logging();
        let config = RunnerConfig {
            gateway: GatewayConfig {
                broker_id: "9999".into(),
                investor_id: "000042".into(),
                user_id: "000042".into(),
                startup_stagger_ms: 0,
                ..Default::default()
            },
            instruments: vec!["rb2410".to_string()],
        };

        let (gateway, sim) = start_dry_run(config).unwrap();
        for _ in 0..100 {
            if gateway.is_md_enabled() && gateway.is_trader_enabled() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(gateway.is_trader_enabled());
        assert!(gateway.is_md_enabled());
        // The startup subscription was replayed on login
        sim.with_requests(|reqs| {
            assert!(reqs.subscriptions.iter().any(|s| s.contains(&"rb2410".to_string())));
        });
    }
}
