//! Configuration types for oracle-keeper
//!
//! Loaded from TOML, then overlaid with environment variables (after `.env`
//! has been read by the binary), then validated as a whole before any cycle
//! runs.

use crate::chain::load_abi;
use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub keeper: KeeperConfig,
    #[serde(default)]
    pub gas: GasConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Cycle scheduling and change detection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeeperConfig {
    /// Symbol universe; empty means everything the source publishes
    #[serde(default)]
    pub symbols: Vec<String>,

    /// Delay between cycles in looping mode
    #[serde(default = "default_update_interval_minutes")]
    pub update_interval_minutes: u64,

    /// Minimum relative move (percent) before a known symbol is republished
    #[serde(default = "default_min_price_change_pct")]
    pub min_price_change_pct: Decimal,

    /// Maximum updates per transaction
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between consecutive batch submissions
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,

    /// Upper bound on a single collection call
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Symbols served by the degraded collector when the primary source fails
    #[serde(default = "default_fallback_symbols")]
    pub fallback_symbols: Vec<String>,

    /// Log cumulative statistics every N cycles
    #[serde(default = "default_stats_every_cycles")]
    pub stats_every_cycles: u64,
}

fn default_update_interval_minutes() -> u64 {
    15
}
fn default_min_price_change_pct() -> Decimal {
    Decimal::new(5, 1) // 0.5%
}
fn default_batch_size() -> usize {
    20
}
fn default_inter_batch_delay_ms() -> u64 {
    2_000
}
fn default_fetch_timeout_secs() -> u64 {
    120
}
fn default_fallback_symbols() -> Vec<String> {
    crate::collector::DEFAULT_FALLBACK_SYMBOLS
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_stats_every_cycles() -> u64 {
    10
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            symbols: vec![],
            update_interval_minutes: default_update_interval_minutes(),
            min_price_change_pct: default_min_price_change_pct(),
            batch_size: default_batch_size(),
            inter_batch_delay_ms: default_inter_batch_delay_ms(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            fallback_symbols: default_fallback_symbols(),
            stats_every_cycles: default_stats_every_cycles(),
        }
    }
}

/// Gas ceiling and gas estimation model
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GasConfig {
    /// Batches are skipped while the network price is above this
    #[serde(default = "default_max_gas_price_gwei")]
    pub max_gas_price_gwei: u64,

    #[serde(default = "default_base_overhead")]
    pub base_overhead: u64,

    #[serde(default = "default_per_item_cost")]
    pub per_item_cost: u64,

    /// Hard ceiling on any batch's gas limit
    #[serde(default = "default_max_gas_cap")]
    pub max_gas_cap: u64,
}

fn default_max_gas_price_gwei() -> u64 {
    50
}
fn default_base_overhead() -> u64 {
    200_000
}
fn default_per_item_cost() -> u64 {
    150_000
}
fn default_max_gas_cap() -> u64 {
    8_000_000
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            max_gas_price_gwei: default_max_gas_price_gwei(),
            base_overhead: default_base_overhead(),
            per_item_cost: default_per_item_cost(),
            max_gas_cap: default_max_gas_cap(),
        }
    }
}

/// A credential that never appears in logs or printed configuration
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            f.write_str("Secret(<unset>)")
        } else {
            f.write_str("Secret(***)")
        }
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if self.is_empty() { "<unset>" } else { "***" })
    }
}

/// Blockchain endpoint and oracle contract
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub rpc_url: String,

    #[serde(default)]
    pub contract_address: String,

    /// Compiled contract artifact holding the ABI
    #[serde(default = "default_abi_path")]
    pub abi_path: PathBuf,

    /// Environment variable holding the signing key
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,

    /// Signing key; only ever read from the environment
    #[serde(skip_deserializing)]
    pub private_key: Secret,

    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,

    /// Warn at startup when the signer balance is below this (ETH)
    #[serde(default = "default_low_balance_eth")]
    pub low_balance_eth: Decimal,
}

fn default_abi_path() -> PathBuf {
    PathBuf::from("artifacts/contracts/SimpleStockOracle.sol/SimpleStockOracle.json")
}
fn default_private_key_env() -> String {
    "PRIVATE_KEY".to_string()
}
fn default_receipt_timeout_secs() -> u64 {
    300
}
fn default_low_balance_eth() -> Decimal {
    Decimal::new(1, 2) // 0.01 ETH
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            contract_address: String::new(),
            abi_path: default_abi_path(),
            private_key_env: default_private_key_env(),
            private_key: Secret::default(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
            low_balance_eth: default_low_balance_eth(),
        }
    }
}

/// Execution engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Gas price quoted by the paper chain
    #[serde(default = "default_paper_gas_price_gwei")]
    pub paper_gas_price_gwei: u64,
}

fn default_paper_gas_price_gwei() -> u64 {
    20
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            paper_gas_price_gwei: default_paper_gas_price_gwei(),
        }
    }
}

/// Execution mode: simulated commits or signed transactions
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Paper,
    Live,
}

/// Price source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectorConfig {
    /// Serve prices from the random-walk generator instead of the exchange
    #[serde(default)]
    pub use_mock: bool,

    /// Exchange pages tried in order
    #[serde(default = "default_urls")]
    pub urls: Vec<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Quotes above this are treated as non-equity rows and dropped
    #[serde(default = "default_max_price")]
    pub max_price: Decimal,

    /// Per-fetch step bound for generated prices (fraction)
    #[serde(default = "default_mock_volatility")]
    pub mock_volatility: Decimal,
}

fn default_urls() -> Vec<String> {
    crate::collector::NGX_URLS.iter().map(|s| s.to_string()).collect()
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_max_price() -> Decimal {
    Decimal::from(50_000)
}
fn default_mock_volatility() -> Decimal {
    Decimal::new(2, 2) // 2%
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            use_mock: false,
            urls: default_urls(),
            request_timeout_secs: default_request_timeout_secs(),
            max_price: default_max_price(),
            mock_volatility: default_mock_volatility(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Prometheus exporter port; disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Append logs to this file in addition to stdout
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: None,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            log_file: None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

/// File written when `SAVE_LOGS_TO_FILE` is enabled without an explicit path
pub const DEFAULT_LOG_FILE: &str = "oracle_keeper.log";

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay process environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay variables resolved by `lookup`. Empty values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("RPC_URL") {
            self.chain.rpc_url = url;
        }
        if let Some(address) = get("ORACLE_CONTRACT_ADDRESS") {
            self.chain.contract_address = address;
        }
        if let Some(key) = get(&self.chain.private_key_env) {
            self.chain.private_key = Secret::new(key.trim());
        }
        if let Some(flag) = get("USE_MOCK_DATA").as_deref().and_then(parse_flag) {
            self.collector.use_mock = flag;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.telemetry.log_level = level.to_lowercase();
        }
        if get("SAVE_LOGS_TO_FILE").as_deref().and_then(parse_flag) == Some(true)
            && self.telemetry.log_file.is_none()
        {
            self.telemetry.log_file = Some(PathBuf::from(DEFAULT_LOG_FILE));
        }
    }

    /// Check the whole configuration, reporting every problem at once
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.keeper.batch_size == 0 {
            problems.push("keeper.batch_size must be at least 1".to_string());
        }
        if self.keeper.update_interval_minutes == 0 {
            problems.push("keeper.update_interval_minutes must be at least 1".to_string());
        }
        if self.keeper.min_price_change_pct.is_sign_negative() {
            problems.push("keeper.min_price_change_pct must not be negative".to_string());
        }
        if self.keeper.fetch_timeout_secs == 0 {
            problems.push("keeper.fetch_timeout_secs must be at least 1".to_string());
        }
        if self.gas.max_gas_price_gwei == 0 {
            problems.push("gas.max_gas_price_gwei must be positive".to_string());
        }
        if self.gas.max_gas_cap < self.gas.base_overhead.saturating_add(self.gas.per_item_cost) {
            problems.push("gas.max_gas_cap cannot fit a single-item batch".to_string());
        }
        if self.chain.receipt_timeout_secs == 0 {
            problems.push("chain.receipt_timeout_secs must be at least 1".to_string());
        }
        if !self.collector.use_mock && self.collector.urls.is_empty() {
            problems.push("collector.urls is empty and mock data is disabled".to_string());
        }
        if self.collector.mock_volatility.is_sign_negative()
            || self.collector.mock_volatility >= Decimal::ONE
        {
            problems.push("collector.mock_volatility must be within [0, 1)".to_string());
        }
        if self.collector.max_price <= Decimal::ZERO {
            problems.push("collector.max_price must be positive".to_string());
        }

        if self.execution.mode == ExecutionMode::Live {
            if self.chain.rpc_url.trim().is_empty() {
                problems.push("RPC_URL is required in live mode".to_string());
            }
            if self.chain.private_key.is_empty() {
                problems.push(format!(
                    "{} is required in live mode",
                    self.chain.private_key_env
                ));
            }
            if self.chain.contract_address.trim().is_empty() {
                problems.push("ORACLE_CONTRACT_ADDRESS is required in live mode".to_string());
            }
            if let Err(e) = load_abi(&self.chain.abi_path) {
                problems.push(e.to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [keeper]
            symbols = ["DANGCEM", "GTCO"]
            update_interval_minutes = 5
            min_price_change_pct = 1.5
            batch_size = 10

            [gas]
            max_gas_price_gwei = 30

            [chain]
            rpc_url = "http://localhost:8545"
            contract_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"

            [execution]
            mode = "paper"

            [collector]
            use_mock = true

            [telemetry]
            metrics_port = 9090
            log_level = "debug"
            log_format = "json"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.keeper.symbols, vec!["DANGCEM", "GTCO"]);
        assert_eq!(config.keeper.min_price_change_pct, dec!(1.5));
        assert_eq!(config.keeper.batch_size, 10);
        assert_eq!(config.gas.max_gas_price_gwei, 30);
        assert_eq!(config.execution.mode, ExecutionMode::Paper);
        assert!(config.collector.use_mock);
        assert_eq!(config.telemetry.metrics_port, Some(9090));
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.keeper.symbols.is_empty());
        assert_eq!(config.keeper.update_interval_minutes, 15);
        assert_eq!(config.keeper.min_price_change_pct, dec!(0.5));
        assert_eq!(config.keeper.batch_size, 20);
        assert_eq!(config.keeper.inter_batch_delay_ms, 2_000);
        assert_eq!(config.keeper.stats_every_cycles, 10);
        assert_eq!(config.keeper.fallback_symbols.len(), 5);
        assert_eq!(config.gas.max_gas_price_gwei, 50);
        assert_eq!(config.gas.max_gas_cap, 8_000_000);
        assert_eq!(config.chain.receipt_timeout_secs, 300);
        assert_eq!(config.chain.low_balance_eth, dec!(0.01));
        assert_eq!(config.collector.urls.len(), 3);
        assert_eq!(config.collector.max_price, dec!(50000));
        assert_eq!(config.execution.mode, ExecutionMode::Paper);
        assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_private_key_not_read_from_file() {
        let config = Config::from_toml(
            r#"
            [chain]
            private_key = "0xdeadbeef"
        "#,
        )
        .unwrap();
        assert!(config.chain.private_key.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_from(env(&[
            ("RPC_URL", "https://sepolia.example"),
            ("PRIVATE_KEY", " 0xabc "),
            ("ORACLE_CONTRACT_ADDRESS", "0x1111111111111111111111111111111111111111"),
            ("USE_MOCK_DATA", "true"),
            ("LOG_LEVEL", "DEBUG"),
            ("SAVE_LOGS_TO_FILE", "1"),
        ]));

        assert_eq!(config.chain.rpc_url, "https://sepolia.example");
        assert_eq!(config.chain.private_key.expose(), "0xabc");
        assert!(config.collector.use_mock);
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(config.telemetry.log_file, Some(PathBuf::from(DEFAULT_LOG_FILE)));
    }

    #[test]
    fn test_env_custom_key_variable() {
        let mut config = Config::default();
        config.chain.private_key_env = "KEEPER_KEY".to_string();
        config.apply_env_from(env(&[("PRIVATE_KEY", "wrong"), ("KEEPER_KEY", "right")]));
        assert_eq!(config.chain.private_key.expose(), "right");
    }

    #[test]
    fn test_env_ignores_empty_and_garbage() {
        let mut config = Config::default();
        config.chain.rpc_url = "http://from-file".to_string();
        config.apply_env_from(env(&[("RPC_URL", "  "), ("USE_MOCK_DATA", "maybe")]));
        assert_eq!(config.chain.rpc_url, "http://from-file");
        assert!(!config.collector.use_mock);
    }

    #[test]
    fn test_secret_redacted() {
        let secret = Secret::new("0xsupersecret");
        assert_eq!(format!("{:?}", secret), "Secret(***)");

        let mut config = Config::default();
        config.chain.private_key = secret;
        let printed = toml::to_string(&config).unwrap();
        assert!(!printed.contains("supersecret"));
        assert!(!format!("{:?}", config).contains("supersecret"));
    }

    #[test]
    fn test_validate_collects_all_problems() {
        let mut config = Config::default();
        config.keeper.batch_size = 0;
        config.gas.max_gas_price_gwei = 0;
        config.keeper.min_price_change_pct = dec!(-1);

        let err = config.validate().unwrap_err();
        match err {
            ConfigError::Invalid(problems) => assert_eq!(problems.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_live_mode_requires_credentials() {
        let mut config = Config::default();
        config.execution.mode = ExecutionMode::Live;
        config.chain.abi_path = PathBuf::from("/nonexistent/Oracle.json");

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("RPC_URL"));
        assert!(err.contains("PRIVATE_KEY"));
        assert!(err.contains("ORACLE_CONTRACT_ADDRESS"));
        assert!(err.contains("ABI"));
    }

    #[test]
    fn test_validate_live_mode_ok() {
        use std::io::Write;

        let mut abi = tempfile::NamedTempFile::new().unwrap();
        abi.write_all(
            br#"{"abi": [{"type": "function", "name": "updatePrices",
                "inputs": [{"type": "string[]"}, {"type": "uint256[]"}]}]}"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.execution.mode = ExecutionMode::Live;
        config.chain.abi_path = abi.path().to_path_buf();
        config.apply_env_from(env(&[
            ("RPC_URL", "http://localhost:8545"),
            ("PRIVATE_KEY", "0xabc"),
            ("ORACLE_CONTRACT_ADDRESS", "0x1111111111111111111111111111111111111111"),
        ]));

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_gas_cap_too_small() {
        let mut config = Config::default();
        config.gas.max_gas_cap = 100_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_bad_toml() {
        assert!(matches!(
            Config::from_toml("[keeper\nbatch_size = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_execution_mode_equality() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Paper);
        assert_ne!(ExecutionMode::Paper, ExecutionMode::Live);
    }
}
