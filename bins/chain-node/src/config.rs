//! Process-wide configuration, read once at startup from environment
//! variables with `Default` fallbacks for local development, generalized
//! to the three options the chain/mempool engine needs.

use std::path::PathBuf;

use chain_core::constants::MIN_ALLOWED_BITS;
use chain_engine::EngineConfig;

const DEFAULT_BITS: u32 = MIN_ALLOWED_BITS;
const DEFAULT_SUBSIDY: u64 = 50_0000_0000;
const DEFAULT_RPC_BIND: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 18443;

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Consensus parameters handed straight to the chain engine.
    pub blockchain_bits: u32,
    pub blockchain_subsidy: u64,
    /// RocksDB data directory.
    pub store_path: PathBuf,
    pub rpc_bind: String,
    pub rpc_port: u16,
    pub log_level: String,
    pub log_format: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let default_store_path =
            dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("chain-node").join("chaindata");

        Self {
            blockchain_bits: DEFAULT_BITS,
            blockchain_subsidy: DEFAULT_SUBSIDY,
            store_path: default_store_path,
            rpc_bind: DEFAULT_RPC_BIND.to_string(),
            rpc_port: DEFAULT_RPC_PORT,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BLOCKCHAIN_BITS {0:#x} is not a valid hex u32, or is stricter than the configured floor")]
    InvalidBits(String),
    #[error("BLOCKCHAIN_SUBSIDY {0} is not a valid u64")]
    InvalidSubsidy(String),
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let blockchain_bits = match std::env::var("BLOCKCHAIN_BITS") {
            Ok(raw) => u32::from_str_radix(raw.trim_start_matches("0x"), 16)
                .map_err(|_| ConfigError::InvalidBits(raw.clone()))?,
            Err(_) => defaults.blockchain_bits,
        };

        let blockchain_subsidy = match std::env::var("BLOCKCHAIN_SUBSIDY") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidSubsidy(raw.clone()))?,
            Err(_) => defaults.blockchain_subsidy,
        };

        let store_path =
            std::env::var("CHAIN_STORE_PATH").map(PathBuf::from).unwrap_or(defaults.store_path);

        let rpc_bind = std::env::var("CHAIN_RPC_BIND").unwrap_or(defaults.rpc_bind);
        let rpc_port = std::env::var("CHAIN_RPC_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.rpc_port);
        let log_level = std::env::var("CHAIN_LOG_LEVEL").unwrap_or(defaults.log_level);
        let log_format = std::env::var("CHAIN_LOG_FORMAT").unwrap_or(defaults.log_format);

        Ok(Self { blockchain_bits, blockchain_subsidy, store_path, rpc_bind, rpc_port, log_level, log_format })
    }

    pub fn rpc_addr(&self) -> String {
        format!("{}:{}", self.rpc_bind, self.rpc_port)
    }

    /// Build the [`EngineConfig`] these process-wide options describe,
    /// rejecting a configured `bits` below the consensus floor.
    pub fn engine_config(&self) -> Option<EngineConfig> {
        EngineConfig::new(self.blockchain_bits, self.blockchain_subsidy)
    }
}
