use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const LOCALHOST_CHAIN_ID: u64 = 31337;
pub const MANTLE_CHAIN_ID: u64 = 5000;
pub const MANTLE_SEPOLIA_CHAIN_ID: u64 = 5003;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub explorer: Option<String>,
    pub contract_address: Option<String>,
    pub currency_symbol: String,
    pub is_testnet: bool,
}

impl ChainConfig {
    pub fn tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer
            .as_ref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }

    pub fn address_url(&self, address: &str) -> Option<String> {
        self.explorer
            .as_ref()
            .map(|base| format!("{}/address/{}", base.trim_end_matches('/'), address))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub log_level: String,
    pub log_directory: String,
    pub port: u16,
    pub default_chain_id: u64,
    pub walletconnect_project_id: String,
    // Read from the environment only; never serialized.
    #[serde(default, skip_serializing)]
    pub signer_private_key: Option<String>,
    pub confirmations: usize,
    pub receipt_poll_interval_ms: u64,
    pub max_tracked_transactions: usize,
    pub supported_chains: HashMap<u64, ChainConfig>,
    pub config_file_path: Option<String>,
    pub last_modified: Option<u64>,
    pub version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_directory: "logs".to_string(),
            port: 4000,
            default_chain_id: LOCALHOST_CHAIN_ID,
            walletconnect_project_id: "".to_string(),
            signer_private_key: None,
            confirmations: 1,
            receipt_poll_interval_ms: 2000,
            max_tracked_transactions: 500,
            supported_chains: HashMap::new(),
            config_file_path: None,
            last_modified: Some(Utc::now().timestamp() as u64),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<Config>>,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config = Config::new()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub async fn get_config(&self) -> Config {
        self.config.read().await.clone()
    }

    pub async fn validate_config(&self) -> Vec<String> {
        self.config.read().await.validation_errors()
    }

    /// Public view handed to dashboard clients. Contains what a wallet
    /// connector needs and nothing secret.
    pub async fn get_public_summary(&self, signer_address: Option<String>) -> serde_json::Value {
        let config = self.config.read().await;

        let mut networks: Vec<&ChainConfig> = config.supported_chains.values().collect();
        networks.sort_by_key(|c| c.chain_id);

        serde_json::json!({
            "environment": config.environment,
            "version": config.version,
            "default_chain_id": config.default_chain_id,
            "walletconnect_project_id": config.walletconnect_project_id,
            "signer_configured": signer_address.is_some(),
            "signer_address": signer_address,
            "confirmations": config.confirmations,
            "networks": networks,
        })
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok();

        let config_file = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.json".to_string());
        let config = if Path::new(&config_file).exists() {
            let mut config = Self::load_from_file(&config_file)?;
            // The key is never stored in the file.
            if config.signer_private_key.is_none() {
                config.signer_private_key = Self::optional_env_var("SIGNER_PRIVATE_KEY");
            }
            config
        } else {
            Self::from_env()?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(file_path: &str) -> Result<Self> {
        let content = fs::read_to_string(file_path).map_err(|e| anyhow!("Failed to read config file: {}", e))?;
        let mut config: Config =
            serde_json::from_str(&content).map_err(|e| anyhow!("Failed to deserialize config: {}", e))?;
        config.config_file_path = Some(file_path.to_string());
        config.last_modified = Some(Utc::now().timestamp() as u64);
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        let environment = Self::validate_and_get_env_var("RUST_ENV", "development", false)?;
        let default_log_level = if environment == "production" { "info" } else { "debug" };

        Ok(Self {
            environment,
            log_level: Self::validate_and_get_env_var("LOG_LEVEL", default_log_level, false)?,
            log_directory: Self::validate_and_get_env_var("LOG_DIR", "logs", false)?,
            port: u16::from_str(&Self::validate_and_get_env_var("PORT", "4000", false)?)
                .map_err(|e| anyhow!("Invalid PORT: {}", e))?,
            default_chain_id: u64::from_str(&Self::validate_and_get_env_var(
                "DEFAULT_CHAIN_ID",
                &LOCALHOST_CHAIN_ID.to_string(),
                false,
            )?)
            .map_err(|e| anyhow!("Invalid DEFAULT_CHAIN_ID: {}", e))?,
            walletconnect_project_id: Self::validate_and_get_env_var("WALLETCONNECT_PROJECT_ID", "", false)?,
            signer_private_key: Self::optional_env_var("SIGNER_PRIVATE_KEY"),
            confirmations: usize::from_str(&Self::validate_and_get_env_var("CONFIRMATIONS", "1", false)?)
                .map_err(|e| anyhow!("Invalid CONFIRMATIONS: {}", e))?,
            receipt_poll_interval_ms: u64::from_str(&Self::validate_and_get_env_var(
                "RECEIPT_POLL_INTERVAL_MS",
                "2000",
                false,
            )?)
            .map_err(|e| anyhow!("Invalid RECEIPT_POLL_INTERVAL_MS: {}", e))?,
            max_tracked_transactions: usize::from_str(&Self::validate_and_get_env_var(
                "MAX_TRACKED_TRANSACTIONS",
                "500",
                false,
            )?)
            .map_err(|e| anyhow!("Invalid MAX_TRACKED_TRANSACTIONS: {}", e))?,
            supported_chains: Self::get_supported_chains()?,
            config_file_path: None,
            last_modified: Some(Utc::now().timestamp() as u64),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Validates if a string is a valid hex address (0x followed by 40 hex characters)
    pub fn is_valid_hex_address(address: &str) -> bool {
        if !address.starts_with("0x") {
            return false;
        }

        let hex_part = &address[2..];
        if hex_part.len() != 40 {
            return false;
        }

        hex_part.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Validates environment variables and provides fallback values
    pub fn validate_and_get_env_var(key: &str, fallback: &str, required: bool) -> Result<String> {
        match env::var(key) {
            Ok(value) => {
                if value.is_empty() {
                    if required {
                        return Err(anyhow!("Environment variable {} is required but empty", key));
                    }
                    Ok(fallback.to_string())
                } else {
                    Ok(value)
                }
            }
            Err(_) => {
                if required {
                    return Err(anyhow!("Required environment variable {} is not set", key));
                }
                Ok(fallback.to_string())
            }
        }
    }

    fn optional_env_var(key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    /// Reads a per-network contract address. Unset is allowed: the chain is
    /// still listed and calls against it report the missing address.
    pub fn validate_contract_address(env_key: &str, chain_name: &str) -> Result<Option<String>> {
        match Self::optional_env_var(env_key) {
            None => Ok(None),
            Some(address) if Self::is_valid_hex_address(&address) => Ok(Some(address)),
            Some(address) => Err(anyhow!(
                "Invalid contract address for {}: '{}'. Expected format: 0x followed by 40 hex characters",
                chain_name,
                address
            )),
        }
    }

    fn chain_from_env(
        prefix: &str,
        chain_id: u64,
        name: &str,
        default_rpc: &str,
        default_explorer: Option<&str>,
        currency_symbol: &str,
        is_testnet: bool,
    ) -> Result<ChainConfig> {
        let explorer = match Self::optional_env_var(&format!("{prefix}_BLOCK_EXPLORER")) {
            Some(url) => Some(url),
            None => default_explorer.map(str::to_string),
        };

        Ok(ChainConfig {
            chain_id,
            name: name.to_string(),
            rpc_url: Self::validate_and_get_env_var(&format!("{prefix}_RPC_URL"), default_rpc, false)?,
            explorer,
            contract_address: Self::validate_contract_address(&format!("{prefix}_CONTRACT_ADDRESS"), name)?,
            currency_symbol: currency_symbol.to_string(),
            is_testnet,
        })
    }

    fn get_supported_chains() -> Result<HashMap<u64, ChainConfig>> {
        let chains = [
            Self::chain_from_env(
                "LOCALHOST",
                LOCALHOST_CHAIN_ID,
                "Localhost",
                "http://127.0.0.1:8545",
                None,
                "ETH",
                true,
            )?,
            Self::chain_from_env(
                "MANTLE",
                MANTLE_CHAIN_ID,
                "Mantle",
                "https://rpc.mantle.xyz",
                Some("https://explorer.mantle.xyz"),
                "MNT",
                false,
            )?,
            Self::chain_from_env(
                "MANTLE_SEPOLIA",
                MANTLE_SEPOLIA_CHAIN_ID,
                "Mantle Sepolia",
                "https://rpc.sepolia.mantle.xyz",
                Some("https://explorer.sepolia.mantle.xyz"),
                "MNT",
                true,
            )?,
        ];

        Ok(chains.into_iter().map(|c| (c.chain_id, c)).collect())
    }

    pub fn chain(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.supported_chains.get(&chain_id)
    }

    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("PORT must be greater than 0".to_string());
        }

        if !self.supported_chains.contains_key(&self.default_chain_id) {
            errors.push(format!("Default chain {} is not a supported chain", self.default_chain_id));
        }

        if let Some(key) = &self.signer_private_key {
            let is_32_bytes = hex::decode(key.trim_start_matches("0x"))
                .map(|bytes| bytes.len() == 32)
                .unwrap_or(false);
            if !is_32_bytes {
                errors.push("SIGNER_PRIVATE_KEY must be 32 bytes of hex".to_string());
            }
        }

        for (chain_id, chain_config) in &self.supported_chains {
            if *chain_id != chain_config.chain_id {
                errors.push(format!(
                    "Chain entry {} declares mismatching chain id {}",
                    chain_id, chain_config.chain_id
                ));
            }

            if chain_config.rpc_url.is_empty() {
                errors.push(format!("RPC URL is required for chain {} ({})", chain_id, chain_config.name));
            }

            if let Some(address) = &chain_config.contract_address {
                if !Self::is_valid_hex_address(address) {
                    errors.push(format!(
                        "Invalid contract address for chain {} ({}): '{}'. Expected format: 0x followed by 40 hex characters",
                        chain_id, chain_config.name, address
                    ));
                }
            }
        }

        if self.environment == "production" {
            if self.walletconnect_project_id.is_empty() {
                errors.push("WALLETCONNECT_PROJECT_ID is required in production environment".to_string());
            }
            if self.supported_chains.values().all(|c| c.contract_address.is_none()) {
                errors.push("At least one contract address is required in production environment".to_string());
            }
        }

        errors
    }

    pub fn validate(&self) -> Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Configuration validation failed: {}", errors.join(", ")))
        }
    }
}
