use super::contract::{EthersYeilContract, YeilContract};
use crate::domain::error::BlockchainError;
use crate::infrastructure::config::{ChainConfig, Config};
use anyhow::{anyhow, Result};
use ethers::{
    core::types::Address,
    providers::{Http, Provider},
    signers::{LocalWallet, Signer},
};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ChainStatus {
    pub chain_id: u64,
    pub name: String,
    pub contract_address: Option<String>,
    pub reachable: bool,
    pub block_number: Option<u64>,
    pub error: Option<String>,
}

/// Owns one contract handle per chain that has a contract address.
pub struct BlockchainManager {
    chains: HashMap<u64, ChainConfig>,
    contracts: HashMap<u64, Arc<dyn YeilContract>>,
    signer_address: Option<Address>,
}

impl BlockchainManager {
    pub fn new(config: &Config) -> Result<Self> {
        let wallet = match &config.signer_private_key {
            Some(key) => Some(
                LocalWallet::from_str(key.trim_start_matches("0x"))
                    .map_err(|e| anyhow!("Invalid SIGNER_PRIVATE_KEY: {}", e))?,
            ),
            None => None,
        };
        let signer_address = wallet.as_ref().map(|w| w.address());
        let poll_interval = Duration::from_millis(config.receipt_poll_interval_ms.max(1));

        let mut contracts: HashMap<u64, Arc<dyn YeilContract>> = HashMap::new();
        for (chain_id, chain_config) in &config.supported_chains {
            let Some(address) = &chain_config.contract_address else {
                tracing::warn!(
                    "No contract address for chain {} ({}); reads and writes on it will fail",
                    chain_id,
                    chain_config.name
                );
                continue;
            };

            let contract_address: Address = address
                .parse()
                .map_err(|e| anyhow!("Invalid contract address for chain {}: {}", chain_id, e))?;

            let provider = Provider::<Http>::try_from(chain_config.rpc_url.as_str())
                .map_err(|e| anyhow!("Failed to create HTTP provider for chain {}: {}", chain_id, e))?;

            let contract = EthersYeilContract::new(
                *chain_id,
                contract_address,
                provider,
                wallet.clone(),
                config.confirmations,
                poll_interval,
            )?;
            contracts.insert(*chain_id, Arc::new(contract));
        }

        Ok(Self {
            chains: config.supported_chains.clone(),
            contracts,
            signer_address,
        })
    }

    /// Builds a manager around already constructed contract handles.
    pub fn with_contracts(
        chains: HashMap<u64, ChainConfig>,
        contracts: HashMap<u64, Arc<dyn YeilContract>>,
        signer_address: Option<Address>,
    ) -> Self {
        Self {
            chains,
            contracts,
            signer_address,
        }
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.signer_address
    }

    pub fn chain(&self, chain_id: u64) -> Result<&ChainConfig, BlockchainError> {
        self.chains
            .get(&chain_id)
            .ok_or(BlockchainError::UnsupportedChain(chain_id))
    }

    pub fn chains(&self) -> Vec<&ChainConfig> {
        let mut chains: Vec<&ChainConfig> = self.chains.values().collect();
        chains.sort_by_key(|c| c.chain_id);
        chains
    }

    /// Get contract instance for a specific chain
    pub fn contract(&self, chain_id: u64) -> Result<Arc<dyn YeilContract>, BlockchainError> {
        self.chain(chain_id)?;
        self.contracts
            .get(&chain_id)
            .cloned()
            .ok_or(BlockchainError::MissingContractAddress(chain_id))
    }

    pub async fn get_network_status(&self) -> Vec<ChainStatus> {
        let mut statuses = Vec::new();
        for chain in self.chains() {
            let mut status = ChainStatus {
                chain_id: chain.chain_id,
                name: chain.name.clone(),
                contract_address: chain.contract_address.clone(),
                reachable: false,
                block_number: None,
                error: None,
            };
            match self.contracts.get(&chain.chain_id) {
                Some(contract) => match contract.block_number().await {
                    Ok(number) => {
                        status.reachable = true;
                        status.block_number = Some(number);
                    }
                    Err(e) => status.error = Some(e.to_string()),
                },
                None => status.error = Some(BlockchainError::MissingContractAddress(chain.chain_id).to_string()),
            }
            statuses.push(status);
        }
        statuses
    }
}
