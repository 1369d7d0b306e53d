use chrono::{DateTime, Utc};
use ethers::core::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Serializes `U256` as a base-10 string so amounts survive JSON clients
/// that cannot hold 256-bit integers.
pub mod u256_dec {
    use ethers::core::types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_dec_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// Display projection of the token's on-chain metadata and backing status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenInfo {
    pub chain_id: u64,
    pub contract_address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(with = "u256_dec")]
    pub total_supply: U256,
    pub total_supply_formatted: String,
    #[serde(with = "u256_dec")]
    pub verified_reserves: U256,
    pub verified_reserves_formatted: String,
    pub is_fully_backed: bool,
    pub proof_of_reserve_feed_address: Address,
    pub proof_of_reserve_feed_url: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Balance {
    pub chain_id: u64,
    pub account: Address,
    pub symbol: String,
    #[serde(with = "u256_dec")]
    pub balance: U256,
    pub balance_formatted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotBalance {
    pub chain_id: u64,
    #[serde(with = "u256_dec")]
    pub snapshot_id: U256,
    pub account: Address,
    #[serde(with = "u256_dec")]
    pub balance: U256,
    pub balance_formatted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotSupply {
    pub chain_id: u64,
    #[serde(with = "u256_dec")]
    pub snapshot_id: U256,
    #[serde(with = "u256_dec")]
    pub total_supply: U256,
    pub total_supply_formatted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Allowance {
    pub chain_id: u64,
    pub owner: Address,
    pub spender: Address,
    #[serde(with = "u256_dec")]
    pub allowance: U256,
    pub allowance_formatted: String,
}
