use crate::domain::error::BlockchainError;
use crate::domain::transaction::TransactionKind;
use anyhow::Result;
use async_trait::async_trait;
use ethers::{
    abi::{Abi, Detokenize, Tokenize},
    contract::Contract,
    core::types::{Address, H256, U256, U64},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, PendingTransaction, Provider},
    signers::{LocalWallet, Signer},
};
use std::sync::Arc;
use std::time::Duration;

/// Functions of the Yeil token the dashboard consumes.
pub const YEIL_ABI: &[&str] = &[
    "function getTokenName() external view returns (string)",
    "function getTokenSymbol() external view returns (string)",
    "function decimals() external view returns (uint8)",
    "function totalSupply() external view returns (uint256)",
    "function getVerifiedReserves() external view returns (uint256)",
    "function isFullyBacked() external view returns (bool)",
    "function getProofOfReserveAddress() external view returns (address)",
    "function getBalance(address account) external view returns (uint256)",
    "function balanceOfAt(address account, uint256 snapshotId) external view returns (uint256)",
    "function totalSupplyAt(uint256 snapshotId) external view returns (uint256)",
    "function allowance(address owner, address spender) external view returns (uint256)",
    "function mint(address to, uint256 amount) external",
    "function burn(address from, uint256 amount) external",
    "function snapshot() external returns (uint256)",
    "function transfer(address to, uint256 amount) external returns (bool)",
    "function approve(address spender, uint256 amount) external returns (bool)",
];

pub fn yeil_abi() -> Result<Abi> {
    ethers::abi::parse_abi(YEIL_ABI).map_err(|e| anyhow::anyhow!("Failed to parse Yeil ABI: {}", e))
}

/// A validated write, amounts already scaled to base units.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractWrite {
    Transfer { to: Address, amount: U256 },
    Mint { to: Address, amount: U256 },
    Burn { from: Address, amount: U256 },
    Snapshot,
    Approve { spender: Address, amount: U256 },
}

impl ContractWrite {
    pub fn kind(&self) -> TransactionKind {
        match self {
            ContractWrite::Transfer { .. } => TransactionKind::Transfer,
            ContractWrite::Mint { .. } => TransactionKind::Mint,
            ContractWrite::Burn { .. } => TransactionKind::Burn,
            ContractWrite::Snapshot => TransactionKind::Snapshot,
            ContractWrite::Approve { .. } => TransactionKind::Approve,
        }
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            ContractWrite::Transfer { .. } => "transfer",
            ContractWrite::Mint { .. } => "mint",
            ContractWrite::Burn { .. } => "burn",
            ContractWrite::Snapshot => "snapshot",
            ContractWrite::Approve { .. } => "approve",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptSummary {
    pub transaction_hash: H256,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

/// Read/write surface of one deployed Yeil contract.
#[async_trait]
pub trait YeilContract: Send + Sync {
    fn chain_id(&self) -> u64;
    fn address(&self) -> Address;
    fn signer_address(&self) -> Option<Address>;

    async fn block_number(&self) -> Result<u64>;
    /// Balance of the chain's native currency, in wei.
    async fn native_balance(&self, account: Address) -> Result<U256>;

    async fn token_name(&self) -> Result<String>;
    async fn token_symbol(&self) -> Result<String>;
    async fn decimals(&self) -> Result<u8>;
    async fn total_supply(&self) -> Result<U256>;
    async fn verified_reserves(&self) -> Result<U256>;
    async fn is_fully_backed(&self) -> Result<bool>;
    async fn proof_of_reserve_address(&self) -> Result<Address>;
    async fn balance_of(&self, account: Address) -> Result<U256>;
    async fn balance_of_at(&self, account: Address, snapshot_id: U256) -> Result<U256>;
    async fn total_supply_at(&self, snapshot_id: U256) -> Result<U256>;
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256>;

    /// Hands the write to the signer and returns once the node accepted it.
    async fn send(&self, write: &ContractWrite) -> Result<H256>;

    /// Waits until `tx_hash` is mined with the configured confirmations.
    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<ReceiptSummary>;
}

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

pub struct EthersYeilContract {
    chain_id: u64,
    provider: Provider<Http>,
    reader: Contract<Provider<Http>>,
    writer: Option<Contract<SignerClient>>,
    signer_address: Option<Address>,
    confirmations: usize,
}

impl EthersYeilContract {
    pub fn new(
        chain_id: u64,
        address: Address,
        provider: Provider<Http>,
        wallet: Option<LocalWallet>,
        confirmations: usize,
        poll_interval: Duration,
    ) -> Result<Self> {
        let abi = yeil_abi()?;
        let provider = provider.interval(poll_interval);

        let reader = Contract::new(address, abi.clone(), Arc::new(provider.clone()));

        let signer_address = wallet.as_ref().map(|w| w.address());
        let writer = wallet.map(|wallet| {
            let client = SignerMiddleware::new(provider.clone(), wallet.with_chain_id(chain_id));
            Contract::new(address, abi, Arc::new(client))
        });

        Ok(Self {
            chain_id,
            provider,
            reader,
            writer,
            signer_address,
            confirmations: confirmations.max(1),
        })
    }

    async fn call<T, D>(&self, method: &str, args: T) -> Result<D>
    where
        T: Tokenize + Send,
        D: Detokenize + Send + Sync,
    {
        let call = self
            .reader
            .method::<T, D>(method, args)
            .map_err(|e| BlockchainError::ContractCall(format!("{method}: {e}")))?;
        let value = call
            .call()
            .await
            .map_err(|e| BlockchainError::ContractCall(format!("{method}: {e}")))?;
        Ok(value)
    }
}

#[async_trait]
impl YeilContract for EthersYeilContract {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn address(&self) -> Address {
        self.reader.address()
    }

    fn signer_address(&self) -> Option<Address> {
        self.signer_address
    }

    async fn block_number(&self) -> Result<u64> {
        let number = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| BlockchainError::ContractCall(format!("eth_blockNumber: {e}")))?;
        Ok(number.as_u64())
    }

    async fn native_balance(&self, account: Address) -> Result<U256> {
        let balance = self
            .provider
            .get_balance(account, None)
            .await
            .map_err(|e| BlockchainError::ContractCall(format!("eth_getBalance: {e}")))?;
        Ok(balance)
    }

    async fn token_name(&self) -> Result<String> {
        self.call("getTokenName", ()).await
    }

    async fn token_symbol(&self) -> Result<String> {
        self.call("getTokenSymbol", ()).await
    }

    async fn decimals(&self) -> Result<u8> {
        self.call("decimals", ()).await
    }

    async fn total_supply(&self) -> Result<U256> {
        self.call("totalSupply", ()).await
    }

    async fn verified_reserves(&self) -> Result<U256> {
        self.call("getVerifiedReserves", ()).await
    }

    async fn is_fully_backed(&self) -> Result<bool> {
        self.call("isFullyBacked", ()).await
    }

    async fn proof_of_reserve_address(&self) -> Result<Address> {
        self.call("getProofOfReserveAddress", ()).await
    }

    async fn balance_of(&self, account: Address) -> Result<U256> {
        self.call("getBalance", account).await
    }

    async fn balance_of_at(&self, account: Address, snapshot_id: U256) -> Result<U256> {
        self.call("balanceOfAt", (account, snapshot_id)).await
    }

    async fn total_supply_at(&self, snapshot_id: U256) -> Result<U256> {
        self.call("totalSupplyAt", snapshot_id).await
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.call("allowance", (owner, spender)).await
    }

    async fn send(&self, write: &ContractWrite) -> Result<H256> {
        let writer = self
            .writer
            .as_ref()
            .ok_or(BlockchainError::SignerUnavailable(self.chain_id))?;

        let method = write.method_name();
        let call = match write {
            ContractWrite::Transfer { to, amount } => writer.method::<_, ()>(method, (*to, *amount)),
            ContractWrite::Mint { to, amount } => writer.method::<_, ()>(method, (*to, *amount)),
            ContractWrite::Burn { from, amount } => writer.method::<_, ()>(method, (*from, *amount)),
            ContractWrite::Snapshot => writer.method::<_, ()>(method, ()),
            ContractWrite::Approve { spender, amount } => writer.method::<_, ()>(method, (*spender, *amount)),
        }
        .map_err(|e| BlockchainError::ContractCall(format!("{method}: {e}")))?;

        let pending_tx = call
            .send()
            .await
            .map_err(|e| BlockchainError::ContractCall(format!("{method}: {e}")))?;

        Ok(pending_tx.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<ReceiptSummary> {
        let receipt = PendingTransaction::new(tx_hash, &self.provider)
            .confirmations(self.confirmations)
            .await
            .map_err(|e| BlockchainError::ContractCall(format!("receipt for {tx_hash:?}: {e}")))?
            .ok_or_else(|| BlockchainError::ReceiptUnavailable(format!("{tx_hash:?}")))?;

        if receipt.status == Some(U64::zero()) {
            return Err(BlockchainError::TransactionReverted(format!("{tx_hash:?}")).into());
        }

        Ok(ReceiptSummary {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
            gas_used: receipt.gas_used,
        })
    }
}
