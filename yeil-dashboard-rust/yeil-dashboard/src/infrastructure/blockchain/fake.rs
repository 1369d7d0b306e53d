//! In-memory `YeilContract` used by unit tests across the crate.

use super::contract::{ContractWrite, ReceiptSummary, YeilContract};
use crate::domain::error::BlockchainError;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::core::types::{Address, H256, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

pub const FAKE_SIGNER: Address = Address::repeat_byte(0x5e);

#[derive(Debug, Default)]
struct Ledger {
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    snapshots: Vec<(U256, HashMap<Address, U256>)>,
    sent: Vec<ContractWrite>,
}

pub struct FakeYeilContract {
    chain_id: u64,
    address: Address,
    signer: Option<Address>,
    pub decimals: u8,
    pub verified_reserves: U256,
    ledger: Mutex<Ledger>,
    pub reads: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_send: AtomicBool,
    pub revert_receipts: AtomicBool,
    receipt_permits: Arc<Semaphore>,
    stall_next_supply: AtomicBool,
    supply_release: Notify,
    nonce: AtomicUsize,
}

impl FakeYeilContract {
    pub fn new(chain_id: u64) -> Self {
        let mut ledger = Ledger::default();
        let initial = U256::from(1_000u64) * U256::exp10(18);
        ledger.total_supply = initial;
        ledger.balances.insert(FAKE_SIGNER, initial);

        Self {
            chain_id,
            address: Address::repeat_byte(0xc0),
            signer: Some(FAKE_SIGNER),
            decimals: 18,
            verified_reserves: U256::from(2_000u64) * U256::exp10(18),
            ledger: Mutex::new(ledger),
            reads: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
            revert_receipts: AtomicBool::new(false),
            receipt_permits: Arc::new(Semaphore::new(Semaphore::MAX_PERMITS)),
            stall_next_supply: AtomicBool::new(false),
            supply_release: Notify::new(),
            nonce: AtomicUsize::new(0),
        }
    }

    pub fn read_only(mut self) -> Self {
        self.signer = None;
        self
    }

    /// Receipts block until `release_receipts` is called.
    pub fn holding_receipts(mut self) -> Self {
        self.receipt_permits = Arc::new(Semaphore::new(0));
        self
    }

    pub fn release_receipts(&self, n: usize) {
        self.receipt_permits.add_permits(n);
    }

    /// The next `total_supply` read captures its value, then waits for
    /// `release_supply_read` before returning it.
    pub fn stall_next_supply_read(&self) {
        self.stall_next_supply.store(true, Ordering::SeqCst);
    }

    pub fn release_supply_read(&self) {
        self.supply_release.notify_one();
    }

    pub fn sent(&self) -> Vec<ContractWrite> {
        self.ledger.lock().unwrap().sent.clone()
    }

    fn read(&self) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BlockchainError::ContractCall("connection refused".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl YeilContract for FakeYeilContract {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn address(&self) -> Address {
        self.address
    }

    fn signer_address(&self) -> Option<Address> {
        self.signer
    }

    async fn block_number(&self) -> Result<u64> {
        self.read()?;
        Ok(100)
    }

    async fn native_balance(&self, _account: Address) -> Result<U256> {
        self.read()?;
        Ok(U256::from(10u64) * U256::exp10(18))
    }

    async fn token_name(&self) -> Result<String> {
        self.read()?;
        Ok("Yeil <Reserve> Token".to_string())
    }

    async fn token_symbol(&self) -> Result<String> {
        self.read()?;
        Ok("YEIL".to_string())
    }

    async fn decimals(&self) -> Result<u8> {
        self.read()?;
        Ok(self.decimals)
    }

    async fn total_supply(&self) -> Result<U256> {
        self.read()?;
        let supply = self.ledger.lock().unwrap().total_supply;
        if self.stall_next_supply.swap(false, Ordering::SeqCst) {
            self.supply_release.notified().await;
        }
        Ok(supply)
    }

    async fn verified_reserves(&self) -> Result<U256> {
        self.read()?;
        Ok(self.verified_reserves)
    }

    async fn is_fully_backed(&self) -> Result<bool> {
        self.read()?;
        Ok(self.verified_reserves >= self.ledger.lock().unwrap().total_supply)
    }

    async fn proof_of_reserve_address(&self) -> Result<Address> {
        self.read()?;
        Ok(Address::repeat_byte(0xfe))
    }

    async fn balance_of(&self, account: Address) -> Result<U256> {
        self.read()?;
        Ok(self.ledger.lock().unwrap().balances.get(&account).copied().unwrap_or_default())
    }

    async fn balance_of_at(&self, account: Address, snapshot_id: U256) -> Result<U256> {
        self.read()?;
        let ledger = self.ledger.lock().unwrap();
        let (_, balances) = ledger
            .snapshots
            .iter()
            .find(|(id, _)| *id == snapshot_id)
            .ok_or_else(|| BlockchainError::ContractCall("execution reverted: nonexistent id".to_string()))?;
        Ok(balances.get(&account).copied().unwrap_or_default())
    }

    async fn total_supply_at(&self, snapshot_id: U256) -> Result<U256> {
        self.read()?;
        let ledger = self.ledger.lock().unwrap();
        let (_, balances) = ledger
            .snapshots
            .iter()
            .find(|(id, _)| *id == snapshot_id)
            .ok_or_else(|| BlockchainError::ContractCall("execution reverted: nonexistent id".to_string()))?;
        Ok(balances.values().fold(U256::zero(), |acc, v| acc + *v))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.read()?;
        Ok(self
            .ledger
            .lock()
            .unwrap()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn send(&self, write: &ContractWrite) -> Result<H256> {
        let signer = self.signer.ok_or(BlockchainError::SignerUnavailable(self.chain_id))?;
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(BlockchainError::ContractCall(format!(
                "{}: user rejected transaction",
                write.method_name()
            ))
            .into());
        }

        let mut ledger = self.ledger.lock().unwrap();
        match write {
            ContractWrite::Mint { to, amount } => {
                ledger.total_supply += *amount;
                *ledger.balances.entry(*to).or_default() += *amount;
            }
            ContractWrite::Burn { from, amount } => {
                let balance = ledger.balances.entry(*from).or_default();
                if *balance < *amount {
                    return Err(anyhow!("burn: execution reverted: burn amount exceeds balance"));
                }
                *balance -= *amount;
                ledger.total_supply -= *amount;
            }
            ContractWrite::Transfer { to, amount } => {
                let balance = ledger.balances.entry(signer).or_default();
                if *balance < *amount {
                    return Err(anyhow!("transfer: execution reverted: transfer amount exceeds balance"));
                }
                *balance -= *amount;
                *ledger.balances.entry(*to).or_default() += *amount;
            }
            ContractWrite::Approve { spender, amount } => {
                ledger.allowances.insert((signer, *spender), *amount);
            }
            ContractWrite::Snapshot => {
                let id = U256::from(ledger.snapshots.len() + 1);
                let balances = ledger.balances.clone();
                ledger.snapshots.push((id, balances));
            }
        }
        ledger.sent.push(write.clone());

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst) as u64;
        Ok(H256::from_low_u64_be(nonce + 1))
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<ReceiptSummary> {
        self.receipt_permits.acquire().await?.forget();
        if self.revert_receipts.load(Ordering::SeqCst) {
            return Err(BlockchainError::TransactionReverted(format!("{tx_hash:?}")).into());
        }
        Ok(ReceiptSummary {
            transaction_hash: tx_hash,
            block_number: Some(101),
            gas_used: Some(U256::from(21_000u64)),
        })
    }
}
