use crate::app::transaction_tracker::TransactionTracker;
use crate::domain::error::{BlockchainError, DashboardError, ValidationError};
use crate::domain::token::{Allowance, Balance, SnapshotBalance, SnapshotSupply, TokenInfo};
use crate::domain::transaction::{TransactionState, WriteRequest};
use crate::infrastructure::blockchain::contract::{ContractWrite, YeilContract};
use crate::infrastructure::blockchain::ethereum::{
    format_amount, parse_address, parse_amount, parse_recipient, parse_snapshot_id,
};
use crate::infrastructure::blockchain::manager::BlockchainManager;
use crate::infrastructure::logger::Logger;
use crate::infrastructure::monitoring::manager::MonitoringManager;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Cached token info per chain. Each invalidation bumps the chain's
/// generation so a fetch that started earlier cannot overwrite newer data.
#[derive(Default)]
struct TokenInfoCache {
    entries: HashMap<u64, TokenInfo>,
    generations: HashMap<u64, u64>,
}

impl TokenInfoCache {
    fn generation(&self, chain_id: u64) -> u64 {
        self.generations.get(&chain_id).copied().unwrap_or_default()
    }
}

/// Aggregates the contract reads and writes the dashboard needs: token
/// metadata, balances, snapshot queries and the write lifecycle.
pub struct TokenService {
    blockchain: Arc<BlockchainManager>,
    tracker: Arc<TransactionTracker>,
    monitoring: Arc<MonitoringManager>,
    default_chain_id: u64,
    cache: RwLock<TokenInfoCache>,
    write_locks: HashMap<u64, Arc<Mutex<()>>>,
}

impl TokenService {
    pub fn new(
        blockchain: Arc<BlockchainManager>,
        tracker: Arc<TransactionTracker>,
        monitoring: Arc<MonitoringManager>,
        default_chain_id: u64,
    ) -> Self {
        let write_locks = blockchain
            .chains()
            .into_iter()
            .map(|c| (c.chain_id, Arc::new(Mutex::new(()))))
            .collect();

        Self {
            blockchain,
            tracker,
            monitoring,
            default_chain_id,
            cache: RwLock::new(TokenInfoCache::default()),
            write_locks,
        }
    }

    pub fn resolve_chain(&self, chain_id: Option<u64>) -> u64 {
        chain_id.unwrap_or(self.default_chain_id)
    }

    pub fn blockchain(&self) -> &Arc<BlockchainManager> {
        &self.blockchain
    }

    pub fn tracker(&self) -> &Arc<TransactionTracker> {
        &self.tracker
    }

    async fn read_failed(&self, chain_id: u64, operation: &str, err: anyhow::Error) -> DashboardError {
        self.monitoring.increment_metric("contract_read_errors").await;
        Logger::contract_read_failed(chain_id, operation, &err.to_string());
        DashboardError::from(err)
    }

    /// Token metadata and backing status, served from cache when present.
    pub async fn token_info(&self, chain_id: u64) -> Result<TokenInfo, DashboardError> {
        if let Some(info) = self.cache.read().await.entries.get(&chain_id) {
            self.monitoring.increment_metric("token_info_cache_hits").await;
            return Ok(info.clone());
        }
        self.fetch_token_info(chain_id).await
    }

    pub async fn refresh_token_info(&self, chain_id: u64) -> Result<TokenInfo, DashboardError> {
        self.invalidate(chain_id).await;
        self.fetch_token_info(chain_id).await
    }

    async fn invalidate(&self, chain_id: u64) {
        let mut cache = self.cache.write().await;
        cache.entries.remove(&chain_id);
        *cache.generations.entry(chain_id).or_default() += 1;
    }

    async fn fetch_token_info(&self, chain_id: u64) -> Result<TokenInfo, DashboardError> {
        let chain = self.blockchain.chain(chain_id)?.clone();
        let contract = self.blockchain.contract(chain_id)?;
        let generation = self.cache.read().await.generation(chain_id);

        self.monitoring.increment_metric("contract_reads").await;
        let reads = futures::try_join!(
            contract.token_name(),
            contract.token_symbol(),
            contract.decimals(),
            contract.total_supply(),
            contract.verified_reserves(),
            contract.is_fully_backed(),
            contract.proof_of_reserve_address(),
        );
        let (name, symbol, decimals, total_supply, verified_reserves, is_fully_backed, feed) = match reads {
            Ok(values) => values,
            Err(e) => return Err(self.read_failed(chain_id, "token_info", e).await),
        };

        let info = TokenInfo {
            chain_id,
            contract_address: contract.address(),
            name,
            symbol,
            decimals,
            total_supply,
            total_supply_formatted: format_amount(total_supply, decimals),
            verified_reserves,
            verified_reserves_formatted: format_amount(verified_reserves, decimals),
            is_fully_backed,
            proof_of_reserve_feed_address: feed,
            proof_of_reserve_feed_url: chain.address_url(&format!("{feed:?}")),
            fetched_at: Utc::now(),
        };

        let mut cache = self.cache.write().await;
        if cache.generation(chain_id) == generation {
            cache.entries.insert(chain_id, info.clone());
        }
        Ok(info)
    }

    pub async fn balance(&self, chain_id: u64, account: &str) -> Result<Balance, DashboardError> {
        let account = parse_address("account", account)?;
        let info = self.token_info(chain_id).await?;
        let contract = self.blockchain.contract(chain_id)?;

        self.monitoring.increment_metric("contract_reads").await;
        let balance = match contract.balance_of(account).await {
            Ok(balance) => balance,
            Err(e) => return Err(self.read_failed(chain_id, "getBalance", e).await),
        };

        Ok(Balance {
            chain_id,
            account,
            symbol: info.symbol,
            balance,
            balance_formatted: format_amount(balance, info.decimals),
        })
    }

    /// Native currency balance, formatted with 18 decimals and the chain's
    /// currency symbol.
    pub async fn native_balance(&self, chain_id: u64, account: &str) -> Result<Balance, DashboardError> {
        let account = parse_address("account", account)?;
        let symbol = self.blockchain.chain(chain_id)?.currency_symbol.clone();
        let contract = self.blockchain.contract(chain_id)?;

        self.monitoring.increment_metric("contract_reads").await;
        let balance = match contract.native_balance(account).await {
            Ok(balance) => balance,
            Err(e) => return Err(self.read_failed(chain_id, "eth_getBalance", e).await),
        };

        Ok(Balance {
            chain_id,
            account,
            symbol,
            balance,
            balance_formatted: format_amount(balance, 18),
        })
    }

    /// Whether a write currently holds the chain's slot.
    pub fn write_in_progress(&self, chain_id: u64) -> bool {
        self.write_locks
            .get(&chain_id)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }

    pub async fn balance_at(
        &self,
        chain_id: u64,
        account: &str,
        snapshot_id: &str,
    ) -> Result<SnapshotBalance, DashboardError> {
        let account = parse_address("account", account)?;
        let id = parse_snapshot_id(snapshot_id)?;
        let info = self.token_info(chain_id).await?;
        let contract = self.blockchain.contract(chain_id)?;

        self.monitoring.increment_metric("contract_reads").await;
        let balance = match contract.balance_of_at(account, id).await {
            Ok(balance) => balance,
            Err(e) => return Err(self.read_failed(chain_id, "balanceOfAt", e).await),
        };

        Ok(SnapshotBalance {
            chain_id,
            snapshot_id: id,
            account,
            balance,
            balance_formatted: format_amount(balance, info.decimals),
        })
    }

    pub async fn total_supply_at(&self, chain_id: u64, snapshot_id: &str) -> Result<SnapshotSupply, DashboardError> {
        let id = parse_snapshot_id(snapshot_id)?;
        let info = self.token_info(chain_id).await?;
        let contract = self.blockchain.contract(chain_id)?;

        self.monitoring.increment_metric("contract_reads").await;
        let total_supply = match contract.total_supply_at(id).await {
            Ok(supply) => supply,
            Err(e) => return Err(self.read_failed(chain_id, "totalSupplyAt", e).await),
        };

        Ok(SnapshotSupply {
            chain_id,
            snapshot_id: id,
            total_supply,
            total_supply_formatted: format_amount(total_supply, info.decimals),
        })
    }

    pub async fn allowance(&self, chain_id: u64, owner: &str, spender: &str) -> Result<Allowance, DashboardError> {
        let owner = parse_address("owner", owner)?;
        let spender = parse_address("spender", spender)?;
        let info = self.token_info(chain_id).await?;
        let contract = self.blockchain.contract(chain_id)?;

        self.monitoring.increment_metric("contract_reads").await;
        let allowance = match contract.allowance(owner, spender).await {
            Ok(allowance) => allowance,
            Err(e) => return Err(self.read_failed(chain_id, "allowance", e).await),
        };

        Ok(Allowance {
            chain_id,
            owner,
            spender,
            allowance,
            allowance_formatted: format_amount(allowance, info.decimals),
        })
    }

    fn validate_write(request: &WriteRequest, decimals: u8) -> Result<ContractWrite, ValidationError> {
        Ok(match request {
            WriteRequest::Transfer { to, amount } => ContractWrite::Transfer {
                to: parse_recipient("to", to)?,
                amount: parse_amount(amount, decimals)?,
            },
            WriteRequest::Mint { to, amount } => ContractWrite::Mint {
                to: parse_recipient("to", to)?,
                amount: parse_amount(amount, decimals)?,
            },
            WriteRequest::Burn { from, amount } => ContractWrite::Burn {
                from: parse_address("from", from)?,
                amount: parse_amount(amount, decimals)?,
            },
            WriteRequest::Snapshot => ContractWrite::Snapshot,
            WriteRequest::Approve { spender, amount } => ContractWrite::Approve {
                spender: parse_recipient("spender", spender)?,
                amount: parse_amount(amount, decimals)?,
            },
        })
    }

    fn acquire_write_slot(&self, chain_id: u64) -> Result<OwnedMutexGuard<()>, DashboardError> {
        let lock = self
            .write_locks
            .get(&chain_id)
            .ok_or(BlockchainError::UnsupportedChain(chain_id))?;
        Arc::clone(lock).try_lock_owned().map_err(|_| {
            DashboardError::Conflict(format!(
                "A transaction is already pending or confirming on chain {chain_id}"
            ))
        })
    }

    /// Validates and starts a write. Returns the state in its pending phase;
    /// submission and confirmation continue on a background task that holds
    /// the chain's write slot until the receipt arrives.
    pub async fn submit(self: &Arc<Self>, chain_id: u64, request: WriteRequest) -> Result<TransactionState, DashboardError> {
        let contract = self.blockchain.contract(chain_id)?;
        if contract.signer_address().is_none() {
            return Err(BlockchainError::SignerUnavailable(chain_id).into());
        }

        let decimals = match request.amount() {
            Some(_) => self.token_info(chain_id).await?.decimals,
            None => 0,
        };
        let write = Self::validate_write(&request, decimals)?;

        let slot = match self.acquire_write_slot(chain_id) {
            Ok(slot) => slot,
            Err(e) => {
                self.monitoring.increment_metric("writes_rejected_busy").await;
                return Err(e);
            }
        };

        let state = TransactionState::new(chain_id, write.kind()).with_details(
            request.counterparty().map(str::to_string),
            request.amount().map(str::to_string),
        );
        let state = self.tracker.create(state).await;

        let service = Arc::clone(self);
        let id = state.id.clone();
        tokio::spawn(async move {
            let _slot = slot;
            service.execute(&id, chain_id, contract, write).await;
        });

        Ok(state)
    }

    async fn execute(&self, id: &str, chain_id: u64, contract: Arc<dyn YeilContract>, write: ContractWrite) {
        let tx_hash = match contract.send(&write).await {
            Ok(hash) => hash,
            Err(e) => {
                self.fail(id, chain_id, e.to_string()).await;
                return;
            }
        };

        let hash_str = format!("{tx_hash:?}");
        let explorer_url = self.blockchain.chain(chain_id).ok().and_then(|c| c.tx_url(&hash_str));
        self.monitoring.increment_metric("writes_submitted").await;
        Logger::transaction_submitted(&hash_str, chain_id, &write.kind().to_string());
        self.tracker.mark_confirming(id, tx_hash, explorer_url).await;

        match contract.wait_for_receipt(tx_hash).await {
            Ok(receipt) => {
                self.monitoring.increment_metric("writes_confirmed").await;
                Logger::transaction_confirmed(
                    &hash_str,
                    chain_id,
                    receipt.block_number,
                    receipt.gas_used.map(|g| g.low_u64()),
                );
                // Token info must be fresh by the time the state reads success.
                if let Err(e) = self.refresh_token_info(chain_id).await {
                    tracing::warn!("Token info refresh after {} failed: {}", hash_str, e);
                }
                self.tracker.mark_success(id, receipt.block_number).await;
            }
            Err(e) => self.fail(id, chain_id, e.to_string()).await,
        }
    }

    async fn fail(&self, id: &str, chain_id: u64, error: String) {
        self.monitoring.increment_metric("writes_failed").await;
        Logger::transaction_failed(id, chain_id, &error);
        self.tracker.mark_failed(id, error).await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::transaction::TransactionPhase;
    use crate::infrastructure::blockchain::fake::{FakeYeilContract, FAKE_SIGNER};
    use crate::infrastructure::config::tests::test_config;
    use crate::infrastructure::config::{LOCALHOST_CHAIN_ID, MANTLE_CHAIN_ID, MANTLE_SEPOLIA_CHAIN_ID};
    use ethers::core::types::U256;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    pub(crate) const ALICE: &str = "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6";

    pub(crate) fn service_with(fakes: Vec<Arc<FakeYeilContract>>) -> Arc<TokenService> {
        service_with_monitoring(fakes, Arc::new(MonitoringManager::new()))
    }

    pub(crate) fn service_with_monitoring(
        fakes: Vec<Arc<FakeYeilContract>>,
        monitoring: Arc<MonitoringManager>,
    ) -> Arc<TokenService> {
        let config = test_config();
        let mut contracts: HashMap<u64, Arc<dyn YeilContract>> = HashMap::new();
        let signer = fakes.first().and_then(|f| f.signer_address());
        for fake in fakes {
            contracts.insert(fake.chain_id(), fake);
        }
        let blockchain = Arc::new(BlockchainManager::with_contracts(
            config.supported_chains.clone(),
            contracts,
            signer,
        ));
        Arc::new(TokenService::new(
            blockchain,
            Arc::new(TransactionTracker::new(100)),
            monitoring,
            LOCALHOST_CHAIN_ID,
        ))
    }

    pub(crate) async fn wait_finished(service: &TokenService, id: &str) -> TransactionState {
        for _ in 0..200 {
            let state = service.tracker().get(id).await.unwrap();
            if state.is_finished() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("transaction {id} never finished");
    }

    #[tokio::test]
    async fn test_token_info_aggregates_and_caches() {
        let fake = Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID));
        let service = service_with(vec![fake.clone()]);

        let info = service.token_info(LOCALHOST_CHAIN_ID).await.unwrap();
        assert_eq!(info.symbol, "YEIL");
        assert_eq!(info.decimals, 18);
        assert_eq!(info.total_supply_formatted, "1000");
        assert_eq!(info.verified_reserves_formatted, "2000");
        assert!(info.is_fully_backed);
        assert!(info.proof_of_reserve_feed_url.is_none());

        let reads = fake.reads.load(Ordering::SeqCst);
        assert_eq!(reads, 7);
        service.token_info(LOCALHOST_CHAIN_ID).await.unwrap();
        assert_eq!(fake.reads.load(Ordering::SeqCst), reads);

        service.refresh_token_info(LOCALHOST_CHAIN_ID).await.unwrap();
        assert_eq!(fake.reads.load(Ordering::SeqCst), reads * 2);
    }

    #[tokio::test]
    async fn test_slow_fetch_does_not_overwrite_refreshed_info() {
        let fake = Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID));
        let service = service_with(vec![fake.clone()]);

        fake.stall_next_supply_read();
        let slow = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.token_info(LOCALHOST_CHAIN_ID).await })
        };
        for _ in 0..200 {
            if fake.reads.load(Ordering::SeqCst) >= 7 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert_eq!(fake.reads.load(Ordering::SeqCst), 7);

        let state = service
            .submit(
                LOCALHOST_CHAIN_ID,
                WriteRequest::Mint { to: ALICE.to_string(), amount: "5".to_string() },
            )
            .await
            .unwrap();
        assert_eq!(wait_finished(&service, &state.id).await.phase(), TransactionPhase::Success);

        fake.release_supply_read();
        let stale = slow.await.unwrap().unwrap();
        assert_eq!(stale.total_supply_formatted, "1000");

        let cached = service.token_info(LOCALHOST_CHAIN_ID).await.unwrap();
        assert_eq!(cached.total_supply_formatted, "1005");
    }

    #[tokio::test]
    async fn test_missing_contract_and_unknown_chain() {
        let service = service_with(vec![Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID))]);

        let err = service.token_info(MANTLE_CHAIN_ID).await.unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Blockchain(BlockchainError::MissingContractAddress(MANTLE_CHAIN_ID))
        ));

        let err = service.token_info(5).await.unwrap_err();
        assert!(matches!(err, DashboardError::Blockchain(BlockchainError::UnsupportedChain(5))));
    }

    #[tokio::test]
    async fn test_read_errors_surface_as_blockchain_errors() {
        let fake = Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID));
        fake.fail_reads.store(true, Ordering::SeqCst);
        let service = service_with(vec![fake]);

        let err = service.token_info(LOCALHOST_CHAIN_ID).await.unwrap_err();
        assert!(matches!(err, DashboardError::Blockchain(BlockchainError::ContractCall(_))));
    }

    #[tokio::test]
    async fn test_balance_and_allowance() {
        let service = service_with(vec![Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID))]);
        let signer = format!("{FAKE_SIGNER:?}");

        let balance = service.balance(LOCALHOST_CHAIN_ID, &signer).await.unwrap();
        assert_eq!(balance.balance_formatted, "1000");
        assert_eq!(balance.symbol, "YEIL");

        let empty = service.balance(LOCALHOST_CHAIN_ID, ALICE).await.unwrap();
        assert_eq!(empty.balance, U256::zero());
        assert_eq!(empty.balance_formatted, "0");

        let allowance = service.allowance(LOCALHOST_CHAIN_ID, &signer, ALICE).await.unwrap();
        assert_eq!(allowance.allowance, U256::zero());

        let native = service.native_balance(LOCALHOST_CHAIN_ID, &signer).await.unwrap();
        assert_eq!(native.balance_formatted, "10");
        assert_eq!(native.symbol, "ETH");

        let err = service.balance(LOCALHOST_CHAIN_ID, "bob").await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(ValidationError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_mint_lifecycle_refreshes_token_info() {
        let fake = Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID));
        let service = service_with(vec![fake.clone()]);
        let before = service.token_info(LOCALHOST_CHAIN_ID).await.unwrap();

        let state = service
            .submit(
                LOCALHOST_CHAIN_ID,
                WriteRequest::Mint { to: ALICE.to_string(), amount: "2.5".to_string() },
            )
            .await
            .unwrap();
        assert!(state.is_pending);
        assert_eq!(state.amount.as_deref(), Some("2.5"));

        let done = wait_finished(&service, &state.id).await;
        assert_eq!(done.phase(), TransactionPhase::Success);
        assert!(done.hash.is_some());
        assert_eq!(done.block_number, Some(101));

        let after = service.token_info(LOCALHOST_CHAIN_ID).await.unwrap();
        assert_eq!(before.total_supply_formatted, "1000");
        assert_eq!(after.total_supply_formatted, "1002.5");

        assert_eq!(
            fake.sent(),
            vec![ContractWrite::Mint {
                to: ALICE.parse().unwrap(),
                amount: U256::from(25u64) * U256::exp10(17),
            }]
        );
    }

    #[tokio::test]
    async fn test_burn_debits_the_named_holder() {
        let fake = Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID));
        let service = service_with(vec![fake.clone()]);

        let minted = service
            .submit(
                LOCALHOST_CHAIN_ID,
                WriteRequest::Mint { to: ALICE.to_string(), amount: "5".to_string() },
            )
            .await
            .unwrap();
        wait_finished(&service, &minted.id).await;

        let burned = service
            .submit(
                LOCALHOST_CHAIN_ID,
                WriteRequest::Burn { from: ALICE.to_string(), amount: "2".to_string() },
            )
            .await
            .unwrap();
        assert_eq!(burned.counterparty.as_deref(), Some(ALICE));
        let done = wait_finished(&service, &burned.id).await;
        assert_eq!(done.phase(), TransactionPhase::Success);

        let alice = service.balance(LOCALHOST_CHAIN_ID, ALICE).await.unwrap();
        assert_eq!(alice.balance_formatted, "3");
        let signer = service.balance(LOCALHOST_CHAIN_ID, &format!("{FAKE_SIGNER:?}")).await.unwrap();
        assert_eq!(signer.balance_formatted, "1000");
        assert_eq!(service.token_info(LOCALHOST_CHAIN_ID).await.unwrap().total_supply_formatted, "1003");

        assert_eq!(
            fake.sent()[1],
            ContractWrite::Burn {
                from: ALICE.parse().unwrap(),
                amount: U256::from(2u64) * U256::exp10(18),
            }
        );

        let err = service
            .submit(
                LOCALHOST_CHAIN_ID,
                WriteRequest::Burn { from: "nobody".to_string(), amount: "1".to_string() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(ValidationError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_snapshot_and_queries() {
        let fake = Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID));
        let service = service_with(vec![fake]);

        let state = service.submit(LOCALHOST_CHAIN_ID, WriteRequest::Snapshot).await.unwrap();
        wait_finished(&service, &state.id).await;

        let supply = service.total_supply_at(LOCALHOST_CHAIN_ID, "1").await.unwrap();
        assert_eq!(supply.total_supply_formatted, "1000");

        let signer = format!("{FAKE_SIGNER:?}");
        let at = service.balance_at(LOCALHOST_CHAIN_ID, &signer, "1").await.unwrap();
        assert_eq!(at.balance_formatted, "1000");
        assert_eq!(at.snapshot_id, U256::one());

        let err = service.total_supply_at(LOCALHOST_CHAIN_ID, "9").await.unwrap_err();
        assert!(err.to_string().contains("nonexistent id"));
    }

    #[tokio::test]
    async fn test_submission_failure_is_recorded() {
        let fake = Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID));
        fake.fail_send.store(true, Ordering::SeqCst);
        let service = service_with(vec![fake]);

        let state = service
            .submit(
                LOCALHOST_CHAIN_ID,
                WriteRequest::Burn { from: format!("{FAKE_SIGNER:?}"), amount: "1".to_string() },
            )
            .await
            .unwrap();
        let done = wait_finished(&service, &state.id).await;
        assert_eq!(done.phase(), TransactionPhase::Failed);
        assert!(done.hash.is_none());
        assert!(done.error.unwrap().contains("user rejected"));
    }

    #[tokio::test]
    async fn test_reverted_receipt_is_recorded() {
        let fake = Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID));
        fake.revert_receipts.store(true, Ordering::SeqCst);
        let service = service_with(vec![fake]);

        let state = service
            .submit(
                LOCALHOST_CHAIN_ID,
                WriteRequest::Approve { spender: ALICE.to_string(), amount: "10".to_string() },
            )
            .await
            .unwrap();
        let done = wait_finished(&service, &state.id).await;
        assert_eq!(done.phase(), TransactionPhase::Failed);
        assert!(done.hash.is_some());
        assert!(done.error.unwrap().contains("reverted"));
    }

    #[tokio::test]
    async fn test_second_write_on_same_chain_is_rejected_while_in_flight() {
        let local = Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID).holding_receipts());
        let testnet = Arc::new(FakeYeilContract::new(MANTLE_SEPOLIA_CHAIN_ID));
        let service = service_with(vec![local.clone(), testnet]);

        let first = service.submit(LOCALHOST_CHAIN_ID, WriteRequest::Snapshot).await.unwrap();
        assert!(service.write_in_progress(LOCALHOST_CHAIN_ID));
        assert!(!service.write_in_progress(MANTLE_SEPOLIA_CHAIN_ID));

        let err = service.submit(LOCALHOST_CHAIN_ID, WriteRequest::Snapshot).await.unwrap_err();
        assert!(matches!(err, DashboardError::Conflict(_)));

        // Other chains are independent.
        let other = service.submit(MANTLE_SEPOLIA_CHAIN_ID, WriteRequest::Snapshot).await.unwrap();
        wait_finished(&service, &other.id).await;

        local.release_receipts(1);
        let done = wait_finished(&service, &first.id).await;
        assert_eq!(done.phase(), TransactionPhase::Success);

        // The slot is free again once the first write finished.
        let mut third = None;
        for _ in 0..100 {
            match service.submit(LOCALHOST_CHAIN_ID, WriteRequest::Snapshot).await {
                Ok(state) => {
                    third = Some(state);
                    break;
                }
                Err(_) => tokio::time::sleep(Duration::from_millis(5)).await,
            }
        }
        assert!(third.is_some());
        local.release_receipts(1);
    }

    #[tokio::test]
    async fn test_invalid_writes_are_rejected_before_any_call() {
        let fake = Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID));
        let service = service_with(vec![fake.clone()]);

        let zero = "0x0000000000000000000000000000000000000000".to_string();
        let err = service
            .submit(LOCALHOST_CHAIN_ID, WriteRequest::Transfer { to: zero, amount: "1".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(ValidationError::ZeroAddress(_))));

        let err = service
            .submit(
                LOCALHOST_CHAIN_ID,
                WriteRequest::Burn { from: ALICE.to_string(), amount: "0".to_string() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(ValidationError::ZeroAmount)));

        assert!(fake.sent().is_empty());
        assert!(service.tracker().list(None, 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_read_only_mode_rejects_writes() {
        let fake = Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID).read_only());
        let service = service_with(vec![fake]);

        let err = service.submit(LOCALHOST_CHAIN_ID, WriteRequest::Snapshot).await.unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Blockchain(BlockchainError::SignerUnavailable(LOCALHOST_CHAIN_ID))
        ));
    }
}
