use crate::domain::transaction::TransactionState;
use ethers::core::types::H256;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

#[derive(Default)]
struct TrackerInner {
    states: HashMap<String, TransactionState>,
    // Insertion order, oldest first.
    order: VecDeque<String>,
}

/// Registry of write transactions submitted through this process.
pub struct TransactionTracker {
    inner: RwLock<TrackerInner>,
    max_entries: usize,
}

impl TransactionTracker {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: RwLock::new(TrackerInner::default()),
            max_entries: max_entries.max(1),
        }
    }

    pub async fn create(&self, state: TransactionState) -> TransactionState {
        let mut inner = self.inner.write().await;
        inner.order.push_back(state.id.clone());
        inner.states.insert(state.id.clone(), state.clone());

        // Evict the oldest finished entries first; in-flight ones stay until
        // nothing else is left to drop.
        while inner.states.len() > self.max_entries {
            let victim = inner
                .order
                .iter()
                .position(|id| inner.states.get(id).map(|s| s.is_finished()).unwrap_or(true))
                .unwrap_or(0);
            if let Some(id) = inner.order.remove(victim) {
                inner.states.remove(&id);
            }
        }

        state
    }

    async fn update<F>(&self, id: &str, f: F) -> Option<TransactionState>
    where
        F: FnOnce(&mut TransactionState),
    {
        let mut inner = self.inner.write().await;
        let state = inner.states.get_mut(id)?;
        f(state);
        Some(state.clone())
    }

    pub async fn mark_confirming(&self, id: &str, hash: H256, explorer_url: Option<String>) -> Option<TransactionState> {
        self.update(id, |s| s.confirming(hash, explorer_url)).await
    }

    pub async fn mark_success(&self, id: &str, block_number: Option<u64>) -> Option<TransactionState> {
        self.update(id, |s| s.succeeded(block_number)).await
    }

    pub async fn mark_failed(&self, id: &str, error: String) -> Option<TransactionState> {
        self.update(id, |s| s.failed(error)).await
    }

    pub async fn get(&self, id: &str) -> Option<TransactionState> {
        self.inner.read().await.states.get(id).cloned()
    }

    /// Newest first, optionally restricted to one chain.
    pub async fn list(&self, chain_id: Option<u64>, limit: usize) -> Vec<TransactionState> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.states.get(id))
            .filter(|s| chain_id.map_or(true, |c| s.chain_id == c))
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{TransactionKind, TransactionPhase};

    #[tokio::test]
    async fn test_lifecycle_updates() {
        let tracker = TransactionTracker::new(10);
        let state = tracker.create(TransactionState::new(1, TransactionKind::Transfer)).await;

        let confirming = tracker
            .mark_confirming(&state.id, H256::repeat_byte(7), None)
            .await
            .unwrap();
        assert_eq!(confirming.phase(), TransactionPhase::Confirming);

        let done = tracker.mark_success(&state.id, Some(5)).await.unwrap();
        assert_eq!(done.phase(), TransactionPhase::Success);
        assert_eq!(tracker.get(&state.id).await.unwrap().block_number, Some(5));

        assert!(tracker.mark_failed("missing", "x".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_filtered() {
        let tracker = TransactionTracker::new(10);
        let a = tracker.create(TransactionState::new(1, TransactionKind::Mint)).await;
        let b = tracker.create(TransactionState::new(31337, TransactionKind::Burn)).await;
        let c = tracker.create(TransactionState::new(1, TransactionKind::Snapshot)).await;

        let all: Vec<String> = tracker.list(None, 10).await.into_iter().map(|s| s.id).collect();
        assert_eq!(all, vec![c.id.clone(), b.id.clone(), a.id.clone()]);

        let mainnet: Vec<String> = tracker.list(Some(1), 10).await.into_iter().map(|s| s.id).collect();
        assert_eq!(mainnet, vec![c.id, a.id]);

        assert_eq!(tracker.list(None, 1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_eviction_prefers_finished_entries() {
        let tracker = TransactionTracker::new(2);
        let in_flight = tracker.create(TransactionState::new(1, TransactionKind::Mint)).await;
        let finished = tracker.create(TransactionState::new(1, TransactionKind::Burn)).await;
        tracker.mark_failed(&finished.id, "reverted".to_string()).await;

        let newest = tracker.create(TransactionState::new(1, TransactionKind::Approve)).await;

        assert_eq!(tracker.len().await, 2);
        assert!(tracker.get(&in_flight.id).await.is_some());
        assert!(tracker.get(&finished.id).await.is_none());
        assert!(tracker.get(&newest.id).await.is_some());
    }
}
