use chrono::{DateTime, Utc};
use ethers::core::types::H256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Write actions the dashboard can submit to the Yeil contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Transfer,
    Mint,
    Burn,
    Snapshot,
    Approve,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionKind::Transfer => "transfer",
            TransactionKind::Mint => "mint",
            TransactionKind::Burn => "burn",
            TransactionKind::Snapshot => "snapshot",
            TransactionKind::Approve => "approve",
        };
        f.write_str(name)
    }
}

/// A write as entered by the user: addresses and display amounts, not yet
/// validated or scaled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WriteRequest {
    Transfer { to: String, amount: String },
    Mint { to: String, amount: String },
    Burn { from: String, amount: String },
    Snapshot,
    Approve { spender: String, amount: String },
}

impl WriteRequest {
    pub fn amount(&self) -> Option<&str> {
        match self {
            WriteRequest::Transfer { amount, .. }
            | WriteRequest::Mint { amount, .. }
            | WriteRequest::Burn { amount, .. }
            | WriteRequest::Approve { amount, .. } => Some(amount),
            WriteRequest::Snapshot => None,
        }
    }

    pub fn counterparty(&self) -> Option<&str> {
        match self {
            WriteRequest::Transfer { to, .. } | WriteRequest::Mint { to, .. } => Some(to),
            WriteRequest::Burn { from, .. } => Some(from),
            WriteRequest::Approve { spender, .. } => Some(spender),
            WriteRequest::Snapshot => None,
        }
    }
}

/// Lifecycle of one write: pending until the signer hands back a hash,
/// confirming until the receipt arrives, then success or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionPhase {
    Pending,
    Confirming,
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionState {
    pub id: String,
    pub chain_id: u64,
    pub kind: TransactionKind,
    pub counterparty: Option<String>,
    pub amount: Option<String>,
    pub hash: Option<H256>,
    pub is_pending: bool,
    pub is_confirming: bool,
    pub is_success: bool,
    pub error: Option<String>,
    pub block_number: Option<u64>,
    pub explorer_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionState {
    pub fn new(chain_id: u64, kind: TransactionKind) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chain_id,
            kind,
            counterparty: None,
            amount: None,
            hash: None,
            is_pending: true,
            is_confirming: false,
            is_success: false,
            error: None,
            block_number: None,
            explorer_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_details(mut self, counterparty: Option<String>, amount: Option<String>) -> Self {
        self.counterparty = counterparty;
        self.amount = amount;
        self
    }

    pub fn phase(&self) -> TransactionPhase {
        if self.error.is_some() {
            TransactionPhase::Failed
        } else if self.is_success {
            TransactionPhase::Success
        } else if self.is_confirming {
            TransactionPhase::Confirming
        } else {
            TransactionPhase::Pending
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase(), TransactionPhase::Success | TransactionPhase::Failed)
    }

    pub fn confirming(&mut self, hash: H256, explorer_url: Option<String>) {
        self.hash = Some(hash);
        self.explorer_url = explorer_url;
        self.is_pending = false;
        self.is_confirming = true;
        self.touch();
    }

    pub fn succeeded(&mut self, block_number: Option<u64>) {
        self.block_number = block_number;
        self.is_pending = false;
        self.is_confirming = false;
        self.is_success = true;
        self.touch();
    }

    pub fn failed(&mut self, error: String) {
        self.is_pending = false;
        self.is_confirming = false;
        self.is_success = false;
        self.error = Some(error);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
