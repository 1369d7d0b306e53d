use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for the Yeil dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DashboardError {
    // Blockchain errors
    Blockchain(BlockchainError),

    // Validation errors
    Validation(ValidationError),

    // A write is already pending or confirming on the chain
    Conflict(String),

    NotFound(String),

    // Generic errors
    Internal(String),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Blockchain(e) => write!(f, "Blockchain error: {e}"),
            DashboardError::Validation(e) => write!(f, "Validation error: {e}"),
            DashboardError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            DashboardError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DashboardError::Internal(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for DashboardError {}

impl DashboardError {
    fn status_and_type(&self) -> (actix_web::http::StatusCode, &'static str) {
        use actix_web::http::StatusCode;
        match self {
            DashboardError::Blockchain(e) => e.status_and_type(),
            DashboardError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            DashboardError::Conflict(_) => (StatusCode::CONFLICT, "TRANSACTION_IN_PROGRESS"),
            DashboardError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            DashboardError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl ResponseError for DashboardError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        self.status_and_type().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, error_type) = self.status_and_type();
        HttpResponse::build(status_code).json(serde_json::json!({
            "error": error_type,
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }
}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        // Errors raised inside the blockchain layer keep their variant.
        match err.downcast::<BlockchainError>() {
            Ok(e) => DashboardError::Blockchain(e),
            Err(err) => match err.downcast::<DashboardError>() {
                Ok(e) => e,
                Err(err) => DashboardError::Internal(err.to_string()),
            },
        }
    }
}

impl From<BlockchainError> for DashboardError {
    fn from(err: BlockchainError) -> Self {
        DashboardError::Blockchain(err)
    }
}

impl From<ValidationError> for DashboardError {
    fn from(err: ValidationError) -> Self {
        DashboardError::Validation(err)
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Validation(ValidationError::InvalidJson(err.to_string()))
    }
}

// Blockchain Errors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BlockchainError {
    UnsupportedChain(u64),
    MissingContractAddress(u64),
    SignerUnavailable(u64),
    ContractCall(String),
    TransactionReverted(String),
    ReceiptUnavailable(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::UnsupportedChain(id) => write!(f, "Unsupported chain: {id}"),
            BlockchainError::MissingContractAddress(id) => {
                write!(f, "No contract address configured for chain {id}")
            }
            BlockchainError::SignerUnavailable(id) => {
                write!(f, "No signer configured for chain {id}; the dashboard is read-only")
            }
            BlockchainError::ContractCall(msg) => write!(f, "Contract call failed: {msg}"),
            BlockchainError::TransactionReverted(hash) => write!(f, "Transaction reverted: {hash}"),
            BlockchainError::ReceiptUnavailable(hash) => {
                write!(f, "Transaction dropped before a receipt was available: {hash}")
            }
        }
    }
}

impl std::error::Error for BlockchainError {}

impl BlockchainError {
    fn status_and_type(&self) -> (actix_web::http::StatusCode, &'static str) {
        use actix_web::http::StatusCode;
        match self {
            BlockchainError::UnsupportedChain(_) => (StatusCode::BAD_REQUEST, "UNSUPPORTED_CHAIN"),
            BlockchainError::MissingContractAddress(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "CONTRACT_NOT_CONFIGURED")
            }
            BlockchainError::SignerUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SIGNER_UNAVAILABLE")
            }
            BlockchainError::ContractCall(_) => (StatusCode::BAD_GATEWAY, "CONTRACT_CALL_FAILED"),
            BlockchainError::TransactionReverted(_) => {
                (StatusCode::BAD_GATEWAY, "TRANSACTION_REVERTED")
            }
            BlockchainError::ReceiptUnavailable(_) => {
                (StatusCode::BAD_GATEWAY, "RECEIPT_UNAVAILABLE")
            }
        }
    }
}

// Validation Errors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ValidationError {
    InvalidAddress(String),
    ZeroAddress(String),
    InvalidAmount(String),
    ZeroAmount,
    InvalidSnapshotId(String),
    InvalidJson(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            ValidationError::ZeroAddress(field) => write!(f, "{field} cannot be the zero address"),
            ValidationError::InvalidAmount(amount) => write!(f, "Invalid amount: {amount}"),
            ValidationError::ZeroAmount => write!(f, "Amount must be greater than zero"),
            ValidationError::InvalidSnapshotId(id) => write!(f, "Invalid snapshot id: {id}"),
            ValidationError::InvalidJson(msg) => write!(f, "Invalid JSON: {msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}
