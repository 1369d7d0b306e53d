pub mod token_service;
pub mod transaction_tracker;
