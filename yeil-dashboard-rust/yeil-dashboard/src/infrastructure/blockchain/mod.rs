pub mod contract;
pub mod ethereum;
pub mod manager;

#[cfg(test)]
pub mod fake;
