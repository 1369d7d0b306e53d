use crate::domain::error::ValidationError;
use ethers::core::types::{Address, U256};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DECIMAL_AMOUNT: Regex = Regex::new(r"^(\d+)(?:\.(\d+))?$").unwrap();
}

pub fn validate_ethereum_address(address: &str) -> bool {
    address.len() == 42 && address.starts_with("0x") && address.parse::<Address>().is_ok()
}

/// Parses a user-supplied address. `field` names the input in the error.
pub fn parse_address(field: &str, address: &str) -> Result<Address, ValidationError> {
    let address = address.trim();
    if !validate_ethereum_address(address) {
        return Err(ValidationError::InvalidAddress(format!("{field}: '{address}'")));
    }
    address
        .parse::<Address>()
        .map_err(|_| ValidationError::InvalidAddress(format!("{field}: '{address}'")))
}

/// Like `parse_address` but rejects 0x000...0, which the contract treats as
/// burn/mint sentinels.
pub fn parse_recipient(field: &str, address: &str) -> Result<Address, ValidationError> {
    let parsed = parse_address(field, address)?;
    if parsed.is_zero() {
        return Err(ValidationError::ZeroAddress(field.to_string()));
    }
    Ok(parsed)
}

/// Scales a decimal display amount ("12.5") into base units.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, ValidationError> {
    let amount = amount.trim();
    let captures = DECIMAL_AMOUNT
        .captures(amount)
        .ok_or_else(|| ValidationError::InvalidAmount(amount.to_string()))?;

    let fraction_len = captures.get(2).map(|m| m.as_str().len()).unwrap_or(0);
    if fraction_len > decimals as usize {
        return Err(ValidationError::InvalidAmount(format!(
            "{amount} has more than {decimals} decimal places"
        )));
    }

    let value = if decimals == 0 {
        U256::from_dec_str(amount).map_err(|_| ValidationError::InvalidAmount(amount.to_string()))?
    } else {
        match ethers::utils::parse_units(amount, decimals as u32) {
            Ok(ethers::utils::ParseUnits::U256(value)) => value,
            _ => return Err(ValidationError::InvalidAmount(amount.to_string())),
        }
    };

    if value.is_zero() {
        return Err(ValidationError::ZeroAmount);
    }
    Ok(value)
}

pub fn parse_snapshot_id(id: &str) -> Result<U256, ValidationError> {
    U256::from_dec_str(id.trim()).map_err(|_| ValidationError::InvalidSnapshotId(id.to_string()))
}

/// Formats base units for display, without trailing zeros.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    match ethers::utils::format_units(amount, decimals as u32) {
        Ok(formatted) if formatted.contains('.') => {
            formatted.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        Ok(formatted) => formatted,
        Err(_) => amount.to_string(),
    }
}
