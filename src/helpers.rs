use crate::prelude::Result;
use crate::Error;
use chrono::Utc;
use ethers::types::{Address, Bytes, U256};
use ethers::utils::to_checksum;
use std::time::Duration;

/// Split a human decimal string into its whole and fractional digits,
/// rejecting signs, exponents and empty components.
fn split_decimal(amount: &str) -> Result<(&str, &str)> {
    let text = amount.trim();
    if text.is_empty() {
        return Err(Error::invalid_amount(amount, "amount is empty"));
    }
    if text.starts_with('-') {
        return Err(Error::invalid_amount(amount, "amount must be non-negative"));
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    if whole.is_empty() || (text.contains('.') && fraction.is_empty()) {
        return Err(Error::invalid_amount(amount, "malformed decimal number"));
    }
    let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(whole) || !digits_only(fraction) {
        return Err(Error::invalid_amount(
            amount,
            "only digits and a single decimal point are allowed",
        ));
    }
    Ok((whole, fraction))
}

/// Syntax and sign check for an amount whose token decimals are not known yet.
/// The exact conversion still happens in [`parse_units`].
pub fn validate_positive_amount(amount: &str) -> Result<()> {
    let (whole, fraction) = split_decimal(amount)?;
    if whole.bytes().chain(fraction.bytes()).all(|b| b == b'0') {
        return Err(Error::invalid_amount(amount, "amount must be greater than zero"));
    }
    Ok(())
}

/// Parse a human decimal string (`"1.5"`) into the token's smallest unit using
/// exact fixed-point arithmetic.
///
/// Rejects signs, exponents, empty components and more fractional digits than
/// `decimals` allows, so no precision is ever silently dropped.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let (whole, fraction) = split_decimal(amount)?;
    if fraction.len() > decimals as usize {
        return Err(Error::invalid_amount(
            amount,
            format!("more than {decimals} decimal places cannot be represented exactly"),
        ));
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals as usize - fraction.len()));

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(significant)
        .map_err(|_| Error::invalid_amount(amount, "amount does not fit in 256 bits"))
}

/// Render a smallest-unit amount as a human decimal string, trimming trailing
/// zeros but always keeping one fractional digit (`"1.0"`, `"0.25"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let rendered = match ethers::utils::format_units(value, decimals as u32) {
        Ok(rendered) => rendered,
        Err(_) => return value.to_string(),
    };
    match rendered.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => format!("{rendered}.0"),
    }
}

/// Parse a `0x`-prefixed 20-byte address. Mixed-case input must carry a valid
/// EIP-55 checksum; all-lowercase or all-uppercase input is accepted as is.
pub fn parse_address(input: &str) -> Result<Address> {
    let text = input.trim();
    let hex_part = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| Error::invalid_address(input, "missing 0x prefix"))?;
    if hex_part.len() != 40 {
        return Err(Error::invalid_address(
            input,
            format!("expected 40 hex characters, got {}", hex_part.len()),
        ));
    }
    let raw = hex::decode(hex_part)
        .map_err(|e| Error::invalid_address(input, format!("not hexadecimal: {e}")))?;
    let address = Address::from_slice(&raw);

    let has_lower = hex_part.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex_part.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum(&address, None)[2..] != *hex_part {
        return Err(Error::invalid_address(input, "EIP-55 checksum mismatch"));
    }
    Ok(address)
}

pub fn checksummed(address: &Address) -> String {
    to_checksum(address, None)
}

/// Decode `0x`-prefixed (or bare) hex call data. `"0x"` decodes to empty bytes.
pub fn parse_hex_bytes(input: &str) -> std::result::Result<Bytes, hex::FromHexError> {
    let text = input.trim();
    let hex_part = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(hex_part).map(Bytes::from)
}

/// Unix timestamp `after` from now, as a uint256 router deadline.
pub fn deadline_after(after: Duration) -> U256 {
    let now = Utc::now().timestamp().max(0) as u64;
    U256::from(now + after.as_secs())
}
