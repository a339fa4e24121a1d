// src/conversion.rs
//! Amount conversion helpers shared by the asset views.
//!
//! Balances arrive from the background as hex-encoded integers in the
//! smallest unit (wei for the native currency). Everything here is a pure
//! function of its inputs so display values can be recomputed on every
//! render.
use alloy_primitives::{utils::format_units, U256};

use crate::currency::format_currency;

/// Parse a `0x`-prefixed (or bare) hex integer of up to 256 bits
pub fn hex_to_wei(value: &str) -> Option<U256> {
    let digits = value.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);
    if digits.is_empty() {
        return Some(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).ok()
}

pub fn wei_to_native(wei: U256) -> f64 {
    format_units(wei, "ether")
        .ok()
        .and_then(|ether| ether.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Round to `decimals` places and render without trailing zeros
pub fn round_to_string(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.precision$}", value, precision = decimals);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

pub fn is_equal_case_insensitive(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Convert a hex wei balance into `to_currency`.
///
/// When the target differs from `from_currency` the amount is multiplied by
/// `conversion_rate`. A missing or malformed value counts as zero.
pub fn get_value_from_wei_hex(
    value: Option<&str>,
    from_currency: &str,
    to_currency: &str,
    conversion_rate: f64,
    number_of_decimals: usize,
) -> String {
    let wei = value.and_then(hex_to_wei).unwrap_or(U256::ZERO);
    let mut amount = wei_to_native(wei);
    if !is_equal_case_insensitive(from_currency, to_currency) {
        amount *= conversion_rate;
    }
    round_to_string(amount, number_of_decimals)
}

/// Fiat value of a token amount.
///
/// Returns `None` when the value cannot be known: no conversion rate, no
/// contract exchange rate, or no amount.
pub fn get_token_fiat_amount(
    contract_exchange_rate: f64,
    conversion_rate: f64,
    current_currency: &str,
    token_amount: Option<&str>,
    _token_symbol: &str,
    formatted: bool,
    hide_currency_symbol: bool,
) -> Option<String> {
    if conversion_rate <= 0.0 || contract_exchange_rate <= 0.0 {
        return None;
    }
    let amount = token_amount?.trim().parse::<f64>().ok()?;

    let token_to_fiat_rate = contract_exchange_rate * conversion_rate;
    let fiat = round_to_string(amount * token_to_fiat_rate, 2);

    let result = if hide_currency_symbol {
        format_currency(&fiat, current_currency)
    } else if formatted {
        format!(
            "{} {}",
            format_currency(&fiat, current_currency),
            current_currency.to_uppercase()
        )
    } else {
        fiat
    };
    Some(result)
}

/// Sum decimal strings; entries that do not parse contribute zero
pub fn sum_decimals<S: AsRef<str>>(values: &[S]) -> f64 {
    values
        .iter()
        .filter_map(|v| v.as_ref().trim().parse::<f64>().ok())
        .sum()
}

/// Render an integer token balance (decimal digits) with its decimals.
///
/// Keeps `number_of_decimals` fractional digits, except that trailing zeros
/// in that window fall back to all significant fractional digits. Native
/// `ETH` keeps the full 18 digits.
pub fn stringify_balance(balance: &str, decimals: u8, symbol: &str, number_of_decimals: usize) -> String {
    let digits = balance.trim().trim_start_matches('0');
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return "0".to_string();
    }
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits.to_string();
    }

    // Left pad so there is at least one whole digit
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits.to_string()
    };
    let decimal_index = padded.len() - decimals;
    let whole = &padded[..decimal_index];
    let all_fraction = &padded[decimal_index..];

    if symbol == "ETH" {
        let end = all_fraction.len().min(18);
        return format!("{}.{}", whole, &all_fraction[..end]);
    }

    let end = all_fraction.len().min(number_of_decimals);
    let fractional = &all_fraction[..end];
    if fractional.ends_with('0') {
        let significant = all_fraction.trim_end_matches('0');
        if significant.is_empty() {
            return whole.to_string();
        }
        return format!("{}.{}", whole, significant);
    }
    format!("{}.{}", whole, fractional)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_wei() {
        assert_eq!(hex_to_wei("0xde0b6b3a7640000"), Some(U256::from(1_000_000_000_000_000_000u64)));
        assert_eq!(hex_to_wei("0x"), Some(U256::ZERO));
        assert_eq!(hex_to_wei("ff"), Some(U256::from(255u64)));
        assert_eq!(hex_to_wei("0xnothex"), None);
    }

    #[test]
    fn test_hex_to_wei_beyond_u128() {
        let wei = hex_to_wei("0x100000000000000000000000000000000");
        assert_eq!(wei, Some(U256::from(u128::MAX) + U256::from(1u64)));
        assert_eq!(
            wei.map(|v| v.to_string()).as_deref(),
            Some("340282366920938463463374607431768211456")
        );
        assert_eq!(
            hex_to_wei("0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
            Some(U256::MAX)
        );
        // More than 256 bits does not fit
        assert_eq!(hex_to_wei(&format!("0x1{}", "0".repeat(64))), None);
    }

    #[test]
    fn test_round_to_string() {
        assert_eq!(round_to_string(1.23456, 4), "1.2346");
        assert_eq!(round_to_string(1.5, 4), "1.5");
        assert_eq!(round_to_string(2.0, 2), "2");
        assert_eq!(round_to_string(-0.0001, 2), "0");
    }

    #[test]
    fn test_value_from_wei_hex_native_and_fiat() {
        // 1 ETH
        let one_eth = Some("0xde0b6b3a7640000");
        assert_eq!(get_value_from_wei_hex(one_eth, "ETH", "ETH", 3000.0, 4), "1");
        assert_eq!(get_value_from_wei_hex(one_eth, "ETH", "usd", 3000.5, 2), "3000.5");
        assert_eq!(get_value_from_wei_hex(None, "ETH", "usd", 3000.0, 2), "0");
    }

    #[test]
    fn test_token_fiat_amount_requires_rates() {
        assert_eq!(get_token_fiat_amount(0.0, 3000.0, "usd", Some("10"), "DAI", false, false), None);
        assert_eq!(get_token_fiat_amount(0.001, 0.0, "usd", Some("10"), "DAI", false, false), None);
        assert_eq!(get_token_fiat_amount(0.001, 3000.0, "usd", None, "DAI", false, false), None);
    }

    #[test]
    fn test_token_fiat_amount_shapes() {
        // 10 tokens * 0.0005 ETH * 2000 usd/ETH = 10 usd
        let raw = get_token_fiat_amount(0.0005, 2000.0, "usd", Some("10"), "DAI", false, false);
        assert_eq!(raw.as_deref(), Some("10"));
        let formatted = get_token_fiat_amount(0.0005, 2000.0, "usd", Some("10"), "DAI", true, false);
        assert_eq!(formatted.as_deref(), Some("$10.00 USD"));
        let symbol_only = get_token_fiat_amount(0.0005, 2000.0, "usd", Some("10"), "DAI", true, true);
        assert_eq!(symbol_only.as_deref(), Some("$10.00"));
    }

    #[test]
    fn test_sum_decimals_skips_garbage() {
        assert_eq!(sum_decimals(&["1.5", "2.25", "oops", ""]), 3.75);
        assert_eq!(sum_decimals::<&str>(&[]), 0.0);
    }

    #[test]
    fn test_stringify_balance() {
        assert_eq!(stringify_balance("0", 18, "DAI", 3), "0");
        assert_eq!(stringify_balance("1500000", 6, "USDC", 3), "1.5");
        assert_eq!(stringify_balance("1234567", 6, "USDC", 3), "1.234");
        assert_eq!(stringify_balance("1000000", 6, "USDC", 3), "1");
        assert_eq!(stringify_balance("5", 3, "TKN", 3), "0.005");
        assert_eq!(stringify_balance("42", 0, "NFT", 3), "42");
        assert_eq!(stringify_balance("1000000000000000001", 18, "ETH", 3), "1.000000000000000001");
    }
}
