// src/token_tracker.rs
use dioxus::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::conversion::{hex_to_wei, stringify_balance};

/// A token added to (or detected for) an account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A token enriched with its current balance
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedToken {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
    pub image: Option<String>,
    /// Display balance in token units, e.g. "1.234"
    pub string: String,
    /// Raw integer balance (decimal digits), None until known
    pub balance: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenTrackerResult {
    pub loading: bool,
    pub tokens_with_balances: Vec<TrackedToken>,
    /// Native balance (hex wei), only filled when requested
    pub native_balance: Option<String>,
}

fn lookup_balance<'a>(balances: &'a HashMap<String, String>, address: &str) -> Option<&'a String> {
    balances.get(address).or_else(|| {
        balances
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(address))
            .map(|(_, value)| value)
    })
}

/// Enrich `tokens` with balances from `balances` (address -> hex raw amount).
///
/// Tokens without a known balance are kept with a zero display string and
/// keep the result in the loading state. `hide_zero_balance_tokens` drops
/// tokens whose known balance is zero.
pub fn track_tokens(
    tokens: &[TokenDescriptor],
    balances: &HashMap<String, String>,
    include_native_balance: bool,
    hide_zero_balance_tokens: bool,
    native_balance: Option<&str>,
) -> TokenTrackerResult {
    let mut loading = false;
    let mut tokens_with_balances = Vec::with_capacity(tokens.len());

    for token in tokens {
        let raw = match lookup_balance(balances, &token.address) {
            Some(hex) => match hex_to_wei(hex) {
                Some(value) => Some(value.to_string()),
                None => {
                    log::warn!("Ignoring malformed balance for {}: {}", token.address, hex);
                    None
                }
            },
            None => None,
        };

        if raw.is_none() {
            loading = true;
        }

        let string = raw
            .as_deref()
            .map(|value| stringify_balance(value, token.decimals, &token.symbol, 3))
            .unwrap_or_else(|| "0".to_string());

        if hide_zero_balance_tokens && raw.as_deref() == Some("0") {
            continue;
        }

        tokens_with_balances.push(TrackedToken {
            address: token.address.clone(),
            symbol: token.symbol.clone(),
            decimals: token.decimals,
            image: token.image.clone(),
            string,
            balance: raw,
        });
    }

    TokenTrackerResult {
        loading,
        tokens_with_balances,
        native_balance: if include_native_balance {
            native_balance.map(str::to_string)
        } else {
            None
        },
    }
}

/// Track balances for the token list held in `tokens`.
///
/// `tokens` is a memo over the store so structurally equal lists delivered
/// again do not trigger a recompute.
pub fn use_token_tracker(
    tokens: Memo<Vec<TokenDescriptor>>,
    balances: Memo<HashMap<String, String>>,
    native_balance: Memo<Option<String>>,
    include_native_balance: bool,
    hide_zero_balance_tokens: Memo<bool>,
) -> Memo<TokenTrackerResult> {
    use_memo(move || {
        track_tokens(
            &tokens.read(),
            &balances.read(),
            include_native_balance,
            hide_zero_balance_tokens(),
            native_balance.read().as_deref(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(address: &str, symbol: &str, decimals: u8) -> TokenDescriptor {
        TokenDescriptor {
            address: address.to_string(),
            symbol: symbol.to_string(),
            decimals,
            image: None,
            name: None,
        }
    }

    #[test]
    fn test_balances_are_stringified() {
        let tokens = vec![token("0xAAA", "USDC", 6)];
        let balances = HashMap::from([("0xaaa".to_string(), "0x16e360".to_string())]); // 1_500_000
        let result = track_tokens(&tokens, &balances, false, false, None);

        assert!(!result.loading);
        assert_eq!(result.tokens_with_balances[0].string, "1.5");
        assert_eq!(result.tokens_with_balances[0].balance.as_deref(), Some("1500000"));
    }

    #[test]
    fn test_missing_balance_keeps_loading() {
        let tokens = vec![token("0xAAA", "USDC", 6), token("0xBBB", "DAI", 18)];
        let balances = HashMap::from([("0xAAA".to_string(), "0x0".to_string())]);
        let result = track_tokens(&tokens, &balances, false, false, None);

        assert!(result.loading);
        assert_eq!(result.tokens_with_balances.len(), 2);
        assert_eq!(result.tokens_with_balances[1].string, "0");
        assert_eq!(result.tokens_with_balances[1].balance, None);
    }

    #[test]
    fn test_hide_zero_balances() {
        let tokens = vec![token("0xAAA", "USDC", 6), token("0xBBB", "DAI", 18)];
        let balances = HashMap::from([
            ("0xAAA".to_string(), "0x0".to_string()),
            ("0xBBB".to_string(), "0xde0b6b3a7640000".to_string()),
        ]);
        let result = track_tokens(&tokens, &balances, false, true, None);

        assert_eq!(result.tokens_with_balances.len(), 1);
        assert_eq!(result.tokens_with_balances[0].symbol, "DAI");
        assert_eq!(result.tokens_with_balances[0].string, "1");
    }

    #[test]
    fn test_balance_above_u128_is_tracked() {
        let tokens = vec![token("0xAAA", "WHALE", 18)];
        // 2^128 raw units
        let balances = HashMap::from([("0xaaa".to_string(), "0x100000000000000000000000000000000".to_string())]);
        let result = track_tokens(&tokens, &balances, false, false, None);

        assert!(!result.loading);
        assert_eq!(result.tokens_with_balances[0].string, "340282366920938463463.374");
        assert_eq!(
            result.tokens_with_balances[0].balance.as_deref(),
            Some("340282366920938463463374607431768211456")
        );
    }

    #[test]
    fn test_native_balance_only_when_requested() {
        let result = track_tokens(&[], &HashMap::new(), true, false, Some("0x1"));
        assert_eq!(result.native_balance.as_deref(), Some("0x1"));
        assert!(!result.loading);
        assert!(result.tokens_with_balances.is_empty());

        let result = track_tokens(&[], &HashMap::new(), false, false, Some("0x1"));
        assert_eq!(result.native_balance, None);
    }

    #[test]
    fn test_structurally_equal_lists_compare_equal() {
        let first = vec![token("0xAAA", "USDC", 6)];
        let redelivered: Vec<TokenDescriptor> =
            serde_json::from_str(&serde_json::to_string(&first).unwrap()).unwrap();
        assert_eq!(first, redelivered);
    }
}
