use std::sync::LazyLock;
use serde::{Deserialize, Serialize};

use crate::token_tracker::TokenDescriptor;

pub const ETH_TOKEN_IMAGE_URL: &str = "./images/eth_logo.svg";
pub const BNB_TOKEN_IMAGE_URL: &str = "./images/bnb.png";
pub const MATIC_TOKEN_IMAGE_URL: &str = "./images/matic-token.svg";
pub const AVAX_TOKEN_IMAGE_URL: &str = "./images/avax-token.png";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCatalogEntry {
    pub chain_id: String,
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub icon_url: Option<String>,
    pub decimals: u8,
}

impl TokenCatalogEntry {
    pub fn to_descriptor(&self) -> TokenDescriptor {
        TokenDescriptor {
            address: self.address.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            image: self.icon_url.clone(),
            name: Some(self.name.clone()),
        }
    }
}

// Embedded at compile time so the catalog is available offline
static TOKENS_JSON: &str = include_str!("../../assets/tokens.json");

static TOKEN_CATALOG: LazyLock<Vec<TokenCatalogEntry>> = LazyLock::new(|| {
    parse_catalog_from_json(TOKENS_JSON)
});

fn parse_catalog_from_json(json_str: &str) -> Vec<TokenCatalogEntry> {
    match serde_json::from_str::<Vec<TokenCatalogEntry>>(json_str) {
        Ok(tokens) => {
            log::info!("Loaded {} token catalog entries", tokens.len());
            tokens
        }
        Err(e) => {
            log::error!("Failed to parse token catalog JSON: {}", e);
            // Keep whatever entries are individually valid
            serde_json::from_str::<Vec<serde_json::Value>>(json_str)
                .map(|values| {
                    values
                        .into_iter()
                        .filter_map(|value| match serde_json::from_value(value) {
                            Ok(entry) => Some(entry),
                            Err(err) => {
                                log::warn!("Skipping token catalog entry: {}", err);
                                None
                            }
                        })
                        .collect()
                })
                .unwrap_or_default()
        }
    }
}

pub fn get_token_catalog() -> &'static [TokenCatalogEntry] {
    &TOKEN_CATALOG
}

/// Catalog entries known for a chain, as token descriptors
pub fn catalog_for_chain(chain_id: &str) -> Vec<TokenDescriptor> {
    get_token_catalog()
        .iter()
        .filter(|entry| entry.chain_id.eq_ignore_ascii_case(chain_id))
        .map(TokenCatalogEntry::to_descriptor)
        .collect()
}

/// Built-in icon for a network's native currency
pub fn native_currency_image(ticker: &str) -> Option<&'static str> {
    match ticker.to_uppercase().as_str() {
        "ETH" | "GOERLIETH" | "SEPOLIAETH" => Some(ETH_TOKEN_IMAGE_URL),
        "BNB" => Some(BNB_TOKEN_IMAGE_URL),
        "MATIC" => Some(MATIC_TOKEN_IMAGE_URL),
        "AVAX" => Some(AVAX_TOKEN_IMAGE_URL),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = get_token_catalog();
        assert!(!catalog.is_empty());
        assert!(catalog.iter().any(|t| t.symbol == "USDC" && t.chain_id == "0x1"));
    }

    #[test]
    fn test_catalog_for_chain_filters() {
        let mainnet = catalog_for_chain("0x1");
        assert!(!mainnet.is_empty());
        assert!(catalog_for_chain("0xdeadbeef").is_empty());
    }

    #[test]
    fn test_partial_catalog_recovery() {
        let json = r#"[
            {"chainId":"0x1","address":"0xabc","name":"Good","symbol":"GOOD","iconUrl":null,"decimals":18},
            {"chainId":"0x1","address":"0xdef","name":"Bad","symbol":"BAD","decimals":"eighteen"}
        ]"#;
        let parsed = parse_catalog_from_json(json);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].symbol, "GOOD");
    }

    #[test]
    fn test_native_currency_image() {
        assert_eq!(native_currency_image("eth"), Some(ETH_TOKEN_IMAGE_URL));
        assert_eq!(native_currency_image("XYZ"), None);
    }
}
