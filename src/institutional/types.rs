// src/institutional/types.rs
//! Custody configuration and background response types

use serde::{Deserialize, Serialize};

/// A custodian integration from the persisted MMI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Custodian {
    #[serde(rename = "type")]
    pub custodian_type: String,
    pub name: String,
    pub api_url: String,
    pub icon_url: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub production: bool,
    #[serde(default)]
    pub refresh_token_url: Option<String>,
    #[serde(default)]
    pub is_note_to_trader_supported: bool,
    #[serde(default)]
    pub version: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub enabled: bool,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MmiConfiguration {
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub custodians: Vec<Custodian>,
}

/// A pending connection request opened from a custodian's website
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub custodian: String,
    pub token: String,
    pub api_url: String,
    #[serde(default)]
    pub custodian_type: Option<String>,
    #[serde(default)]
    pub custodian_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodianDetails {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub wallet_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLabel {
    pub key: String,
    pub value: String,
}

/// An account held at a custodian
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodianAccount {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub custodian_details: Option<CustodianDetails>,
    #[serde(default)]
    pub labels: Vec<AccountLabel>,
    #[serde(default)]
    pub chain_id: Option<String>,
}

/// Account selected for connection, as sent to the background
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedAccount {
    pub name: String,
    pub address: String,
    pub custodian_details: Option<CustodianDetails>,
    pub labels: Vec<AccountLabel>,
    pub token: String,
    pub api_url: String,
    pub chain_id: Option<String>,
    pub custody_type: String,
}

impl ConnectedAccount {
    pub fn from_account(account: &CustodianAccount, token: &str, api_url: &str, custody_type: &str) -> Self {
        Self {
            name: account.name.clone(),
            address: account.address.clone(),
            custodian_details: account.custodian_details.clone(),
            labels: account.labels.clone(),
            token: token.to_string(),
            api_url: api_url.to_string(),
            chain_id: account.chain_id.clone(),
            custody_type: custody_type.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custodian_config_deserializes() {
        let json = r#"{
            "portfolio": { "enabled": true, "url": "https://portfolio.io" },
            "custodians": [{
                "type": "Saturn",
                "name": "saturn",
                "apiUrl": "https://saturn-custody.dev.metamask-institutional.io",
                "iconUrl": "https://saturn-custody-ui.dev.metamask-institutional.io/saturn.svg",
                "displayName": "Saturn Custody",
                "production": true,
                "refreshTokenUrl": null,
                "isNoteToTraderSupported": false,
                "version": 1
            }]
        }"#;
        let config: MmiConfiguration = serde_json::from_str(json).unwrap();
        assert!(config.portfolio.enabled);
        assert_eq!(config.custodians.len(), 1);
        assert_eq!(config.custodians[0].custodian_type, "Saturn");
        assert_eq!(config.custodians[0].display_name, "Saturn Custody");
        assert_eq!(config.custodians[0].version, 1);
    }

    #[test]
    fn test_connect_request_without_type() {
        let json = r#"{"custodian":"saturn","token":"token","apiUrl":"url","custodianName":"saturn"}"#;
        let request: ConnectRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.custodian_type, None);
        assert_eq!(request.custodian_name.as_deref(), Some("saturn"));
    }
}
