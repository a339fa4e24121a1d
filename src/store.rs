// src/store.rs
//! Snapshot of the background state plus the selectors the views read.
//!
//! The views never mutate the snapshot directly: every write goes through
//! an [`Action`] applied by [`reduce`].
use dioxus::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::tokens::{catalog_for_chain, native_currency_image};
use crate::institutional::types::{ConnectRequest, Custodian, CustodianAccount, MmiConfiguration};
use crate::token_tracker::TokenDescriptor;

pub const MAINNET_CHAIN_ID: &str = "0x1";

/// Chains served by the dynamic token list used for auto-detection
pub const DYNAMIC_TOKEN_LIST_CHAINS: &[&str] = &[
    "0x1", "0x38", "0x89", "0xa86a", "0xa4b1", "0xa", "0x64", "0x19", "0xe708", "0x144",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub chain_id: String,
    #[serde(default)]
    pub caip_chain_id: Option<String>,
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default)]
    pub ticker: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            chain_id: MAINNET_CHAIN_ID.to_string(),
            caip_chain_id: Some("eip155:1".to_string()),
            provider_type: "mainnet".to_string(),
            ticker: Some("ETH".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub use_native_currency_as_primary_currency: bool,
    pub show_fiat_in_testnets: bool,
    pub hide_zero_balance_tokens: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            use_native_currency_as_primary_currency: true,
            show_fiat_in_testnets: false,
            hide_zero_balance_tokens: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub is_loading: bool,
    pub loading_message: Option<String>,
}

/// Custody data written back by background responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstitutionalState {
    pub connect_request: Option<ConnectRequest>,
    pub jwt_list: Vec<String>,
    pub custodian_accounts: Vec<CustodianAccount>,
    pub connected_addresses: Vec<String>,
    pub custody_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetamaskState {
    pub provider_config: ProviderConfig,
    pub selected_address: String,
    /// chain id -> address -> hex wei balance
    pub cached_balances: HashMap<String, HashMap<String, String>>,
    /// Rate from the native currency to `current_currency`
    pub conversion_rate: Option<f64>,
    pub current_currency: String,
    pub use_currency_rate_check: bool,
    pub preferences: Preferences,
    pub use_token_detection: bool,
    pub native_currency_image: Option<String>,
    pub tokens: Vec<TokenDescriptor>,
    /// address -> hex raw token balance
    pub token_balances: HashMap<String, String>,
    /// chain id -> address -> detected tokens
    pub all_detected_tokens: HashMap<String, HashMap<String, Vec<TokenDescriptor>>>,
    pub ignored_tokens: Vec<String>,
    /// token address -> price in the native currency
    pub contract_exchange_rates: HashMap<String, f64>,
    pub token_list: Vec<TokenDescriptor>,
    pub mmi_configuration: MmiConfiguration,
    pub app_state: AppState,
    pub institutional: InstitutionalState,
}

impl Default for MetamaskState {
    fn default() -> Self {
        Self {
            provider_config: ProviderConfig::default(),
            selected_address: String::new(),
            cached_balances: HashMap::new(),
            conversion_rate: None,
            current_currency: "usd".to_string(),
            use_currency_rate_check: true,
            preferences: Preferences::default(),
            use_token_detection: true,
            native_currency_image: None,
            tokens: Vec::new(),
            token_balances: HashMap::new(),
            all_detected_tokens: HashMap::new(),
            ignored_tokens: Vec::new(),
            contract_exchange_rates: HashMap::new(),
            token_list: Vec::new(),
            mmi_configuration: MmiConfiguration::default(),
            app_state: AppState::default(),
            institutional: InstitutionalState::default(),
        }
    }
}

// Selectors

pub fn get_current_chain_id(state: &MetamaskState) -> &str {
    &state.provider_config.chain_id
}

pub fn get_is_mainnet(state: &MetamaskState) -> bool {
    get_current_chain_id(state).eq_ignore_ascii_case(MAINNET_CHAIN_ID)
}

pub fn get_selected_account_cached_balance(state: &MetamaskState) -> Option<String> {
    state
        .cached_balances
        .get(get_current_chain_id(state))
        .and_then(|balances| {
            balances.get(&state.selected_address).or_else(|| {
                balances
                    .iter()
                    .find(|(address, _)| address.eq_ignore_ascii_case(&state.selected_address))
                    .map(|(_, balance)| balance)
            })
        })
        .cloned()
}

pub fn get_native_currency(state: &MetamaskState) -> String {
    state
        .provider_config
        .ticker
        .clone()
        .filter(|ticker| !ticker.is_empty())
        .unwrap_or_else(|| "ETH".to_string())
}

pub fn get_conversion_rate(state: &MetamaskState) -> f64 {
    state.conversion_rate.unwrap_or(0.0)
}

pub fn get_current_currency(state: &MetamaskState) -> String {
    state.current_currency.clone()
}

pub fn get_should_show_fiat(state: &MetamaskState) -> bool {
    (get_is_mainnet(state) || state.preferences.show_fiat_in_testnets)
        && state.use_currency_rate_check
        && get_conversion_rate(state) > 0.0
}

pub fn get_native_currency_image(state: &MetamaskState) -> Option<String> {
    state
        .native_currency_image
        .clone()
        .or_else(|| native_currency_image(&get_native_currency(state)).map(str::to_string))
}

pub fn get_detected_tokens_in_current_network(state: &MetamaskState) -> Vec<TokenDescriptor> {
    state
        .all_detected_tokens
        .get(get_current_chain_id(state))
        .and_then(|by_address| by_address.get(&state.selected_address))
        .cloned()
        .unwrap_or_default()
}

pub fn get_is_dynamic_token_list_available(state: &MetamaskState) -> bool {
    let chain_id = get_current_chain_id(state);
    DYNAMIC_TOKEN_LIST_CHAINS
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(chain_id))
}

pub fn get_is_token_detection_inactive_on_non_mainnet_supported_network(state: &MetamaskState) -> bool {
    get_is_dynamic_token_list_available(state) && !state.use_token_detection && !get_is_mainnet(state)
}

pub fn get_should_hide_zero_balance_tokens(state: &MetamaskState) -> bool {
    state.preferences.hide_zero_balance_tokens
}

pub fn get_token_exchange_rates(state: &MetamaskState) -> HashMap<String, f64> {
    state.contract_exchange_rates.clone()
}

pub fn get_tokens(state: &MetamaskState) -> Vec<TokenDescriptor> {
    state.tokens.clone()
}

pub fn get_token_balances(state: &MetamaskState) -> HashMap<String, String> {
    state.token_balances.clone()
}

/// Importable tokens for the current chain, falling back to the built-in catalog
pub fn get_token_list(state: &MetamaskState) -> Vec<TokenDescriptor> {
    if state.token_list.is_empty() {
        catalog_for_chain(get_current_chain_id(state))
    } else {
        state.token_list.clone()
    }
}

pub fn get_mmi_configuration(state: &MetamaskState) -> &MmiConfiguration {
    &state.mmi_configuration
}

pub fn get_custodians(state: &MetamaskState) -> Vec<Custodian> {
    get_mmi_configuration(state).custodians.clone()
}

pub fn get_is_loading(state: &MetamaskState) -> bool {
    state.app_state.is_loading
}

/// State transitions requested by the views or by background responses
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ShowLoading(Option<String>),
    HideLoading,
    AddTokens(Vec<TokenDescriptor>),
    IgnoreDetectedTokens(Vec<String>),
    SetCurrentCurrency(String),
    SetConversionRate(Option<f64>),
    SetConnectRequest(Option<ConnectRequest>),
    SetCustodianJwtList(Vec<String>),
    SetCustodianAccounts(Vec<CustodianAccount>),
    SetConnectedAccounts(Vec<String>),
    SetCustodyError(Option<String>),
}

fn remove_detected(state: &mut MetamaskState, addresses: &[String]) {
    let chain_id = state.provider_config.chain_id.clone();
    if let Some(detected) = state
        .all_detected_tokens
        .get_mut(&chain_id)
        .and_then(|by_address| by_address.get_mut(&state.selected_address))
    {
        detected.retain(|token| {
            !addresses
                .iter()
                .any(|address| address.eq_ignore_ascii_case(&token.address))
        });
    }
}

/// Apply an action to the state
pub fn reduce(state: &mut MetamaskState, action: Action) {
    log::debug!("Applying action: {:?}", action);
    match action {
        Action::ShowLoading(message) => {
            state.app_state.is_loading = true;
            state.app_state.loading_message = message;
        }
        Action::HideLoading => {
            state.app_state.is_loading = false;
            state.app_state.loading_message = None;
        }
        Action::AddTokens(tokens) => {
            let addresses: Vec<String> = tokens.iter().map(|t| t.address.clone()).collect();
            for token in tokens {
                let exists = state
                    .tokens
                    .iter()
                    .any(|existing| existing.address.eq_ignore_ascii_case(&token.address));
                if !exists {
                    state.tokens.push(token);
                }
            }
            remove_detected(state, &addresses);
        }
        Action::IgnoreDetectedTokens(addresses) => {
            for address in &addresses {
                if !state.ignored_tokens.iter().any(|a| a.eq_ignore_ascii_case(address)) {
                    state.ignored_tokens.push(address.clone());
                }
            }
            remove_detected(state, &addresses);
        }
        Action::SetCurrentCurrency(currency) => {
            state.current_currency = currency.to_lowercase();
        }
        Action::SetConversionRate(rate) => {
            state.conversion_rate = rate;
        }
        Action::SetConnectRequest(request) => {
            state.institutional.connect_request = request;
        }
        Action::SetCustodianJwtList(list) => {
            state.institutional.jwt_list = list;
        }
        Action::SetCustodianAccounts(accounts) => {
            state.institutional.custodian_accounts = accounts;
        }
        Action::SetConnectedAccounts(addresses) => {
            state.institutional.connected_addresses = addresses;
        }
        Action::SetCustodyError(error) => {
            state.institutional.custody_error = error;
        }
    }
}

/// Apply an action to the shared store signal
pub fn dispatch(mut store: Signal<MetamaskState>, action: Action) {
    reduce(&mut store.write(), action);
}
