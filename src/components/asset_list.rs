// src/components/asset_list.rs
use dioxus::prelude::*;
use serde_json::Value;
use std::collections::HashMap;

use crate::components::balance_overview::BalanceOverview;
use crate::components::detected_tokens::{DetectedTokenDialog, DetectedTokensBanner};
use crate::components::import_token_link::ImportTokenLink;
use crate::components::token_list::{TokenList, TokenListItem};
use crate::config::UiConfig;
use crate::conversion::{get_token_fiat_amount, get_value_from_wei_hex, is_equal_case_insensitive, sum_decimals};
use crate::currency::format_currency;
use crate::currency_display::{
    use_currency_display, use_user_preferenced_currency, CurrencyKind, PreferencedCurrencyOptions,
};
use crate::metrics::{MetaMetricsEvent, MetaMetricsEventCategory, MetaMetricsEventName, MetricsContext};
use crate::store::*;
use crate::token_tracker::{use_token_tracker, TokenDescriptor, TrackedToken};

/// Contract exchange rate for `address`, matched case-insensitively
pub fn lookup_exchange_rate(rates: &HashMap<String, f64>, address: &str) -> f64 {
    rates
        .iter()
        .find(|(key, _)| is_equal_case_insensitive(key, address))
        .map(|(_, rate)| *rate)
        .unwrap_or(0.0)
}

/// Native fiat value of a hex wei balance, rounded to cents
pub fn native_fiat_amount(balance: Option<&str>, native_currency: &str, current_currency: &str, conversion_rate: f64) -> String {
    get_value_from_wei_hex(balance, native_currency, current_currency, conversion_rate, 2)
}

/// Unformatted sum of the native and token fiat values.
///
/// Tokens without a matching exchange rate contribute nothing.
pub fn total_fiat_value(
    tokens: &[TrackedToken],
    exchange_rates: &HashMap<String, f64>,
    conversion_rate: f64,
    current_currency: &str,
    native_fiat: &str,
) -> f64 {
    let mut amounts = vec![native_fiat.to_string()];
    amounts.extend(tokens.iter().filter_map(|token| {
        get_token_fiat_amount(
            lookup_exchange_rate(exchange_rates, &token.address),
            conversion_rate,
            current_currency,
            Some(&token.string),
            &token.symbol,
            false,
            false,
        )
    }));
    sum_decimals(&amounts)
}

/// Total account value formatted in the current currency
pub fn compute_total_fiat(state: &MetamaskState, tokens: &[TrackedToken]) -> String {
    let conversion_rate = get_conversion_rate(state);
    let current_currency = get_current_currency(state);
    let balance = get_selected_account_cached_balance(state);
    let native_fiat = native_fiat_amount(
        balance.as_deref(),
        &get_native_currency(state),
        &current_currency,
        conversion_rate,
    );
    let total = total_fiat_value(
        tokens,
        &get_token_exchange_rates(state),
        conversion_rate,
        &current_currency,
        &native_fiat,
    );
    format_currency(&total.to_string(), &current_currency)
}

pub fn should_show_detected_tokens_banner(detected: &[TokenDescriptor], detection_inactive: bool) -> bool {
    !detected.is_empty() && !detection_inactive
}

/// Native currency row selected
pub fn select_native_asset(native_currency: &str, on_click_asset: impl FnOnce(String)) {
    on_click_asset(native_currency.to_string());
}

/// Token row selected: navigate and record the screen view
pub fn select_token_asset(
    address: String,
    token_symbol: Option<String>,
    metrics: &MetricsContext,
    on_click_asset: impl FnOnce(String),
) {
    on_click_asset(address);
    metrics.track(
        MetaMetricsEvent::new(
            MetaMetricsEventName::TokenScreenOpened,
            MetaMetricsEventCategory::Navigation,
        )
        .property("token_symbol", token_symbol.map(Value::String).unwrap_or(Value::Null))
        .property("location", "Home"),
    );
}

#[component]
pub fn AssetList(on_click_asset: EventHandler<String>) -> Element {
    let store = use_context::<Signal<MetamaskState>>();
    let config = use_context::<UiConfig>();
    let metrics = use_context::<MetricsContext>();
    let mut show_detected_tokens = use_signal(|| false);

    let balance = use_memo(move || get_selected_account_cached_balance(&store.read()));
    let native_currency = use_memo(move || get_native_currency(&store.read()));
    let show_fiat = use_memo(move || get_should_show_fiat(&store.read()));
    let primary_token_image = use_memo(move || get_native_currency_image(&store.read()));
    let detected_tokens = use_memo(move || get_detected_tokens_in_current_network(&store.read()));
    let detection_inactive = use_memo(move || {
        get_is_token_detection_inactive_on_non_mainnet_supported_network(&store.read())
    });
    let hide_zero_balance_tokens = use_memo(move || get_should_hide_zero_balance_tokens(&store.read()));
    let tokens = use_memo(move || get_tokens(&store.read()));
    let token_balances = use_memo(move || get_token_balances(&store.read()));

    let native_decimals = PreferencedCurrencyOptions {
        native_number_of_decimals: Some(4),
        ..Default::default()
    };
    let primary_currency = use_user_preferenced_currency(store, CurrencyKind::Primary, native_decimals);
    let secondary_currency = use_user_preferenced_currency(store, CurrencyKind::Secondary, native_decimals);
    let primary_display = use_currency_display(store, balance, primary_currency);
    let secondary_display = use_currency_display(store, balance, secondary_currency);

    let tracker = use_token_tracker(tokens, token_balances, balance, true, hide_zero_balance_tokens);

    let total_fiat = use_memo(move || compute_total_fiat(&store.read(), &tracker.read().tokens_with_balances));

    let balance_is_loading = balance.read().is_none();
    let (_, primary_properties) = primary_display();
    let (secondary_text, secondary_properties) = secondary_display();
    let primary_value = primary_properties.value.clone().or(secondary_properties.value.clone());
    let primary_suffix = primary_properties.suffix.clone();
    let token_click_symbol = primary_suffix.clone();
    let has_detected_tokens = !detected_tokens.read().is_empty();
    let show_banner = should_show_detected_tokens_banner(&detected_tokens.read(), detection_inactive());

    rsx! {
        if config.multichain {
            BalanceOverview {
                balance: total_fiat(),
                loading: tracker.read().loading,
            }
        }
        if show_banner {
            DetectedTokensBanner {
                count: detected_tokens.read().len(),
                on_action: move |_| show_detected_tokens.set(true),
            }
        }
        TokenListItem {
            title: native_currency(),
            primary: primary_value,
            token_symbol: primary_suffix,
            secondary: if show_fiat() { Some(secondary_text) } else { None },
            token_image: if balance_is_loading { None } else { primary_token_image() },
            onclick: move |_| select_native_asset(&native_currency(), |id| on_click_asset.call(id)),
        }
        TokenList {
            tokens: tracker.read().tokens_with_balances.clone(),
            on_token_click: move |address: String| {
                select_token_asset(
                    address,
                    token_click_symbol.clone(),
                    &metrics,
                    |id| on_click_asset.call(id),
                );
            },
        }
        div {
            class: if has_detected_tokens { "import-token-wrapper mt-0" } else { "import-token-wrapper mt-4" },
            ImportTokenLink {}
        }
        if show_detected_tokens() {
            DetectedTokenDialog {
                tokens: detected_tokens(),
                on_close: move |_| show_detected_tokens.set(false),
            }
        }
    }
}
