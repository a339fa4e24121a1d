// src/components/detected_tokens.rs
use dioxus::prelude::*;
use std::collections::BTreeSet;

use crate::i18n::{t, t_with};
use crate::metrics::{MetaMetricsEvent, MetaMetricsEventCategory, MetaMetricsEventName, MetricsContext};
use crate::store::{dispatch, Action, MetamaskState};
use crate::token_tracker::TokenDescriptor;

/// Split detected tokens into those to import and the addresses to ignore
pub fn partition_detected(
    tokens: &[TokenDescriptor],
    selected: &BTreeSet<String>,
) -> (Vec<TokenDescriptor>, Vec<String>) {
    let (import, ignore): (Vec<_>, Vec<_>) = tokens
        .iter()
        .cloned()
        .partition(|token| selected.contains(&token.address));
    (import, ignore.into_iter().map(|token| token.address).collect())
}

#[component]
pub fn DetectedTokensBanner(count: usize, on_action: EventHandler<()>) -> Element {
    let message = t_with("newTokensDetected", &[&count.to_string()]);
    let action_label = t("importTokensCamelCase");

    rsx! {
        div {
            class: "detected-tokens-banner",
            span { class: "detected-tokens-banner__message", "{message}" }
            button {
                class: "detected-tokens-banner__action",
                onclick: move |_| on_action.call(()),
                "{action_label}"
            }
        }
    }
}

/// Review dialog for tokens found by auto-detection
#[component]
pub fn DetectedTokenDialog(tokens: Vec<TokenDescriptor>, on_close: EventHandler<()>) -> Element {
    let store = use_context::<Signal<MetamaskState>>();
    let metrics = use_context::<MetricsContext>();
    let all_addresses: BTreeSet<String> = tokens.iter().map(|t| t.address.clone()).collect();
    let mut selected = use_signal(move || all_addresses);

    let import_tokens = tokens.clone();
    let import_metrics = metrics.clone();
    let handle_import = move |_| {
        let (import, ignore) = partition_detected(&import_tokens, &selected.read());
        for token in &import {
            import_metrics.track(
                MetaMetricsEvent::new(MetaMetricsEventName::TokenImported, MetaMetricsEventCategory::Wallet)
                    .property("token_symbol", token.symbol.clone())
                    .property("source", "detected"),
            );
        }
        if !import.is_empty() {
            dispatch(store, Action::AddTokens(import));
        }
        if !ignore.is_empty() {
            dispatch(store, Action::IgnoreDetectedTokens(ignore));
        }
        on_close.call(());
    };

    let ignore_tokens = tokens.clone();
    let handle_ignore_all = move |_| {
        let addresses: Vec<String> = ignore_tokens.iter().map(|t| t.address.clone()).collect();
        metrics.track(
            MetaMetricsEvent::new(MetaMetricsEventName::TokenHidden, MetaMetricsEventCategory::Wallet)
                .property("tokens", addresses.len() as u64)
                .property("source", "detected"),
        );
        dispatch(store, Action::IgnoreDetectedTokens(addresses));
        on_close.call(());
    };

    let title = t("detectedTokens");
    let import_label = t("import");
    let ignore_label = t("ignoreAll");
    let nothing_selected = selected.read().is_empty();

    rsx! {
        div {
            class: "modal-backdrop",
            onclick: move |_| on_close.call(()),
            div {
                class: "modal-content detected-token-dialog",
                onclick: move |e| e.stop_propagation(),
                div {
                    class: "modal-header",
                    h2 { class: "modal-title", "{title}" }
                }
                div {
                    class: "detected-token-list",
                    for token in tokens {
                        {
                            let address = token.address.clone();
                            let checked = selected.read().contains(&token.address);
                            rsx! {
                                label {
                                    key: "{token.address}",
                                    class: "detected-token-item",
                                    input {
                                        r#type: "checkbox",
                                        checked: checked,
                                        onchange: move |_| {
                                            let mut current = selected.write();
                                            if !current.remove(&address) {
                                                current.insert(address.clone());
                                            }
                                        },
                                    }
                                    span { class: "detected-token-symbol", "{token.symbol}" }
                                    span { class: "detected-token-address", "{token.address}" }
                                }
                            }
                        }
                    }
                }
                div {
                    class: "modal-footer",
                    button {
                        class: "modal-button cancel",
                        onclick: handle_ignore_all,
                        "{ignore_label}"
                    }
                    button {
                        class: "modal-button confirm",
                        disabled: nothing_selected,
                        onclick: handle_import,
                        "{import_label}"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(address: &str) -> TokenDescriptor {
        TokenDescriptor {
            address: address.to_string(),
            symbol: address.to_uppercase(),
            decimals: 18,
            image: None,
            name: None,
        }
    }

    #[test]
    fn test_partition_detected() {
        let tokens = vec![token("0xa"), token("0xb"), token("0xc")];
        let selected = BTreeSet::from(["0xa".to_string(), "0xc".to_string()]);
        let (import, ignore) = partition_detected(&tokens, &selected);

        assert_eq!(import.iter().map(|t| t.address.as_str()).collect::<Vec<_>>(), vec!["0xa", "0xc"]);
        assert_eq!(ignore, vec!["0xb".to_string()]);
    }

    #[test]
    fn test_partition_nothing_selected() {
        let tokens = vec![token("0xa")];
        let (import, ignore) = partition_detected(&tokens, &BTreeSet::new());
        assert!(import.is_empty());
        assert_eq!(ignore, vec!["0xa".to_string()]);
    }
}
