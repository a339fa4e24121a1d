// src/pages/import_token.rs
use dioxus::prelude::*;

use crate::components::{TokenListItem, TokenListPlaceholder};
use crate::i18n::t;
use crate::metrics::{MetaMetricsEvent, MetaMetricsEventCategory, MetaMetricsEventName, MetricsContext};
use crate::store::{dispatch, get_token_list, get_tokens, Action, MetamaskState};
use crate::token_tracker::TokenDescriptor;
use crate::Route;

/// Catalog tokens matching `query` by symbol or name, minus those already added
pub fn search_tokens(catalog: &[TokenDescriptor], query: &str, added: &[TokenDescriptor]) -> Vec<TokenDescriptor> {
    let query = query.trim().to_lowercase();
    catalog
        .iter()
        .filter(|token| {
            !added
                .iter()
                .any(|existing| existing.address.eq_ignore_ascii_case(&token.address))
        })
        .filter(|token| {
            query.is_empty()
                || token.symbol.to_lowercase().contains(&query)
                || token
                    .name
                    .as_ref()
                    .map_or(false, |name| name.to_lowercase().contains(&query))
        })
        .cloned()
        .collect()
}

#[component]
pub fn ImportTokenPage() -> Element {
    let store = use_context::<Signal<MetamaskState>>();
    let metrics = use_context::<MetricsContext>();
    let navigator = use_navigator();
    let mut query = use_signal(String::new);

    let results = use_memo(move || {
        let state = store.read();
        search_tokens(&get_token_list(&state), &query.read(), &get_tokens(&state))
    });

    let handle_import = move |token: TokenDescriptor| {
        log::info!("Importing token {} ({})", token.symbol, token.address);
        metrics.track(
            MetaMetricsEvent::new(MetaMetricsEventName::TokenImported, MetaMetricsEventCategory::Wallet)
                .property("token_symbol", token.symbol.clone())
                .property("token_contract_address", token.address.clone())
                .property("source", "list"),
        );
        dispatch(store, Action::AddTokens(vec![token]));
        navigator.push(Route::HomePage {});
    };

    let title = t("importTokens");
    let placeholder = t("searchTokens");
    let back_label = t("back");

    rsx! {
        div {
            class: "import-token-page",
            div {
                class: "page-header",
                Link { to: Route::HomePage {}, class: "back-link", "{back_label}" }
                h2 { class: "page-title", "{title}" }
            }
            input {
                class: "import-token-search",
                r#type: "text",
                placeholder: "{placeholder}",
                value: "{query}",
                oninput: move |e| query.set(e.value()),
            }
            if results.read().is_empty() {
                TokenListPlaceholder {}
            } else {
                div {
                    class: "token-list",
                    for token in results() {
                        {
                            let selected = token.clone();
                            let handle_import = handle_import.clone();
                            rsx! {
                                TokenListItem {
                                    key: "{token.address}",
                                    title: token.symbol.clone(),
                                    primary: None,
                                    token_symbol: None,
                                    secondary: token.name.clone(),
                                    token_image: token.image.clone(),
                                    onclick: move |_| handle_import(selected.clone()),
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(address: &str, symbol: &str, name: &str) -> TokenDescriptor {
        TokenDescriptor {
            address: address.to_string(),
            symbol: symbol.to_string(),
            decimals: 18,
            image: None,
            name: Some(name.to_string()),
        }
    }

    fn catalog() -> Vec<TokenDescriptor> {
        vec![
            token("0xdai", "DAI", "Dai Stablecoin"),
            token("0xusdc", "USDC", "USD Coin"),
            token("0xlink", "LINK", "Chainlink"),
        ]
    }

    #[test]
    fn test_search_by_symbol_or_name() {
        let found = search_tokens(&catalog(), "usd", &[]);
        assert_eq!(found.iter().map(|t| t.symbol.as_str()).collect::<Vec<_>>(), vec!["USDC"]);

        let found = search_tokens(&catalog(), "STABLE", &[]);
        assert_eq!(found[0].symbol, "DAI");
    }

    #[test]
    fn test_search_excludes_added_tokens() {
        let added = vec![token("0xDAI", "DAI", "Dai Stablecoin")];
        let found = search_tokens(&catalog(), "", &added);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|t| t.symbol != "DAI"));
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(search_tokens(&catalog(), "doge", &[]).is_empty());
    }
}
