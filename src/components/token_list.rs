// src/components/token_list.rs
use dioxus::prelude::*;

use crate::components::asset_list::lookup_exchange_rate;
use crate::conversion::get_token_fiat_amount;
use crate::i18n::t;
use crate::store::{
    get_conversion_rate, get_current_currency, get_should_show_fiat, get_token_exchange_rates, MetamaskState,
};
use crate::token_tracker::TrackedToken;

/// A single asset row
#[component]
pub fn TokenListItem(
    title: String,
    #[props(!optional)] primary: Option<String>,
    #[props(!optional)] token_symbol: Option<String>,
    #[props(!optional)] secondary: Option<String>,
    #[props(!optional)] token_image: Option<String>,
    onclick: EventHandler<()>,
) -> Element {
    let initial = title.chars().next().map(|c| c.to_uppercase().to_string()).unwrap_or_default();
    let primary_text = match (&primary, &token_symbol) {
        (Some(value), Some(symbol)) => format!("{} {}", value, symbol),
        (Some(value), None) => value.clone(),
        (None, _) => String::new(),
    };

    rsx! {
        div {
            class: "token-item",
            "data-testid": "multichain-token-list-item",
            onclick: move |_| onclick.call(()),
            div {
                class: "token-info",
                div {
                    class: "token-icon",
                    if let Some(image) = token_image {
                        img {
                            src: "{image}",
                            alt: "{title}",
                            width: "32",
                            height: "32",
                        }
                    } else {
                        span { class: "token-icon-fallback", "{initial}" }
                    }
                }
                div {
                    class: "token-details",
                    div { class: "token-name", "{title}" }
                    if let Some(secondary) = secondary {
                        div { class: "token-secondary", "{secondary}" }
                    }
                }
            }
            div {
                class: "token-balance",
                "{primary_text}"
            }
        }
    }
}

/// Fiat value shown under a token, when rates are known
pub fn token_secondary_value(state: &MetamaskState, token: &TrackedToken) -> Option<String> {
    if !get_should_show_fiat(state) {
        return None;
    }
    get_token_fiat_amount(
        lookup_exchange_rate(&get_token_exchange_rates(state), &token.address),
        get_conversion_rate(state),
        &get_current_currency(state),
        Some(&token.string),
        &token.symbol,
        true,
        false,
    )
}

/// Balance text for a row; rows still waiting on a balance show the loading message
pub fn token_primary_text(token: &TrackedToken) -> String {
    match token.balance {
        Some(_) => token.string.clone(),
        None => t("loading"),
    }
}

#[component]
pub fn TokenList(tokens: Vec<TrackedToken>, on_token_click: EventHandler<String>) -> Element {
    let store = use_context::<Signal<MetamaskState>>();

    rsx! {
        div {
            class: "token-list",
            for token in tokens {
                {
                    let address = token.address.clone();
                    let secondary = token_secondary_value(&store.read(), &token);
                    let pending = token.balance.is_none();
                    rsx! {
                        TokenListItem {
                            key: "{token.address}",
                            title: token.symbol.clone(),
                            primary: Some(token_primary_text(&token)),
                            token_symbol: if pending { None } else { Some(token.symbol.clone()) },
                            secondary: secondary,
                            token_image: token.image.clone(),
                            onclick: move |_| on_token_click.call(address.clone()),
                        }
                    }
                }
            }
        }
    }
}
