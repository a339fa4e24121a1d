// src/pages/asset.rs
use dioxus::prelude::*;

use crate::components::token_list::token_secondary_value;
use crate::components::Popover;
use crate::currency_display::{
    use_currency_display, use_user_preferenced_currency, CurrencyKind, PreferencedCurrencyOptions,
};
use crate::i18n::{t, t_with};
use crate::layout::PopoverPosition;
use crate::store::*;
use crate::token_tracker::{track_tokens, TrackedToken};
use crate::Route;

/// The token row for `id`, if it names an added token
pub fn find_tracked_token(state: &MetamaskState, id: &str) -> Option<TrackedToken> {
    let tokens = get_tokens(state);
    let balances = get_token_balances(state);
    track_tokens(&tokens, &balances, false, false, None)
        .tokens_with_balances
        .into_iter()
        .find(|token| token.address.eq_ignore_ascii_case(id))
}

#[component]
pub fn AssetPage(id: String) -> Element {
    let store = use_context::<Signal<MetamaskState>>();
    let back_label = t("back");
    let is_native = id.eq_ignore_ascii_case(&get_native_currency(&store.read()));

    rsx! {
        div {
            class: "asset-page",
            div {
                class: "page-header",
                Link { to: Route::HomePage {}, class: "back-link", "{back_label}" }
            }
            if is_native {
                NativeAsset {}
            } else {
                TokenAsset { address: id.clone() }
            }
        }
    }
}

#[component]
fn NativeAsset() -> Element {
    let store = use_context::<Signal<MetamaskState>>();
    let balance = use_memo(move || get_selected_account_cached_balance(&store.read()));
    let native_currency = use_memo(move || get_native_currency(&store.read()));
    let image = use_memo(move || get_native_currency_image(&store.read()));
    let chain_id = use_memo(move || get_current_chain_id(&store.read()).to_string());

    let opts = PreferencedCurrencyOptions {
        native_number_of_decimals: Some(8),
        ..Default::default()
    };
    let primary = use_user_preferenced_currency(store, CurrencyKind::Primary, opts);
    let secondary = use_user_preferenced_currency(store, CurrencyKind::Secondary, opts);
    let primary_display = use_currency_display(store, balance, primary);
    let secondary_display = use_currency_display(store, balance, secondary);

    let (primary_text, _) = primary_display();
    let (secondary_text, _) = secondary_display();
    let show_secondary = get_should_show_fiat(&store.read());
    let chain_label = t_with("chainIdLabel", &[&chain_id()]);
    let decimals_label = t_with("tokenDecimalLabel", &["18"]);

    rsx! {
        div {
            class: "asset-overview",
            if let Some(image) = image() {
                img { class: "asset-overview__icon", src: "{image}", alt: "{native_currency}" }
            }
            h2 { class: "asset-overview__symbol", "{native_currency}" }
            div { class: "asset-overview__primary", "{primary_text}" }
            if show_secondary {
                div { class: "asset-overview__secondary", "{secondary_text}" }
            }
            Popover {
                position: PopoverPosition::BottomStart,
                flip: true,
                trigger: rsx! { button { class: "asset-overview__details", "ⓘ" } },
                div {
                    class: "asset-details",
                    div { "{chain_label}" }
                    div { "{decimals_label}" }
                }
            }
        }
    }
}

#[component]
fn TokenAsset(address: String) -> Element {
    let store = use_context::<Signal<MetamaskState>>();
    let lookup = address.clone();
    let token = use_memo(move || find_tracked_token(&store.read(), &lookup));

    let Some(token) = token() else {
        return rsx! {
            div { class: "asset-missing", "{address}" }
        };
    };
    let secondary = token_secondary_value(&store.read(), &token);
    let decimals_label = t_with("tokenDecimalLabel", &[&token.decimals.to_string()]);

    rsx! {
        div {
            class: "asset-overview",
            if let Some(image) = token.image.clone() {
                img { class: "asset-overview__icon", src: "{image}", alt: "{token.symbol}" }
            }
            h2 { class: "asset-overview__symbol", "{token.symbol}" }
            div { class: "asset-overview__primary", "{token.string} {token.symbol}" }
            if let Some(secondary) = secondary {
                div { class: "asset-overview__secondary", "{secondary}" }
            }
            Popover {
                position: PopoverPosition::Auto,
                match_width: false,
                trigger: rsx! { button { class: "asset-overview__details", "ⓘ" } },
                div {
                    class: "asset-details",
                    div { class: "asset-details__address", "{token.address}" }
                    div { "{decimals_label}" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_tracker::TokenDescriptor;

    #[test]
    fn test_find_tracked_token_case_insensitive() {
        let mut state = MetamaskState::default();
        state.tokens = vec![TokenDescriptor {
            address: "0xAbC".to_string(),
            symbol: "TKN".to_string(),
            decimals: 2,
            image: None,
            name: None,
        }];
        state.token_balances.insert("0xabc".to_string(), "0x64".to_string()); // 100 -> 1.00

        let token = find_tracked_token(&state, "0xABC").unwrap();
        assert_eq!(token.symbol, "TKN");
        assert_eq!(token.string, "1");
        assert!(find_tracked_token(&state, "0xdef").is_none());
    }
}
