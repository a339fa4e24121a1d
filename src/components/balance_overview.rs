use dioxus::prelude::*;

use crate::i18n::t;

/// Aggregate account balance across the native currency and tokens
#[component]
pub fn BalanceOverview(balance: String, loading: bool) -> Element {
    let label = t("totalBalance");
    let loading_text = t("loading");

    rsx! {
        div {
            class: "balance-section",
            div { class: "balance-label", "{label}" }
            div {
                class: "balance-amount",
                if loading {
                    span { class: "balance-loading", "{loading_text}" }
                } else {
                    "{balance}"
                }
            }
        }
    }
}
