use dioxus::prelude::*;

use crate::i18n::{t, ADD_CUSTOM_TOKENS_URL};

/// Empty state for token search results
#[component]
pub fn TokenListPlaceholder() -> Element {
    let message = t("addAcquiredTokens");
    let learn_more = t("learnMoreUpperCase");

    rsx! {
        div {
            class: "token-list-placeholder",
            div { class: "token-list-placeholder__text", "{message}" }
            a {
                class: "token-list-placeholder__link",
                href: ADD_CUSTOM_TOKENS_URL,
                target: "_blank",
                rel: "noopener noreferrer",
                "{learn_more}"
            }
        }
    }
}
