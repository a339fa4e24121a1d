use dioxus::prelude::*;

use crate::i18n::t;
use crate::Route;

#[component]
pub fn ImportTokenLink() -> Element {
    let label = format!("+ {}", t("importTokens"));

    rsx! {
        div {
            class: "import-token-link",
            Link {
                to: Route::ImportTokenPage {},
                class: "import-token-link__button",
                "data-testid": "import-token-button",
                "{label}"
            }
        }
    }
}
