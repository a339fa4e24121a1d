use dioxus::prelude::*;

use crate::components::AssetList;
use crate::Route;

#[component]
pub fn HomePage() -> Element {
    let navigator = use_navigator();

    rsx! {
        div {
            class: "home-page",
            AssetList {
                on_click_asset: move |id: String| {
                    navigator.push(Route::AssetPage { id });
                },
            }
        }
    }
}
