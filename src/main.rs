use dioxus::prelude::*;
use std::rc::Rc;

mod components;
mod config;
mod conversion;
mod currency;
mod currency_display;
mod i18n;
mod institutional;
mod layout;
mod metrics;
mod pages;
mod storage;
mod store;
mod token_tracker;

use components::{PopoverLayer, PopoverPortal};
use config::UiConfig;
use currency::{fetch_conversion_rate, get_supported_currencies};
use i18n::t;
use institutional::{HttpBackgroundConnection, MmiActions};
use metrics::MetricsContext;
use pages::*;
use storage::{load_currency_from_storage, load_state_from_storage, save_currency_to_storage, save_state_to_storage};
use store::{dispatch, get_current_currency, get_native_currency, Action, MetamaskState};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(AppShell)]
        #[route("/")]
        HomePage {},
        #[route("/asset/:id")]
        AssetPage { id: String },
        #[route("/import-token")]
        ImportTokenPage {},
        #[route("/custody")]
        CustodyPage {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Info)
                .with_tag("walletview"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        if let Err(e) = dioxus::logger::init(dioxus::logger::tracing::Level::INFO) {
            eprintln!("Failed to initialize logger: {}", e);
        }
    }
}

fn main() {
    init_logging();
    dioxus::launch(App);
}

fn initial_state() -> MetamaskState {
    let mut state = load_state_from_storage();
    if let Some(currency) = load_currency_from_storage() {
        state.current_currency = currency;
    }
    state
}

#[component]
fn App() -> Element {
    let config = use_context_provider(UiConfig::from_env);
    let store = use_context_provider(|| Signal::new(initial_state()));
    use_context_provider(MetricsContext::default);
    use_context_provider(PopoverPortal::new);
    use_context_provider(|| {
        log::info!("Background channel at {}", config.background_url);
        MmiActions::new(Rc::new(HttpBackgroundConnection::new(&config.background_url)))
    });

    let native_currency = use_memo(move || get_native_currency(&store.read()));
    let current_currency = use_memo(move || get_current_currency(&store.read()));

    // Refresh the rate whenever the native or display currency changes
    use_effect(move || {
        let native = native_currency();
        let currency = current_currency();
        spawn(async move {
            match fetch_conversion_rate(&native, &currency).await {
                Ok(rate) => dispatch(store, Action::SetConversionRate(Some(rate))),
                Err(e) => {
                    log::warn!("Conversion rate {}/{} unavailable: {}", native, currency, e);
                    dispatch(store, Action::SetConversionRate(None));
                }
            }
        });
    });

    use_effect(move || {
        if let Err(e) = save_state_to_storage(&store.read()) {
            log::error!("Failed to persist wallet state: {}", e);
        }
    });

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        Router::<Route> {}
    }
}

#[component]
fn AppShell() -> Element {
    let store = use_context::<Signal<MetamaskState>>();
    let current_currency = get_current_currency(&store.read()).to_uppercase();
    let currencies = get_supported_currencies();
    let custody_label = t("connectCustodialAccount");

    let handle_currency_selection = move |code: String| {
        if let Err(e) = save_currency_to_storage(&code.to_lowercase()) {
            log::warn!("Failed to save currency: {}", e);
        }
        dispatch(store, Action::SetCurrentCurrency(code));
    };

    rsx! {
        div {
            class: "app-shell",
            header {
                class: "app-header",
                Link { to: Route::HomePage {}, class: "app-title", "walletview" }
                select {
                    class: "currency-select",
                    value: "{current_currency}",
                    onchange: move |e| handle_currency_selection(e.value()),
                    for currency in currencies {
                        option {
                            key: "{currency.code}",
                            value: "{currency.code}",
                            selected: currency.code == current_currency,
                            "{currency.symbol} {currency.code}"
                        }
                    }
                }
                Link { to: Route::CustodyPage {}, class: "custody-link", "{custody_label}" }
            }
            main {
                class: "app-content",
                Outlet::<Route> {}
            }
        }
        PopoverLayer {}
    }
}
