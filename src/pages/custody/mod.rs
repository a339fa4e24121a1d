// src/pages/custody/mod.rs
pub mod flow;

use dioxus::prelude::*;
use std::time::Duration;

use crate::config::UiConfig;
use crate::i18n::{t, t_with};
use crate::institutional::{BackgroundError, Custodian, CustodianAccount, MmiActions};
use crate::metrics::{MetaMetricsEvent, MetaMetricsEventCategory, MetaMetricsEventName, MetricsContext};
use crate::store::{dispatch, get_custodians, get_is_loading, Action, MetamaskState};
use crate::Route;

use flow::*;

async fn start_connect(
    actions: MmiActions,
    mut flow: Signal<CustodyFlow>,
    store: Signal<MetamaskState>,
    custodian: SelectedCustodian,
    timeout: Duration,
) {
    {
        let mut current = flow.write();
        current.select_custodian(custodian.clone());
        current.begin();
    }
    let jwt_list = connect_custodian(&actions, &custodian, timeout).await;
    dispatch(store, Action::SetCustodianJwtList(jwt_list.clone()));
    flow.write().jwt_list_loaded(jwt_list);
}

async fn load_accounts(actions: MmiActions, mut flow: Signal<CustodyFlow>, store: Signal<MetamaskState>, timeout: Duration) {
    let (custodian, jwt) = {
        let mut current = flow.write();
        current.begin();
        (current.selected.clone(), current.current_jwt.clone())
    };
    let Some(custodian) = custodian else {
        flow.write().loading = false;
        return;
    };
    dispatch(store, Action::ShowLoading(None));
    let result = fetch_accounts(&actions, &custodian, &jwt, timeout).await;
    dispatch(store, Action::HideLoading);
    record_result(store, &result);
    flow.write().accounts_loaded(result);
}

async fn search_by_address(actions: MmiActions, mut flow: Signal<CustodyFlow>, timeout: Duration) {
    let (custodian, jwt, query) = {
        let mut current = flow.write();
        current.begin();
        (current.selected.clone(), current.current_jwt.clone(), current.search_query.trim().to_string())
    };
    let Some(custodian) = custodian else {
        flow.write().loading = false;
        return;
    };
    let result = search_accounts_by_address(&actions, &custodian, &jwt, &query, timeout).await;
    flow.write().search_loaded(result);
}

async fn finish_connect(
    actions: MmiActions,
    mut flow: Signal<CustodyFlow>,
    store: Signal<MetamaskState>,
    metrics: MetricsContext,
    timeout: Duration,
) {
    let (custodian, accounts) = {
        let mut current = flow.write();
        current.begin();
        (current.selected.clone(), current.connected_accounts())
    };
    let Some(custodian) = custodian else {
        flow.write().loading = false;
        return;
    };
    let result = connect_accounts(&actions, &custodian, &accounts, timeout).await;
    match &result {
        Ok(count) => {
            log::info!("Connected {} accounts from {}", count, custodian.name);
            dispatch(
                store,
                Action::SetConnectedAccounts(accounts.iter().map(|a| a.address.clone()).collect()),
            );
            dispatch(store, Action::SetCustodyError(None));
            metrics.track(
                MetaMetricsEvent::new(MetaMetricsEventName::CustodianConnected, MetaMetricsEventCategory::Institutional)
                    .property("custodian", custodian.name.clone())
                    .property("accounts", *count as u64),
            );
        }
        Err(e) => dispatch(store, Action::SetCustodyError(Some(e.to_string()))),
    }
    flow.write().connect_finished(result);
}

fn record_result(store: Signal<MetamaskState>, result: &Result<Vec<CustodianAccount>, BackgroundError>) {
    match result {
        Ok(accounts) => dispatch(store, Action::SetCustodianAccounts(accounts.clone())),
        Err(e) => dispatch(store, Action::SetCustodyError(Some(e.to_string()))),
    }
}

#[component]
pub fn CustodyPage() -> Element {
    let store = use_context::<Signal<MetamaskState>>();
    let config = use_context::<UiConfig>();
    let metrics = use_context::<MetricsContext>();
    let actions = use_context::<MmiActions>();
    let mut flow = use_signal(CustodyFlow::default);
    let timeout = config.background_timeout();
    let production = config.is_production();

    let custodians = use_memo(move || visible_custodians(&get_custodians(&store.read()), production));

    let mount_actions = actions.clone();
    use_effect(move || {
        let actions = mount_actions.clone();
        spawn(async move {
            match load_connect_request(&actions, timeout).await {
                Ok(Some(request)) => {
                    log::info!("Resuming connect request from {}", request.custodian);
                    let all_custodians = get_custodians(&store.peek());
                    {
                        let mut current = flow.write();
                        current.select_custodian(SelectedCustodian::from_request(&request, &all_custodians));
                        current.current_jwt = request.token.clone();
                        current.begin();
                    }
                    dispatch(store, Action::SetConnectRequest(Some(request)));
                    let custodian = flow.peek().selected.clone();
                    if let Some(custodian) = custodian {
                        let jwt = flow.peek().current_jwt.clone();
                        match fetch_accounts(&actions, &custodian, &jwt, timeout).await {
                            Ok(accounts) if accounts.is_empty() => flow.write().loading = false,
                            result => flow.write().accounts_loaded(result),
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Could not read custodian connect request: {}", e);
                }
            }
        });
    });

    let select_actions = actions.clone();
    let on_select_custodian = move |custodian: Custodian| {
        spawn(start_connect(
            select_actions.clone(),
            flow,
            store,
            SelectedCustodian::from(&custodian),
            timeout,
        ));
    };
    let jwt_actions = actions.clone();
    let on_jwt_connect = move |_: ()| {
        spawn(load_accounts(jwt_actions.clone(), flow, store, timeout));
    };
    let search_actions = actions.clone();
    let on_search = move |_: ()| {
        spawn(search_by_address(search_actions.clone(), flow, timeout));
    };
    let on_accounts_connect = move |_: ()| {
        spawn(finish_connect(actions.clone(), flow, store, metrics.clone(), timeout));
    };

    let current = flow();
    let title = t("connectCustodialAccount");
    let is_loading = get_is_loading(&store.read());
    let loading_text = t("loading");

    rsx! {
        div {
            class: "custody-page",
            div {
                class: "page-header",
                h2 { class: "page-title", "{title}" }
            }

            if let Some(error) = current.error.clone() {
                div { class: "error-message", "{error}" }
            }

            if is_loading {
                div { class: "loading-indicator", "{loading_text}" }
            }

            match current.step.clone() {
                CustodyStep::SelectCustodian => rsx! {
                    CustodianSelect {
                        custodians: custodians(),
                        loading: current.loading,
                        on_connect: on_select_custodian,
                    }
                },
                CustodyStep::EnterJwt => rsx! {
                    JwtForm {
                        flow: flow,
                        on_connect: on_jwt_connect,
                        on_cancel: move |_| flow.write().cancel(),
                    }
                },
                CustodyStep::SelectAccounts => rsx! {
                    AccountSelect {
                        flow: flow,
                        on_search: on_search,
                        on_connect: on_accounts_connect,
                        on_cancel: move |_| flow.write().cancel(),
                    }
                },
                CustodyStep::Connected { count } => rsx! {
                    ConnectedSummary { count: count }
                },
            }
        }
    }
}

#[component]
fn CustodianSelect(custodians: Vec<Custodian>, loading: bool, on_connect: EventHandler<Custodian>) -> Element {
    let message = t("connectCustodialAccountMsg");
    let empty = t("noCustodiansConfigured");
    let connect_label = t("connect");
    let non_production = t("nonProductionCustodian");

    rsx! {
        p { class: "custody-message", "{message}" }
        if custodians.is_empty() {
            div { class: "custody-empty", "{empty}" }
        } else {
            ul {
                class: "custody-list",
                for custodian in custodians {
                    {
                        let selected = custodian.clone();
                        rsx! {
                            li {
                                key: "{custodian.name}",
                                class: "custody-item",
                                div {
                                    class: "custody-item__info",
                                    if let Some(icon) = custodian.icon_url.clone() {
                                        img { class: "custody-item__icon", src: "{icon}", alt: "{custodian.display_name}" }
                                    }
                                    span { class: "custody-item__name", "{custodian.display_name}" }
                                    if !custodian.production {
                                        span { class: "custody-item__tag", "{non_production}" }
                                    }
                                }
                                button {
                                    class: "modal-button confirm",
                                    "data-testid": CUSTODY_CONNECT_BUTTON_TEST_ID,
                                    disabled: loading,
                                    onclick: move |_| on_connect.call(selected.clone()),
                                    "{connect_label}"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn JwtForm(mut flow: Signal<CustodyFlow>, on_connect: EventHandler<()>, on_cancel: EventHandler<()>) -> Element {
    let current = flow();
    let label = t("pasteJWTToken");
    let connect_label = t("connect");
    let cancel_label = t("cancel");
    let custodian_name = current.selected.as_ref().map(|c| c.display_name.clone()).unwrap_or_default();
    let can_connect = !current.current_jwt.trim().is_empty() && !current.loading;

    rsx! {
        div {
            class: "jwt-form",
            div { class: "jwt-form__custodian", "{custodian_name}" }
            if current.jwt_list.len() > 1 {
                select {
                    class: "jwt-form__select",
                    value: "{current.current_jwt}",
                    onchange: move |e| flow.write().current_jwt = e.value(),
                    for jwt in current.jwt_list.clone() {
                        option { key: "{jwt}", value: "{jwt}", "{jwt}" }
                    }
                }
            }
            label { class: "jwt-form__label", "{label}" }
            textarea {
                class: "jwt-form__input",
                value: "{current.current_jwt}",
                oninput: move |e| flow.write().current_jwt = e.value(),
            }
            div {
                class: "modal-footer",
                button {
                    class: "modal-button cancel",
                    onclick: move |_| on_cancel.call(()),
                    "{cancel_label}"
                }
                button {
                    class: "modal-button confirm",
                    "data-testid": JWT_FORM_CONNECT_BUTTON_TEST_ID,
                    disabled: !can_connect,
                    onclick: move |_| on_connect.call(()),
                    "{connect_label}"
                }
            }
        }
    }
}

#[component]
fn AccountSelect(
    mut flow: Signal<CustodyFlow>,
    on_search: EventHandler<()>,
    on_connect: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    let current = flow();
    let title = t("selectAnAccount");
    let placeholder = t("searchAccounts");
    let search_label = t("search");
    let empty = t("noAccountsFound");
    let connect_label = t("connect");
    let cancel_label = t("cancel");
    let accounts = current.filtered_accounts();
    let is_address_query = current.search_query.trim().starts_with("0x");
    let nothing_selected = current.selected_accounts.is_empty() || current.loading;

    rsx! {
        div {
            class: "account-select",
            h3 { class: "account-select__title", "{title}" }
            div {
                class: "account-select__search",
                input {
                    r#type: "text",
                    placeholder: "{placeholder}",
                    value: "{current.search_query}",
                    oninput: move |e| flow.write().search_query = e.value(),
                }
                if is_address_query {
                    button {
                        class: "modal-button",
                        disabled: current.loading,
                        onclick: move |_| on_search.call(()),
                        "{search_label}"
                    }
                }
            }
            if accounts.is_empty() {
                div { class: "account-select__empty", "{empty}" }
            }
            for account in accounts {
                {
                    let address = account.address.clone();
                    let checked = current.selected_accounts.contains(&account.address);
                    rsx! {
                        label {
                            key: "{account.address}",
                            class: "account-select__item",
                            input {
                                r#type: "checkbox",
                                checked: checked,
                                onchange: move |_| flow.write().toggle_account(&address),
                            }
                            span { class: "account-select__name", "{account.name}" }
                            span { class: "account-select__address", "{account.address}" }
                        }
                    }
                }
            }
            div {
                class: "modal-footer",
                button {
                    class: "modal-button cancel",
                    onclick: move |_| on_cancel.call(()),
                    "{cancel_label}"
                }
                button {
                    class: "modal-button confirm",
                    disabled: nothing_selected,
                    onclick: move |_| on_connect.call(()),
                    "{connect_label}"
                }
            }
        }
    }
}

#[component]
fn ConnectedSummary(count: usize) -> Element {
    let message = t_with("custodianAccountsConnected", &[&count.to_string()]);
    let close_label = t("close");

    rsx! {
        div {
            class: "custody-connected",
            p { "{message}" }
            Link {
                to: Route::HomePage {},
                class: "modal-button confirm",
                "{close_label}"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::institutional::actions::mock::MockConnection;
    use serde_json::json;
    use std::rc::Rc;

    fn saturn() -> Custodian {
        Custodian {
            custodian_type: "Saturn".to_string(),
            name: "saturn".to_string(),
            api_url: "https://saturn-custody.dev.metamask-institutional.io".to_string(),
            icon_url: None,
            display_name: "Saturn Custody".to_string(),
            production: true,
            refresh_token_url: None,
            is_note_to_trader_supported: false,
            version: 1,
        }
    }

    #[component]
    fn PageHarness(custodians: Vec<Custodian>) -> Element {
        let seeded = custodians.clone();
        use_context_provider(UiConfig::default);
        use_context_provider(move || {
            let mut state = MetamaskState::default();
            state.mmi_configuration.custodians = seeded;
            Signal::new(state)
        });
        use_context_provider(MetricsContext::default);
        use_context_provider(|| MmiActions::new(Rc::new(MockConnection::new())));

        rsx! { CustodyPage {} }
    }

    #[component]
    fn JwtFormHarness(initial: CustodyFlow) -> Element {
        let flow = use_signal(move || initial.clone());
        rsx! {
            JwtForm {
                flow: flow,
                on_connect: move |_| {},
                on_cancel: move |_| {},
            }
        }
    }

    fn render_page(custodians: Vec<Custodian>) -> String {
        let mut dom = VirtualDom::new_with_props(PageHarness, PageHarnessProps { custodians });
        dom.rebuild_in_place();
        dioxus_ssr::render(&dom)
    }

    fn test_id(id: &str) -> String {
        format!("data-testid=\"{}\"", id)
    }

    #[test]
    fn test_page_without_custodians_has_no_connect_button() {
        let html = render_page(Vec::new());
        assert!(html.contains("custody-empty"));
        assert!(!html.contains(&test_id(CUSTODY_CONNECT_BUTTON_TEST_ID)));
        assert!(!html.contains(&test_id(JWT_FORM_CONNECT_BUTTON_TEST_ID)));
    }

    #[test]
    fn test_page_with_one_custodian_offers_connect() {
        let html = render_page(vec![saturn()]);
        assert_eq!(html.matches(&test_id(CUSTODY_CONNECT_BUTTON_TEST_ID)).count(), 1);
        assert!(html.contains("Saturn Custody"));
        assert!(!html.contains(&test_id(JWT_FORM_CONNECT_BUTTON_TEST_ID)));
    }

    #[tokio::test]
    async fn test_connecting_a_custodian_shows_jwt_form() {
        let connection = Rc::new(MockConnection::new().respond("getCustodianJWTList", json!(["jwt1"])));
        let actions = MmiActions::new(connection.clone());

        let mut flow = CustodyFlow::default();
        let selected = SelectedCustodian::from(&saturn());
        flow.select_custodian(selected.clone());
        flow.begin();
        let jwt_list = connect_custodian(&actions, &selected, Duration::from_secs(1)).await;
        flow.jwt_list_loaded(jwt_list);
        assert_eq!(connection.call_count("getCustodianJWTList"), 1);

        let mut dom = VirtualDom::new_with_props(JwtFormHarness, JwtFormHarnessProps { initial: flow });
        dom.rebuild_in_place();
        let html = dioxus_ssr::render(&dom);

        assert!(html.contains(&test_id(JWT_FORM_CONNECT_BUTTON_TEST_ID)));
        assert!(html.contains("Saturn Custody"));
        assert!(!html.contains(&test_id(CUSTODY_CONNECT_BUTTON_TEST_ID)));
    }
}
