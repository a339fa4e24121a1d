// src/pages/custody/flow.rs
//! Step state for connecting custodial accounts.
//!
//! The page keeps one [`CustodyFlow`] in a signal. Background calls run in
//! the async helpers below and their results are folded back into the flow
//! with the `*_loaded` methods, which always clear the loading flag.
use std::collections::BTreeSet;
use std::time::Duration;

use crate::institutional::{
    BackgroundError, ConnectRequest, ConnectedAccount, Custodian, CustodianAccount, MmiActions,
};

pub const CUSTODY_CONNECT_BUTTON_TEST_ID: &str = "custody-connect-button";
pub const JWT_FORM_CONNECT_BUTTON_TEST_ID: &str = "jwt-form-connect-button";

#[derive(Debug, Clone, PartialEq)]
pub enum CustodyStep {
    SelectCustodian,
    EnterJwt,
    SelectAccounts,
    Connected { count: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCustodian {
    pub name: String,
    pub display_name: String,
    pub custodian_type: String,
    pub api_url: String,
    pub icon_url: Option<String>,
}

impl From<&Custodian> for SelectedCustodian {
    fn from(custodian: &Custodian) -> Self {
        Self {
            name: custodian.name.clone(),
            display_name: custodian.display_name.clone(),
            custodian_type: custodian.custodian_type.clone(),
            api_url: custodian.api_url.clone(),
            icon_url: custodian.icon_url.clone(),
        }
    }
}

impl SelectedCustodian {
    /// Custodian named by a connect request, matched against the configuration
    pub fn from_request(request: &ConnectRequest, custodians: &[Custodian]) -> Self {
        let name = request.custodian_name.clone().unwrap_or_else(|| request.custodian.clone());
        match custodians.iter().find(|c| c.name.eq_ignore_ascii_case(&name)) {
            Some(custodian) => Self {
                api_url: request.api_url.clone(),
                ..Self::from(custodian)
            },
            None => Self {
                display_name: name.clone(),
                custodian_type: request.custodian_type.clone().unwrap_or_else(|| request.custodian.clone()),
                name,
                api_url: request.api_url.clone(),
                icon_url: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustodyFlow {
    pub step: CustodyStep,
    pub selected: Option<SelectedCustodian>,
    pub jwt_list: Vec<String>,
    pub current_jwt: String,
    pub accounts: Vec<CustodianAccount>,
    pub selected_accounts: BTreeSet<String>,
    pub search_query: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for CustodyFlow {
    fn default() -> Self {
        Self {
            step: CustodyStep::SelectCustodian,
            selected: None,
            jwt_list: Vec::new(),
            current_jwt: String::new(),
            accounts: Vec::new(),
            selected_accounts: BTreeSet::new(),
            search_query: String::new(),
            loading: false,
            error: None,
        }
    }
}

impl CustodyFlow {
    /// Mark a background call as in flight
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn fail(&mut self, error: &BackgroundError) {
        log::error!("Custody request failed: {}", error);
        self.loading = false;
        self.error = Some(error.to_string());
    }

    pub fn select_custodian(&mut self, custodian: SelectedCustodian) {
        self.selected = Some(custodian);
        self.jwt_list.clear();
        self.current_jwt.clear();
        self.accounts.clear();
        self.selected_accounts.clear();
    }

    /// Show the token form, prefilled with the most recent token
    pub fn jwt_list_loaded(&mut self, jwt_list: Vec<String>) {
        self.loading = false;
        self.current_jwt = jwt_list.first().cloned().unwrap_or_default();
        self.jwt_list = jwt_list;
        self.step = CustodyStep::EnterJwt;
    }

    pub fn jwt_form_visible(&self) -> bool {
        self.step == CustodyStep::EnterJwt
    }

    pub fn accounts_loaded(&mut self, result: Result<Vec<CustodianAccount>, BackgroundError>) {
        match result {
            Ok(accounts) => {
                self.loading = false;
                self.accounts = accounts;
                self.selected_accounts.clear();
                self.step = CustodyStep::SelectAccounts;
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Results of an address search replace the listed accounts
    pub fn search_loaded(&mut self, result: Result<Vec<CustodianAccount>, BackgroundError>) {
        match result {
            Ok(accounts) => {
                self.loading = false;
                self.accounts = accounts;
            }
            Err(e) => self.fail(&e),
        }
    }

    pub fn connect_finished(&mut self, result: Result<usize, BackgroundError>) {
        match result {
            Ok(count) => {
                self.loading = false;
                self.step = CustodyStep::Connected { count };
            }
            Err(e) => self.fail(&e),
        }
    }

    pub fn toggle_account(&mut self, address: &str) {
        if !self.selected_accounts.remove(address) {
            self.selected_accounts.insert(address.to_string());
        }
    }

    /// Accounts matching the search box by name or address
    pub fn filtered_accounts(&self) -> Vec<CustodianAccount> {
        let query = self.search_query.trim().to_lowercase();
        self.accounts
            .iter()
            .filter(|account| {
                query.is_empty()
                    || account.name.to_lowercase().contains(&query)
                    || account.address.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    /// Selected accounts in the shape the background expects
    pub fn connected_accounts(&self) -> Vec<ConnectedAccount> {
        let Some(custodian) = &self.selected else {
            return Vec::new();
        };
        self.accounts
            .iter()
            .filter(|account| self.selected_accounts.contains(&account.address))
            .map(|account| {
                ConnectedAccount::from_account(account, &self.current_jwt, &custodian.api_url, &custodian.custodian_type)
            })
            .collect()
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}

/// Custodians offered for connection, sorted by display name.
///
/// Non-production custodians are hidden in production builds.
pub fn visible_custodians(custodians: &[Custodian], production: bool) -> Vec<Custodian> {
    let mut visible: Vec<Custodian> = custodians
        .iter()
        .filter(|custodian| !production || custodian.production)
        .cloned()
        .collect();
    visible.sort_by_key(|custodian| custodian.display_name.to_lowercase());
    visible
}

/// Fetch previously used tokens for the chosen custodian.
///
/// Falls back to the token stored for the custodian when the list is
/// empty. A failure here leaves the form empty for a pasted token.
pub async fn connect_custodian(actions: &MmiActions, custodian: &SelectedCustodian, timeout: Duration) -> Vec<String> {
    let jwt_list = match actions
        .get_custodian_jwt_list(&custodian.name)
        .resolve("getCustodianJWTList", timeout)
        .await
    {
        Ok(list) => list,
        Err(e) => {
            log::warn!("No stored tokens for {}: {}", custodian.name, e);
            Vec::new()
        }
    };
    if !jwt_list.is_empty() {
        return jwt_list;
    }
    match actions
        .get_custodian_token(&custodian.name)
        .resolve("getCustodianToken", timeout)
        .await
    {
        Ok(token) if !token.is_empty() => vec![token],
        Ok(_) => Vec::new(),
        Err(e) => {
            log::debug!("No custodian token for {}: {}", custodian.name, e);
            Vec::new()
        }
    }
}

pub async fn fetch_accounts(
    actions: &MmiActions,
    custodian: &SelectedCustodian,
    jwt: &str,
    timeout: Duration,
) -> Result<Vec<CustodianAccount>, BackgroundError> {
    actions
        .get_custodian_accounts(jwt, &custodian.api_url, &custodian.custodian_type, true)
        .resolve("getCustodianAccounts", timeout)
        .await
}

pub async fn search_accounts_by_address(
    actions: &MmiActions,
    custodian: &SelectedCustodian,
    jwt: &str,
    address: &str,
    timeout: Duration,
) -> Result<Vec<CustodianAccount>, BackgroundError> {
    actions
        .get_custodian_accounts_by_address(jwt, &custodian.api_url, address, &custodian.custodian_type)
        .resolve("getCustodianAccountsByAddress", timeout)
        .await
}

/// Connect the accounts, returning how many were sent
pub async fn connect_accounts(
    actions: &MmiActions,
    custodian: &SelectedCustodian,
    accounts: &[ConnectedAccount],
    timeout: Duration,
) -> Result<usize, BackgroundError> {
    actions
        .connect_custody_addresses(&custodian.custodian_type, &custodian.name, accounts)
        .resolve("connectCustodyAddresses", timeout)
        .await?;
    Ok(accounts.len())
}

/// Pending connect request opened from a custodian's site
pub async fn load_connect_request(
    actions: &MmiActions,
    timeout: Duration,
) -> Result<Option<ConnectRequest>, BackgroundError> {
    actions
        .get_custodian_connect_request()
        .resolve("getCustodianConnectRequest", timeout)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::institutional::actions::mock::MockConnection;
    use serde_json::json;
    use std::rc::Rc;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn saturn(production: bool) -> Custodian {
        Custodian {
            custodian_type: "Saturn".to_string(),
            name: "saturn".to_string(),
            api_url: "https://saturn-custody.dev.metamask-institutional.io".to_string(),
            icon_url: None,
            display_name: "Saturn Custody".to_string(),
            production,
            refresh_token_url: None,
            is_note_to_trader_supported: false,
            version: 1,
        }
    }

    fn account(name: &str, address: &str) -> CustodianAccount {
        CustodianAccount {
            name: name.to_string(),
            address: address.to_string(),
            custodian_details: None,
            labels: Vec::new(),
            chain_id: None,
        }
    }

    #[test]
    fn test_no_custodians_means_no_connect_buttons() {
        assert!(visible_custodians(&[], false).is_empty());
        assert!(visible_custodians(&[], true).is_empty());
    }

    #[test]
    fn test_single_custodian_is_offered() {
        let visible = visible_custodians(&[saturn(true)], true);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "saturn");
    }

    #[test]
    fn test_non_production_custodians_hidden_in_production() {
        let mut jupiter = saturn(false);
        jupiter.name = "jupiter".to_string();
        jupiter.display_name = "Jupiter Custody".to_string();
        let custodians = vec![saturn(true), jupiter];

        let production = visible_custodians(&custodians, true);
        assert_eq!(production.len(), 1);

        let development = visible_custodians(&custodians, false);
        let names: Vec<&str> = development.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["jupiter", "saturn"]);
    }

    #[tokio::test]
    async fn test_connect_shows_jwt_form_after_one_list_request() {
        let connection = Rc::new(MockConnection::new());
        let actions = MmiActions::new(connection.clone());
        let mut flow = CustodyFlow::default();
        let custodian = SelectedCustodian::from(&saturn(true));

        flow.select_custodian(custodian.clone());
        flow.begin();
        let list = connect_custodian(&actions, &custodian, TIMEOUT).await;
        flow.jwt_list_loaded(list);

        assert!(flow.jwt_form_visible());
        assert!(!flow.loading);
        assert_eq!(connection.call_count("getCustodianJWTList"), 1);
        assert_eq!(connection.last_params("getCustodianJWTList"), Some(json!(["saturn"])));
    }

    #[tokio::test]
    async fn test_jwt_prefilled_from_stored_tokens() {
        let connection = Rc::new(MockConnection::deferred().respond("getCustodianJWTList", json!(["jwt-a", "jwt-b"])));
        let actions = MmiActions::new(connection);
        let mut flow = CustodyFlow::default();
        let custodian = SelectedCustodian::from(&saturn(true));

        flow.select_custodian(custodian.clone());
        flow.jwt_list_loaded(connect_custodian(&actions, &custodian, TIMEOUT).await);

        assert_eq!(flow.current_jwt, "jwt-a");
        assert_eq!(flow.jwt_list.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_jwt_list_falls_back_to_custodian_token() {
        let connection = Rc::new(
            MockConnection::new()
                .respond("getCustodianJWTList", json!(null))
                .respond("getCustodianToken", json!("testJWT")),
        );
        let actions = MmiActions::new(connection.clone());
        let custodian = SelectedCustodian::from(&saturn(true));

        let list = connect_custodian(&actions, &custodian, TIMEOUT).await;

        assert_eq!(list, vec!["testJWT".to_string()]);
        assert_eq!(connection.call_count("getCustodianJWTList"), 1);
        assert_eq!(connection.last_params("getCustodianToken"), Some(json!(["saturn"])));
    }

    #[tokio::test]
    async fn test_account_fetch_error_is_surfaced() {
        let connection = Rc::new(
            MockConnection::new().fail("getCustodianAccounts", BackgroundError::Transport("offline".to_string())),
        );
        let actions = MmiActions::new(connection);
        let mut flow = CustodyFlow::default();
        let custodian = SelectedCustodian::from(&saturn(true));
        flow.select_custodian(custodian.clone());
        flow.jwt_list_loaded(vec!["jwt".to_string()]);

        flow.begin();
        let result = fetch_accounts(&actions, &custodian, &flow.current_jwt.clone(), TIMEOUT).await;
        flow.accounts_loaded(result);

        assert!(!flow.loading);
        assert_eq!(flow.error.as_deref(), Some("background request failed: offline"));
        assert!(flow.jwt_form_visible());
    }

    #[tokio::test]
    async fn test_select_and_connect_accounts() {
        let connection = Rc::new(
            MockConnection::new()
                .respond("getCustodianAccounts", json!([
                    { "name": "Treasury", "address": "0xaaa" },
                    { "name": "Ops", "address": "0xbbb" }
                ]))
                .respond("connectCustodyAddresses", json!(true)),
        );
        let actions = MmiActions::new(connection.clone());
        let mut flow = CustodyFlow::default();
        let custodian = SelectedCustodian::from(&saturn(true));
        flow.select_custodian(custodian.clone());
        flow.jwt_list_loaded(vec!["jwt".to_string()]);

        flow.accounts_loaded(fetch_accounts(&actions, &custodian, "jwt", TIMEOUT).await);
        assert_eq!(flow.step, CustodyStep::SelectAccounts);
        assert_eq!(
            connection.last_params("getCustodianAccounts"),
            Some(json!(["jwt", custodian.api_url, "Saturn", true]))
        );

        flow.toggle_account("0xbbb");
        let selected = flow.connected_accounts();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].token, "jwt");

        flow.connect_finished(connect_accounts(&actions, &custodian, &selected, TIMEOUT).await);
        assert_eq!(flow.step, CustodyStep::Connected { count: 1 });
        assert_eq!(connection.call_count("connectCustodyAddresses"), 1);
    }

    #[test]
    fn test_account_filter_and_cancel() {
        let mut flow = CustodyFlow::default();
        flow.accounts = vec![account("Treasury", "0xAAA"), account("Ops", "0xbbb")];
        flow.search_query = "aaa".to_string();
        assert_eq!(flow.filtered_accounts().len(), 1);
        flow.search_query = "OPS".to_string();
        assert_eq!(flow.filtered_accounts()[0].address, "0xbbb");

        flow.toggle_account("0xbbb");
        flow.toggle_account("0xbbb");
        assert!(flow.selected_accounts.is_empty());

        flow.cancel();
        assert_eq!(flow, CustodyFlow::default());
    }

    #[test]
    fn test_connect_request_resolves_configured_custodian() {
        let request = ConnectRequest {
            custodian: "saturn".to_string(),
            token: "token".to_string(),
            api_url: "url".to_string(),
            custodian_type: None,
            custodian_name: Some("saturn".to_string()),
        };
        let selected = SelectedCustodian::from_request(&request, &[saturn(true)]);
        assert_eq!(selected.display_name, "Saturn Custody");
        assert_eq!(selected.api_url, "url");

        let unknown = SelectedCustodian::from_request(&request, &[]);
        assert_eq!(unknown.custodian_type, "saturn");
    }
}
