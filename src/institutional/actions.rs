// src/institutional/actions.rs
//! Custody action creators backed by a background connection

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::rc::Rc;

use crate::institutional::background::{BackgroundConnection, BackgroundError, Dispatchable};
use crate::institutional::types::{ConnectRequest, ConnectedAccount, CustodianAccount};

fn decode<T: DeserializeOwned>(method: &'static str) -> impl FnOnce(Value) -> Result<T, BackgroundError> {
    move |value| {
        serde_json::from_value(value).map_err(|e| BackgroundError::Decode {
            method: method.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Factory for the custody actions the institutional pages dispatch
#[derive(Clone)]
pub struct MmiActions {
    connection: Rc<dyn BackgroundConnection>,
}

impl MmiActions {
    pub fn new(connection: Rc<dyn BackgroundConnection>) -> Self {
        Self { connection }
    }

    /// Pending connect request opened from a custodian, if any
    pub fn get_custodian_connect_request(&self) -> Dispatchable<Option<ConnectRequest>> {
        self.connection
            .submit_request("getCustodianConnectRequest", json!([]))
            .and_then(|value| {
                // The background answers with an empty object when nothing is pending
                let pending = value
                    .get("token")
                    .and_then(Value::as_str)
                    .map_or(false, |token| !token.is_empty());
                if !pending {
                    return Ok(None);
                }
                decode::<ConnectRequest>("getCustodianConnectRequest")(value).map(Some)
            })
    }

    pub fn get_custodian_token(&self, custodian_name: &str) -> Dispatchable<String> {
        self.connection
            .submit_request("getCustodianToken", json!([custodian_name]))
            .and_then(decode("getCustodianToken"))
    }

    pub fn get_custodian_accounts(
        &self,
        token: &str,
        api_url: &str,
        custody_type: &str,
        get_non_imported_accounts: bool,
    ) -> Dispatchable<Vec<CustodianAccount>> {
        self.connection
            .submit_request(
                "getCustodianAccounts",
                json!([token, api_url, custody_type, get_non_imported_accounts]),
            )
            .and_then(decode("getCustodianAccounts"))
    }

    pub fn get_custodian_accounts_by_address(
        &self,
        token: &str,
        api_url: &str,
        address: &str,
        custody_type: &str,
    ) -> Dispatchable<Vec<CustodianAccount>> {
        self.connection
            .submit_request(
                "getCustodianAccountsByAddress",
                json!([token, api_url, address, custody_type]),
            )
            .and_then(decode("getCustodianAccountsByAddress"))
    }

    /// Previously used tokens for a custodian, most recent first
    pub fn get_custodian_jwt_list(&self, custodian_name: &str) -> Dispatchable<Vec<String>> {
        self.connection
            .submit_request("getCustodianJWTList", json!([custodian_name]))
            .and_then(|value| {
                if value.is_null() {
                    return Ok(Vec::new());
                }
                decode("getCustodianJWTList")(value)
            })
    }

    pub fn connect_custody_addresses(
        &self,
        custody_type: &str,
        custodian_name: &str,
        accounts: &[ConnectedAccount],
    ) -> Dispatchable<()> {
        let accounts: serde_json::Map<String, Value> = accounts
            .iter()
            .filter_map(|account| {
                serde_json::to_value(account)
                    .ok()
                    .map(|value| (account.address.clone(), value))
            })
            .collect();
        self.connection
            .submit_request(
                "connectCustodyAddresses",
                json!([custody_type, custodian_name, accounts]),
            )
            .and_then(|_| Ok(()))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording background connection for tests

    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Answers each method with a canned value and counts calls
    #[derive(Default)]
    pub struct MockConnection {
        responses: RefCell<HashMap<String, Result<Value, BackgroundError>>>,
        calls: RefCell<Vec<(String, Value)>>,
        deferred: bool,
    }

    impl MockConnection {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer with in-flight futures instead of immediate values
        pub fn deferred() -> Self {
            Self { deferred: true, ..Self::default() }
        }

        pub fn respond(self, method: &str, value: Value) -> Self {
            self.responses.borrow_mut().insert(method.to_string(), Ok(value));
            self
        }

        pub fn fail(self, method: &str, error: BackgroundError) -> Self {
            self.responses.borrow_mut().insert(method.to_string(), Err(error));
            self
        }

        pub fn call_count(&self, method: &str) -> usize {
            self.calls.borrow().iter().filter(|(m, _)| m == method).count()
        }

        pub fn last_params(&self, method: &str) -> Option<Value> {
            self.calls
                .borrow()
                .iter()
                .rev()
                .find(|(m, _)| m == method)
                .map(|(_, params)| params.clone())
        }
    }

    impl BackgroundConnection for MockConnection {
        fn submit_request(&self, method: &str, params: Value) -> Dispatchable<Value> {
            self.calls.borrow_mut().push((method.to_string(), params));
            let response = self
                .responses
                .borrow()
                .get(method)
                .cloned()
                .unwrap_or(Ok(json!({ "type": "TYPE" })));
            match (response, self.deferred) {
                (Ok(value), false) => Dispatchable::Ready(value),
                (response, _) => Dispatchable::thunk(async move { response }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockConnection;
    use super::*;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_connect_request_empty_means_none() {
        let connection = Rc::new(MockConnection::new().respond("getCustodianConnectRequest", json!({})));
        let actions = MmiActions::new(connection);
        let request = actions
            .get_custodian_connect_request()
            .resolve("connect request", TIMEOUT)
            .await
            .unwrap();
        assert_eq!(request, None);
    }

    #[tokio::test]
    async fn test_connect_request_with_token() {
        let connection = Rc::new(MockConnection::deferred().respond(
            "getCustodianConnectRequest",
            json!({
                "type": "TYPE",
                "custodian": "saturn",
                "token": "token",
                "apiUrl": "url",
                "custodianName": "saturn"
            }),
        ));
        let actions = MmiActions::new(connection);
        let request = actions
            .get_custodian_connect_request()
            .resolve("connect request", TIMEOUT)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.token, "token");
        assert_eq!(request.api_url, "url");
    }

    #[tokio::test]
    async fn test_jwt_list_passes_custodian_name() {
        let connection = Rc::new(MockConnection::new().respond("getCustodianJWTList", json!(["jwt1", "jwt2"])));
        let actions = MmiActions::new(connection.clone());
        let list = actions
            .get_custodian_jwt_list("saturn")
            .resolve("jwt list", TIMEOUT)
            .await
            .unwrap();

        assert_eq!(list, vec!["jwt1".to_string(), "jwt2".to_string()]);
        assert_eq!(connection.call_count("getCustodianJWTList"), 1);
        assert_eq!(connection.last_params("getCustodianJWTList"), Some(json!(["saturn"])));
    }

    #[tokio::test]
    async fn test_malformed_accounts_are_decode_errors() {
        let connection = Rc::new(MockConnection::new().respond("getCustodianAccounts", json!({ "type": "TYPE" })));
        let actions = MmiActions::new(connection);
        let result = actions
            .get_custodian_accounts("jwt", "url", "Saturn", true)
            .resolve("accounts", TIMEOUT)
            .await;
        assert!(matches!(result, Err(BackgroundError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_connect_addresses_keys_by_address() {
        let connection = Rc::new(MockConnection::new());
        let actions = MmiActions::new(connection.clone());
        let account = ConnectedAccount::from_account(
            &CustodianAccount {
                name: "Treasury".to_string(),
                address: "0x0000000000000000000000000000000000000001".to_string(),
                custodian_details: None,
                labels: Vec::new(),
                chain_id: Some("0x1".to_string()),
            },
            "jwt",
            "url",
            "Saturn",
        );

        actions
            .connect_custody_addresses("Saturn", "saturn", &[account])
            .resolve("connect", TIMEOUT)
            .await
            .unwrap();

        let params = connection.last_params("connectCustodyAddresses").unwrap();
        assert_eq!(params[0], json!("Saturn"));
        assert_eq!(params[2]["0x0000000000000000000000000000000000000001"]["name"], json!("Treasury"));
    }
}
