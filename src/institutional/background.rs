// src/institutional/background.rs
//! Request channel to the background service.
//!
//! Background calls come back either as a value that is already available
//! or as a future still in flight. [`Dispatchable`] carries both shapes and
//! [`Dispatchable::resolve`] awaits them the same way.

use futures_util::future::{select, Either, LocalBoxFuture};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::Cell;
use std::future::Future;
use std::pin::pin;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackgroundError {
    #[error("background request failed: {0}")]
    Transport(String),
    #[error("background returned HTTP {0}")]
    Status(u16),
    #[error("background request `{0}` timed out")]
    Timeout(String),
    #[error("unexpected response for `{method}`: {reason}")]
    Decode { method: String, reason: String },
    #[error("{0}")]
    Remote(String),
}

impl From<reqwest::Error> for BackgroundError {
    fn from(e: reqwest::Error) -> Self {
        BackgroundError::Transport(e.to_string())
    }
}

/// The result of a background action creator
pub enum Dispatchable<T> {
    /// Value available immediately
    Ready(T),
    /// Request still in flight
    Thunk(LocalBoxFuture<'static, Result<T, BackgroundError>>),
}

impl<T: 'static> Dispatchable<T> {
    pub fn thunk<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, BackgroundError>> + 'static,
    {
        Dispatchable::Thunk(Box::pin(future))
    }

    pub fn failed(error: BackgroundError) -> Self {
        Self::thunk(async move { Err(error) })
    }

    /// Transform the eventual value, keeping the shape where possible
    pub fn and_then<U: 'static, F>(self, f: F) -> Dispatchable<U>
    where
        F: FnOnce(T) -> Result<U, BackgroundError> + 'static,
    {
        match self {
            Dispatchable::Ready(value) => match f(value) {
                Ok(mapped) => Dispatchable::Ready(mapped),
                Err(e) => Dispatchable::failed(e),
            },
            Dispatchable::Thunk(future) => Dispatchable::thunk(async move { f(future.await?) }),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Dispatchable::Ready(_))
    }

    /// Await the value, bounding in-flight requests by `timeout`
    pub async fn resolve(self, label: &str, timeout: Duration) -> Result<T, BackgroundError> {
        match self {
            Dispatchable::Ready(value) => Ok(value),
            Dispatchable::Thunk(future) => {
                #[cfg(not(target_arch = "wasm32"))]
                let timer = tokio::time::sleep(timeout);
                #[cfg(target_arch = "wasm32")]
                let timer = gloo_timers::future::sleep(timeout);
                race_timeout(future, timer, label).await
            }
        }
    }
}

/// Resolve `future` unless `timer` fires first
async fn race_timeout<T, F, S>(future: F, timer: S, label: &str) -> Result<T, BackgroundError>
where
    F: Future<Output = Result<T, BackgroundError>>,
    S: Future<Output = ()>,
{
    match select(pin!(future), pin!(timer)).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => {
            log::warn!("Background request `{}` timed out", label);
            Err(BackgroundError::Timeout(label.to_string()))
        }
    }
}

/// A channel that can submit requests to the background service
pub trait BackgroundConnection {
    fn submit_request(&self, method: &str, params: Value) -> Dispatchable<Value>;
}

#[derive(Debug, Serialize)]
struct BackgroundRequest<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct BackgroundResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<BackgroundResponseError>,
}

#[derive(Debug, Deserialize)]
struct BackgroundResponseError {
    message: String,
}

fn unwrap_response(response: BackgroundResponse) -> Result<Value, BackgroundError> {
    match (response.result, response.error) {
        (_, Some(error)) => Err(BackgroundError::Remote(error.message)),
        (Some(result), None) => Ok(result),
        (None, None) => Ok(Value::Null),
    }
}

/// Background connection over HTTP, one JSON request per call
pub struct HttpBackgroundConnection {
    client: Client,
    url: String,
    next_id: Cell<u64>,
}

impl HttpBackgroundConnection {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            next_id: Cell::new(1),
        }
    }
}

impl BackgroundConnection for HttpBackgroundConnection {
    fn submit_request(&self, method: &str, params: Value) -> Dispatchable<Value> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let client = self.client.clone();
        let url = self.url.clone();
        let method = method.to_string();

        Dispatchable::thunk(async move {
            log::info!("Submitting background request {} ({})", method, id);
            let response = client
                .post(&url)
                .json(&BackgroundRequest { id, method: &method, params })
                .send()
                .await?;

            if !response.status().is_success() {
                log::error!("Background request {} failed with {}", method, response.status());
                return Err(BackgroundError::Status(response.status().as_u16()));
            }

            let body: BackgroundResponse = response.json().await.map_err(|e| BackgroundError::Decode {
                method: method.clone(),
                reason: e.to_string(),
            })?;
            unwrap_response(body)
        })
    }
}
