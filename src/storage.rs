// src/storage.rs
use crate::store::MetamaskState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

const STATE_KEY: &str = "metamask_state";
const CURRENCY_KEY: &str = "selected_currency";

// Get the appropriate storage directory for the current platform
#[cfg(not(feature = "web"))]
fn get_storage_dir() -> String {
    #[cfg(target_os = "android")]
    {
        "/data/data/com.walletview/files".to_string()
    }
    #[cfg(not(target_os = "android"))]
    {
        let home_dir = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        format!("{home_dir}/.walletview")
    }
}

#[cfg(not(feature = "web"))]
fn get_file_path(key: &str) -> String {
    format!("{}/{}.json", get_storage_dir(), key)
}

#[cfg(feature = "web")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?
        .local_storage()
        .map_err(|_| StorageError::Unavailable("localStorage access denied".to_string()))?
        .ok_or_else(|| StorageError::Unavailable("no localStorage".to_string()))
}

fn write_item(key: &str, value: &str) -> Result<(), StorageError> {
    #[cfg(feature = "web")]
    {
        local_storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::Unavailable(format!("failed to write {key}")))
    }

    #[cfg(not(feature = "web"))]
    {
        std::fs::create_dir_all(get_storage_dir())?;
        let path = get_file_path(key);
        std::fs::write(&path, value)?;
        log::info!("Saved {} to {}", key, path);
        Ok(())
    }
}

fn read_item(key: &str) -> Result<Option<String>, StorageError> {
    #[cfg(feature = "web")]
    {
        local_storage()?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable(format!("failed to read {key}")))
    }

    #[cfg(not(feature = "web"))]
    {
        match std::fs::read_to_string(get_file_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

pub fn parse_state(data: &str) -> Result<MetamaskState, StorageError> {
    Ok(serde_json::from_str(data)?)
}

/// Persist the state snapshot
pub fn save_state_to_storage(state: &MetamaskState) -> Result<(), StorageError> {
    let serialized = serde_json::to_string_pretty(state)?;
    write_item(STATE_KEY, &serialized)
}

/// Load the state snapshot, falling back to defaults when missing or corrupt
pub fn load_state_from_storage() -> MetamaskState {
    match read_item(STATE_KEY).and_then(|data| data.map(|d| parse_state(&d)).transpose()) {
        Ok(Some(state)) => {
            log::info!("Loaded wallet state snapshot");
            state
        }
        Ok(None) => {
            log::info!("No stored wallet state, using defaults");
            MetamaskState::default()
        }
        Err(e) => {
            log::error!("Failed to load wallet state: {}", e);
            MetamaskState::default()
        }
    }
}

pub fn save_currency_to_storage(currency: &str) -> Result<(), StorageError> {
    write_item(CURRENCY_KEY, currency)
}

pub fn load_currency_from_storage() -> Option<String> {
    match read_item(CURRENCY_KEY) {
        Ok(value) => value.map(|v| v.trim().to_lowercase()).filter(|v| !v.is_empty()),
        Err(e) => {
            log::warn!("Failed to read saved currency: {}", e);
            None
        }
    }
}
