// src/i18n.rs
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Help article for adding custom tokens
pub const ADD_CUSTOM_TOKENS_URL: &str =
    "https://support.metamask.io/hc/en-us/articles/360015489031";

#[derive(Debug, Deserialize)]
struct LocaleMessage {
    message: String,
}

static EN_JSON: &str = include_str!("../assets/locales/en.json");

static EN_MESSAGES: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
    match serde_json::from_str::<HashMap<String, LocaleMessage>>(EN_JSON) {
        Ok(messages) => messages
            .into_iter()
            .map(|(key, value)| (key, value.message))
            .collect(),
        Err(e) => {
            log::error!("Failed to parse locale messages: {}", e);
            HashMap::new()
        }
    }
});

/// Look up a localized message; unknown keys render as the key itself
pub fn t(key: &str) -> String {
    EN_MESSAGES
        .get(key)
        .cloned()
        .unwrap_or_else(|| {
            log::warn!("Missing translation for key: {}", key);
            key.to_string()
        })
}

/// Localized message with `$1`, `$2`, ... substitutions
pub fn t_with(key: &str, substitutions: &[&str]) -> String {
    substitutions
        .iter()
        .enumerate()
        .fold(t(key), |message, (index, value)| {
            message.replace(&format!("${}", index + 1), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_key() {
        assert_eq!(t("learnMoreUpperCase"), "Learn more");
    }

    #[test]
    fn test_unknown_key_falls_back() {
        assert_eq!(t("definitelyNotAKey"), "definitelyNotAKey");
    }

    #[test]
    fn test_substitution() {
        assert_eq!(t_with("newTokensDetected", &["3"]), "3 new tokens found in this account");
        assert_eq!(t_with("tokenDecimalLabel", &["6"]), "Decimals: 6");
        assert_eq!(t_with("chainIdLabel", &["0x1"]), "Chain: 0x1");
    }
}
