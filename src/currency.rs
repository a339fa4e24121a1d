// src/currency.rs
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

const PYTH_LATEST_URL: &str = "https://hermes.pyth.network/v2/updates/price/latest";

/// Supported fiat currencies with their display information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub decimals: usize,
    pub pyth_id: Option<String>, // Pyth FX feed, None for the USD base
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error("rate request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("price API error: {0}")]
    Status(reqwest::StatusCode),
    #[error("no price feed for {0}")]
    UnknownFeed(String),
    #[error("malformed price for {0}")]
    MalformedPrice(String),
}

/// Pyth API response structures
#[derive(Debug, Deserialize)]
struct PythResponse {
    parsed: Vec<PythPriceItem>,
}

#[derive(Debug, Deserialize)]
struct PythPriceItem {
    id: String,
    price: PythPriceData,
}

#[derive(Debug, Deserialize)]
struct PythPriceData {
    price: String,
    expo: i32,
}

fn currency(code: &str, name: &str, symbol: &str, decimals: usize, pyth_id: Option<&str>) -> CurrencyInfo {
    CurrencyInfo {
        code: code.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        decimals,
        pyth_id: pyth_id.map(str::to_string),
    }
}

/// Get all supported fiat currencies
pub fn get_supported_currencies() -> Vec<CurrencyInfo> {
    vec![
        currency("USD", "US Dollar", "$", 2, None),
        currency("EUR", "Euro", "€", 2, Some("a995d00bb36a63cef7fd2c287dc105fc8f3d93779f062f09551b0af3e81ec30b")),
        currency("GBP", "British Pound", "£", 2, Some("84c2dde9633d93d1bcad84e7dc41c9d56578b7ec52fabedc1f335d673df0a7c1")),
        currency("CAD", "Canadian Dollar", "CA$", 2, Some("3112b03a41c910ed446852aacf67118cb1bec67b2cd0b9a214c58cc0eaa2ecca")),
        currency("AUD", "Australian Dollar", "A$", 2, Some("67a6f93030420c1c9e3fe37c1ab6b77966af82f995944a9fefce357a22854a80")),
        currency("JPY", "Japanese Yen", "¥", 0, Some("ef2c98c804ba503c6a707e38be4dfbb16683775f195b091252bf24693042fd52")),
        currency("CHF", "Swiss Franc", "CHF", 2, Some("0b1e3297e69f162877b577b0d6a47a0d63b2392bc8499e6540da4187a63e28f8")),
        currency("CNH", "Chinese Yuan", "CN¥", 2, Some("eef52e09c878ad41f6a81803e3640fe04dceea727de894edd4ea117e2e332e66")),
        currency("BRL", "Brazilian Real", "R$", 2, Some("d2db4dbf1aea74e0f666b0e8f73b9580d407f5e5cf931940b06dc633d7a95906")),
        currency("MXN", "Mexican Peso", "MX$", 2, Some("e13b1c1ffb32f34e1be9545583f01ef385fde7f42ee66049d30570dc866b77ca")),
    ]
}

pub fn find_currency(code: &str) -> Option<CurrencyInfo> {
    get_supported_currencies()
        .into_iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Pyth feed for a native currency priced in USD
fn native_usd_feed(ticker: &str) -> Option<&'static str> {
    match ticker.to_uppercase().as_str() {
        "ETH" => Some("ff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace"),
        "BNB" => Some("2f95862b045670cd22bee3114c39763a4a08beeb663b145d283c31d7d1101c4f"),
        "AVAX" => Some("93da3352f9f1d105fdfe4971cfa80e9dd777bfc5d0f683ebb6e1294b92137bb7"),
        _ => None,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format a decimal string for display in a fiat currency.
///
/// Known currency codes render with their symbol, digit grouping and
/// precision (`"1234.5"`, `"usd"` -> `"$1,234.50"`). Unknown codes, such as
/// a native currency ticker, and unparsable values are returned unchanged.
pub fn format_currency(value: &str, currency_code: &str) -> String {
    let Some(info) = find_currency(currency_code) else {
        return value.to_string();
    };
    let Ok(amount) = value.trim().parse::<f64>() else {
        return value.to_string();
    };

    let fixed = format!("{:.precision$}", amount.abs(), precision = info.decimals);
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };
    let mut number = group_thousands(whole);
    if let Some(fraction) = fraction {
        number.push('.');
        number.push_str(fraction);
    }

    // Rounding can turn tiny negatives into zero, which should not show a sign
    let is_negative = amount < 0.0 && number.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if is_negative { "-" } else { "" };
    // Alphabetic symbols (CHF) are separated from the number
    let separator = if info.symbol.chars().all(char::is_alphabetic) { " " } else { "" };

    format!("{}{}{}{}", sign, info.symbol, separator, number)
}

/// Scaled price for a Pyth feed item
fn scaled_price(item: &PythPriceItem) -> Result<f64, RateError> {
    let price = item
        .price
        .price
        .parse::<f64>()
        .map_err(|_| RateError::MalformedPrice(item.id.clone()))?;
    Ok(price * 10f64.powi(item.price.expo))
}

/// Units of `code` per one USD, given the raw FX feed rate
fn usd_to_fiat_rate(code: &str, feed_rate: f64) -> f64 {
    match code {
        // XXX/USD pairs quote USD per unit of the foreign currency
        "EUR" | "GBP" | "AUD" => 1.0 / feed_rate,
        // USD/XXX pairs quote the foreign currency per USD
        _ => feed_rate,
    }
}

/// Fetch the rate converting one unit of the native currency into
/// `currency_code`, e.g. ETH -> EUR
pub async fn fetch_conversion_rate(native_ticker: &str, currency_code: &str) -> Result<f64, RateError> {
    let native_feed = native_usd_feed(native_ticker)
        .ok_or_else(|| RateError::UnknownFeed(native_ticker.to_string()))?;
    let fiat = find_currency(currency_code)
        .ok_or_else(|| RateError::UnknownFeed(currency_code.to_string()))?;

    let mut params = vec![("ids[]", native_feed.to_string())];
    if let Some(fx_feed) = &fiat.pyth_id {
        params.push(("ids[]", fx_feed.clone()));
    }
    params.push(("parsed", "true".to_string()));

    let response = Client::new()
        .get(PYTH_LATEST_URL)
        .query(&params)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(RateError::Status(response.status()));
    }

    let body: PythResponse = response.json().await?;
    let prices: HashMap<String, f64> = body
        .parsed
        .iter()
        .map(|item| scaled_price(item).map(|price| (item.id.to_lowercase(), price)))
        .collect::<Result<_, _>>()?;

    let native_usd = *prices
        .get(native_feed)
        .ok_or_else(|| RateError::UnknownFeed(native_ticker.to_string()))?;

    let fiat_per_usd = match &fiat.pyth_id {
        None => 1.0,
        Some(fx_feed) => {
            let feed_rate = *prices
                .get(fx_feed.as_str())
                .ok_or_else(|| RateError::UnknownFeed(fiat.code.clone()))?;
            usd_to_fiat_rate(&fiat.code, feed_rate)
        }
    };

    let rate = native_usd * fiat_per_usd;
    log::info!("Conversion rate 1 {} = {:.4} {}", native_ticker, rate, fiat.code);
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_usd() {
        assert_eq!(format_currency("1234.5", "usd"), "$1,234.50");
        assert_eq!(format_currency("0", "USD"), "$0.00");
        assert_eq!(format_currency("1000000", "usd"), "$1,000,000.00");
    }

    #[test]
    fn test_format_currency_negative_and_rounding() {
        assert_eq!(format_currency("-12.5", "usd"), "-$12.50");
        assert_eq!(format_currency("-0.001", "usd"), "$0.00");
    }

    #[test]
    fn test_format_currency_precision_and_symbols() {
        assert_eq!(format_currency("1234.56", "jpy"), "¥1,235");
        assert_eq!(format_currency("99.9", "chf"), "CHF 99.90");
        assert_eq!(format_currency("5", "eur"), "€5.00");
    }

    #[test]
    fn test_format_currency_unknown_code_passthrough() {
        assert_eq!(format_currency("0.5", "ETH"), "0.5");
        assert_eq!(format_currency("abc", "usd"), "abc");
    }

    #[test]
    fn test_usd_to_fiat_rate_inversion() {
        assert!((usd_to_fiat_rate("EUR", 1.25) - 0.8).abs() < 1e-12);
        assert_eq!(usd_to_fiat_rate("JPY", 150.0), 150.0);
    }

    #[test]
    fn test_scaled_price() {
        let item = PythPriceItem {
            id: "feed".to_string(),
            price: PythPriceData { price: "325012345678".to_string(), expo: -8 },
        };
        assert!((scaled_price(&item).unwrap() - 3250.12345678).abs() < 1e-6);
    }
}
