// src/currency_display.rs
use dioxus::prelude::*;

use crate::conversion::get_value_from_wei_hex;
use crate::currency::format_currency;
use crate::store::{
    get_conversion_rate, get_current_currency, get_native_currency, get_should_show_fiat, MetamaskState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyKind {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyDisplayOptions {
    pub number_of_decimals: usize,
    pub currency: String,
}

/// Decimal overrides for `user_preferenced_currency`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferencedCurrencyOptions {
    pub number_of_decimals: Option<usize>,
    pub native_number_of_decimals: Option<usize>,
    pub fiat_number_of_decimals: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyDisplayProperties {
    pub prefix: Option<String>,
    pub value: Option<String>,
    pub suffix: Option<String>,
}

/// Currency and precision to show for the primary or secondary slot
pub fn user_preferenced_currency(
    state: &MetamaskState,
    kind: CurrencyKind,
    opts: PreferencedCurrencyOptions,
) -> CurrencyDisplayOptions {
    let native = CurrencyDisplayOptions {
        currency: get_native_currency(state),
        number_of_decimals: opts
            .number_of_decimals
            .or(opts.native_number_of_decimals)
            .unwrap_or(8),
    };
    if !get_should_show_fiat(state) {
        return native;
    }

    let native_first = state.preferences.use_native_currency_as_primary_currency;
    match (native_first, kind) {
        (true, CurrencyKind::Primary) | (false, CurrencyKind::Secondary) => native,
        _ => CurrencyDisplayOptions {
            currency: get_current_currency(state),
            number_of_decimals: opts
                .number_of_decimals
                .or(opts.fiat_number_of_decimals)
                .unwrap_or(2),
        },
    }
}

/// Render a hex wei balance in the requested currency.
///
/// Returns the full display string and its parts. The value is `None` when
/// a fiat currency is requested before a conversion rate is known.
pub fn currency_display(
    state: &MetamaskState,
    input_value: Option<&str>,
    opts: &CurrencyDisplayOptions,
) -> (String, CurrencyDisplayProperties) {
    let native_currency = get_native_currency(state);
    let current_currency = get_current_currency(state);
    let conversion_rate = get_conversion_rate(state);
    let is_user_preferred_currency = opts.currency.eq_ignore_ascii_case(&current_currency);
    let decimals = if opts.number_of_decimals == 0 { 2 } else { opts.number_of_decimals };

    let value = if opts.currency.eq_ignore_ascii_case(&native_currency) {
        Some(get_value_from_wei_hex(
            input_value,
            &native_currency,
            &native_currency,
            conversion_rate,
            decimals,
        ))
    } else if is_user_preferred_currency && conversion_rate > 0.0 {
        let converted = get_value_from_wei_hex(
            input_value,
            &native_currency,
            &opts.currency,
            conversion_rate,
            decimals,
        );
        Some(format_currency(&converted, &opts.currency))
    } else {
        None
    };

    let suffix = Some(opts.currency.to_uppercase()).filter(|s| !s.is_empty());
    let display = format!(
        "{}{}",
        value.clone().unwrap_or_default(),
        suffix.as_ref().map(|s| format!(" {}", s)).unwrap_or_default()
    );

    (
        display,
        CurrencyDisplayProperties {
            prefix: None,
            value,
            suffix,
        },
    )
}

/// Memoized `currency_display` over the store
pub fn use_currency_display(
    store: Signal<MetamaskState>,
    input_value: Memo<Option<String>>,
    opts: Memo<CurrencyDisplayOptions>,
) -> Memo<(String, CurrencyDisplayProperties)> {
    use_memo(move || currency_display(&store.read(), input_value.read().as_deref(), &opts.read()))
}

pub fn use_user_preferenced_currency(
    store: Signal<MetamaskState>,
    kind: CurrencyKind,
    opts: PreferencedCurrencyOptions,
) -> Memo<CurrencyDisplayOptions> {
    use_memo(move || user_preferenced_currency(&store.read(), kind, opts))
}
