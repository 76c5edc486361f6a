//! Display currencies. Selection changes the symbol shown next to amounts,
//! never the arithmetic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AmortizeError;
use crate::time_value::round_money;
use crate::types::Money;

/// Symbols by ISO 4217 code.
pub const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("CAD", "C$"),
    ("AUD", "A$"),
    ("JPY", "¥"),
    ("INR", "₹"),
];

/// Shown for any code missing from [`CURRENCY_SYMBOLS`].
pub const FALLBACK_SYMBOL: &str = "₹";

/// Currency code. Serialized as its ISO code string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    JPY,
    INR,
    Other(String),
}

impl Currency {
    pub fn code(&self) -> &str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::JPY => "JPY",
            Currency::INR => "INR",
            Currency::Other(code) => code,
        }
    }

    pub fn symbol(&self) -> &'static str {
        currency_symbol(self.code())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = AmortizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AmortizeError::InvalidInput {
                field: "currency".into(),
                reason: format!("'{s}' is not a three-letter currency code"),
            });
        }
        Ok(match code.as_str() {
            "USD" => Currency::USD,
            "EUR" => Currency::EUR,
            "GBP" => Currency::GBP,
            "CAD" => Currency::CAD,
            "AUD" => Currency::AUD,
            "JPY" => Currency::JPY,
            "INR" => Currency::INR,
            _ => Currency::Other(code),
        })
    }
}

impl TryFrom<String> for Currency {
    type Error = AmortizeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.code().to_string()
    }
}

/// Symbol for a currency code, case-insensitive.
pub fn currency_symbol(code: &str) -> &'static str {
    let code = code.trim();
    CURRENCY_SYMBOLS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, sym)| *sym)
        .unwrap_or(FALLBACK_SYMBOL)
}

/// Symbol followed by the amount in cents, e.g. `$191.01`.
pub fn format_money(currency: &Currency, amount: Money) -> String {
    let rounded = round_money(amount);
    if rounded.is_sign_negative() {
        format!("-{}{}", currency.symbol(), rounded.abs())
    } else {
        format!("{}{}", currency.symbol(), rounded)
    }
}
