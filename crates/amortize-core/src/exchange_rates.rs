//! Latest-rates payloads from the exchange-rate HTTP API.
//!
//! Fetching is the caller's business; this module decodes a payload that
//! has already been retrieved and turns it into a sorted rate table.
//! Nothing here touches the amortization engine.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::AmortizeError;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::AmortizeResult;

const SUCCESS: &str = "success";

/// Body of a `latest/<BASE>` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRateSnapshot {
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_code: Option<String>,
    /// RFC 2822 timestamp, e.g. `Fri, 27 Mar 2020 00:00:01 +0000`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_last_update_utc: Option<String>,
    #[serde(default)]
    pub conversion_rates: BTreeMap<String, Rate>,
    #[serde(
        rename = "error-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_type: Option<String>,
}

impl ExchangeRateSnapshot {
    pub fn last_updated(&self) -> Option<DateTime<FixedOffset>> {
        self.time_last_update_utc
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc2822(s).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRow {
    pub currency: String,
    /// Units of `currency` per one unit of the base currency
    pub rate: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    pub base_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<FixedOffset>>,
    pub rates: Vec<RateRow>,
}

/// Decode a payload, rejecting API-level failures.
pub fn parse_snapshot(json: &str) -> AmortizeResult<ExchangeRateSnapshot> {
    let snapshot: ExchangeRateSnapshot = serde_json::from_str(json)?;

    if snapshot.result != SUCCESS {
        let reason = snapshot
            .error_type
            .clone()
            .unwrap_or_else(|| format!("result was '{}'", snapshot.result));
        return Err(AmortizeError::Upstream(reason));
    }

    if snapshot.base_code.is_none() {
        return Err(AmortizeError::InvalidInput {
            field: "base_code".into(),
            reason: "successful payload carries no base currency".into(),
        });
    }

    Ok(snapshot)
}

/// Rates sorted by currency code.
pub fn rate_table(snapshot: &ExchangeRateSnapshot) -> AmortizeResult<ComputationOutput<RateTable>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let base_code = snapshot
        .base_code
        .clone()
        .ok_or_else(|| AmortizeError::InvalidInput {
            field: "base_code".into(),
            reason: "payload carries no base currency".into(),
        })?;

    let last_updated = snapshot.last_updated();
    match (&snapshot.time_last_update_utc, last_updated) {
        (None, _) => warnings.push("Payload has no last-update timestamp.".into()),
        (Some(raw), None) => warnings.push(format!("Unparseable last-update timestamp '{raw}'.")),
        _ => {}
    }

    if snapshot.conversion_rates.is_empty() {
        warnings.push("Payload contains no conversion rates.".into());
    }

    let rates: Vec<RateRow> = snapshot
        .conversion_rates
        .iter()
        .map(|(currency, rate)| RateRow {
            currency: currency.clone(),
            rate: *rate,
        })
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "base_code": base_code,
        "rates_quoted_as": "units of currency per one unit of base"
    });

    Ok(with_metadata(
        "Exchange-rate snapshot",
        &assumptions,
        warnings,
        elapsed,
        RateTable {
            base_code,
            last_updated,
            rates,
        },
    ))
}

/// Rate for one currency code, case-insensitive.
pub fn rate_for(snapshot: &ExchangeRateSnapshot, code: &str) -> AmortizeResult<Rate> {
    let wanted = code.trim();
    snapshot
        .conversion_rates
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(wanted))
        .map(|(_, rate)| *rate)
        .ok_or_else(|| AmortizeError::InvalidInput {
            field: "currency".into(),
            reason: format!("no rate for '{wanted}' in snapshot"),
        })
}
