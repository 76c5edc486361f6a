use std::str::FromStr;

use amortize_core::currency::{format_money, Currency};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, row_array};

/// Fields rendered with the currency symbol when one is in the envelope.
const MONEY_FIELDS: &[&str] = &[
    "monthly_payment",
    "total_interest",
    "total_paid",
    "interest_portion",
    "principal_portion",
    "remaining_balance",
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    for block in render_tables(value) {
        println!("{}", block);
    }
}

fn render_tables(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => render_result(result, map),
            None => vec![render_pairs(map, None)],
        },
        Value::Array(arr) => vec![render_rows(arr, None)],
        _ => vec![value.to_string()],
    }
}

fn render_result(result: &Value, envelope: &Map<String, Value>) -> Vec<String> {
    let currency = envelope_currency(envelope);
    let mut blocks = Vec::new();

    match result {
        Value::Object(res_map) => {
            let scalars: Map<String, Value> = res_map
                .iter()
                .filter(|(_, v)| !v.is_array())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            if !scalars.is_empty() {
                blocks.push(render_pairs(&scalars, currency.as_ref()));
            }
            if let Some((_, rows)) = row_array(result) {
                blocks.push(render_rows(rows, currency.as_ref()));
            }
        }
        Value::Array(arr) => blocks.push(render_rows(arr, currency.as_ref())),
        other => blocks.push(format_scalar(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            let mut text = String::from("Warnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    text.push_str(&format!("\n  - {}", s));
                }
            }
            blocks.push(text);
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        blocks.push(format!("Methodology: {}", meth));
    }

    blocks
}

fn render_pairs(map: &Map<String, Value>, currency: Option<&Currency>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), cell(key, val, currency)]);
    }
    Table::from(builder).to_string()
}

fn render_rows(arr: &[Value], currency: Option<&Currency>) -> String {
    if arr.is_empty() {
        return "(empty)".to_string();
    }

    let Some(Value::Object(first)) = arr.first() else {
        let items: Vec<String> = arr.iter().map(format_scalar).collect();
        return items.join("\n");
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| {
                    map.get(h.as_str())
                        .map(|v| cell(h, v, currency))
                        .unwrap_or_default()
                })
                .collect();
            builder.push_record(row);
        }
    }

    Table::from(builder).to_string()
}

fn cell(key: &str, value: &Value, currency: Option<&Currency>) -> String {
    if let (Some(currency), Value::String(s)) = (currency, value) {
        if MONEY_FIELDS.contains(&key) {
            if let Ok(amount) = Decimal::from_str(s) {
                return format_money(currency, amount);
            }
        }
    }
    match value {
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        other => format_scalar(other),
    }
}

fn envelope_currency(envelope: &Map<String, Value>) -> Option<Currency> {
    envelope
        .get("currency")
        .and_then(|c| c.get("code"))
        .and_then(Value::as_str)
        .and_then(|code| Currency::from_str(code).ok())
}
