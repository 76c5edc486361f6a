use clap::Args;
use serde_json::{json, Value};
use tracing::debug;

use amortize_core::exchange_rates;

use crate::input;

/// Arguments for tabulating an exchange-rate snapshot
#[derive(Args)]
pub struct RatesArgs {
    /// Path to a saved `latest` API response (otherwise read from stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Show a single currency's rate
    #[arg(long)]
    pub currency: Option<String>,
}

pub fn run_rates(args: RatesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payload = if let Some(ref path) = args.input {
        debug!(path = %path, "reading exchange-rate payload from file");
        input::file::read_text(path)?
    } else if let Some(text) = input::stdin::read_stdin_text()? {
        debug!(bytes = text.len(), "reading exchange-rate payload from stdin");
        text
    } else {
        return Err("--input is required (or pipe a payload on stdin)".into());
    };

    let snapshot = exchange_rates::parse_snapshot(&payload)?;

    if let Some(code) = args.currency {
        let rate = exchange_rates::rate_for(&snapshot, &code)?;
        return Ok(json!({
            "result": {
                "base_code": snapshot.base_code,
                "currency": code.trim().to_uppercase(),
                "rate": rate,
            }
        }));
    }

    let output = exchange_rates::rate_table(&snapshot)?;
    debug!(rates = output.result.rates.len(), "exchange-rate table built");
    Ok(serde_json::to_value(&output)?)
}
