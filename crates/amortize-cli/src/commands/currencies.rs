use clap::Args;
use serde_json::{json, Value};

use amortize_core::currency::{currency_symbol, CURRENCY_SYMBOLS, FALLBACK_SYMBOL};

/// Arguments for listing display currencies
#[derive(Args)]
pub struct CurrenciesArgs {
    /// Look up a single currency code
    #[arg(long)]
    pub code: Option<String>,
}

pub fn run_currencies(args: CurrenciesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(code) = args.code {
        let code = code.trim().to_uppercase();
        let known = CURRENCY_SYMBOLS.iter().any(|(c, _)| *c == code);
        return Ok(json!({
            "result": {
                "code": code,
                "symbol": currency_symbol(&code),
                "listed": known,
            }
        }));
    }

    let currencies: Vec<Value> = CURRENCY_SYMBOLS
        .iter()
        .map(|(code, symbol)| json!({ "code": code, "symbol": symbol }))
        .collect();

    Ok(json!({
        "result": {
            "fallback_symbol": FALLBACK_SYMBOL,
            "currencies": currencies,
        }
    }))
}
