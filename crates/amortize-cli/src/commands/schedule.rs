use clap::Args;
use serde_json::{json, Value};
use tracing::debug;

use amortize_core::amortization::{self, LoanRequest};
use amortize_core::currency::Currency;
use amortize_core::AmortizeError;

use crate::input;

/// Arguments for building an amortization schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long, alias = "amount")]
    pub principal: Option<String>,

    /// Annual interest rate in percent (5.5 = 5.5%)
    #[arg(long)]
    pub rate: Option<String>,

    /// Loan term in years
    #[arg(long, alias = "term")]
    pub years: Option<String>,

    /// Display currency (USD, EUR, GBP, CAD, AUD, JPY, INR)
    #[arg(long, default_value = "USD")]
    pub currency: String,
}

impl ScheduleArgs {
    fn has_flags(&self) -> bool {
        self.principal.is_some() || self.rate.is_some() || self.years.is_some()
    }
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let currency: Currency = args.currency.parse()?;

    let request: LoanRequest = if let Some(ref path) = args.input {
        debug!(path = %path, "reading loan request from file");
        input::file::read_input(path)?
    } else if args.has_flags() {
        debug!("reading loan request from flags");
        LoanRequest::new(
            args.principal
                .ok_or("--principal is required (or provide --input)")?,
            args.rate.ok_or("--rate is required (or provide --input)")?,
            args.years.ok_or("--years is required (or provide --input)")?,
        )
    } else if let Some(data) = input::stdin::read_stdin()? {
        debug!("reading loan request from stdin");
        serde_json::from_value(data)?
    } else {
        return Err("--principal, --rate and --years are required (or provide --input)".into());
    };

    let output = amortization::calculate_amortization(&request).map_err(advisory)?;

    let mut value = serde_json::to_value(&output)?;
    value["currency"] = json!({
        "code": currency.code(),
        "symbol": currency.symbol(),
    });
    Ok(value)
}

/// Lead with the end-user message, keep the precise reason alongside.
fn advisory(e: AmortizeError) -> Box<dyn std::error::Error> {
    match e {
        AmortizeError::Input(ie) => format!("{} ({})", ie.user_message(), ie).into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Collects formatted log lines for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn run_logged(args: ScheduleArgs) -> (Value, String) {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let value = tracing::subscriber::with_default(subscriber, || run_schedule(args)).unwrap();
        (value, logs.contents())
    }

    fn args(principal: &str, rate: &str, years: &str) -> ScheduleArgs {
        ScheduleArgs {
            input: None,
            principal: Some(principal.into()),
            rate: Some(rate.into()),
            years: Some(years.into()),
            currency: "EUR".into(),
        }
    }

    #[test]
    fn test_run_schedule_from_flags() {
        let value = run_schedule(args("10000", "5.5", "5")).unwrap();
        assert_eq!(value["result"]["monthly_payment"], "191.01");
        assert_eq!(value["result"]["periods"].as_array().unwrap().len(), 60);
        assert_eq!(value["currency"]["symbol"], "€");
    }

    #[test]
    fn test_run_schedule_invalid_input_message() {
        let err = run_schedule(args("-5000", "5.5", "5")).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Please enter valid positive numbers."));
    }

    #[test]
    fn test_run_schedule_missing_flag() {
        let mut a = args("10000", "5.5", "5");
        a.years = None;
        let err = run_schedule(a).unwrap_err();
        assert!(err.to_string().contains("--years"));
    }

    #[test]
    fn test_run_schedule_from_input_file_logs_source() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"principal": 10000, "annual_rate_percent": "5.5", "term_years": 5}"#)
            .unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let (value, logs) = run_logged(ScheduleArgs {
            input: Some(path.clone()),
            principal: None,
            rate: None,
            years: None,
            currency: "USD".into(),
        });
        assert_eq!(value["result"]["monthly_payment"], "191.01");
        assert!(logs.contains("reading loan request from file"));
        assert!(logs.contains(&path));
    }

    #[test]
    fn test_run_schedule_from_flags_logs_source() {
        let (_, logs) = run_logged(args("10000", "5.5", "5"));
        assert!(logs.contains("reading loan request from flags"));
    }
}
