use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use amortize_core::amortization::{self, LoanRequest};
use amortize_core::forms::{LoanForm, LoanFormState, ResetPolicy};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_amortization(input_json: String) -> NapiResult<String> {
    let input: LoanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::calculate_amortization(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Serialize)]
struct ValidationReport {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// Validation outcome as data rather than a thrown error, so a form can
/// show the advisory inline.
#[napi]
pub fn validate_loan(input_json: String) -> NapiResult<String> {
    let input: LoanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let report = match amortization::validate(&input) {
        Ok(_) => ValidationReport {
            valid: true,
            message: None,
            detail: None,
        },
        Err(e) => ValidationReport {
            valid: false,
            message: Some(e.user_message()),
            detail: Some(e.to_string()),
        },
    };
    serde_json::to_string(&report).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// Calculate from the current form fields; returns the whole form.
#[napi]
pub fn calculate_form(state_json: String) -> NapiResult<String> {
    let state: LoanFormState = serde_json::from_str(&state_json).map_err(to_napi_error)?;
    let form = LoanForm::new(state).calculate();
    serde_json::to_string(&form).map_err(to_napi_error)
}

/// Fresh form after a reset. `policy` is `"defaults"` or `"cleared"`.
#[napi]
pub fn reset_form(policy: Option<String>) -> NapiResult<String> {
    let policy: ResetPolicy = match policy {
        Some(p) => serde_json::from_value(serde_json::Value::String(p)).map_err(to_napi_error)?,
        None => ResetPolicy::default(),
    };
    let form = LoanForm::default().reset(policy);
    serde_json::to_string(&form).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

#[napi]
pub fn currency_symbol(code: String) -> String {
    amortize_core::currency::currency_symbol(&code).to_string()
}

// ---------------------------------------------------------------------------
// Exchange rates
// ---------------------------------------------------------------------------

#[napi]
pub fn exchange_rate_table(payload_json: String) -> NapiResult<String> {
    let snapshot =
        amortize_core::exchange_rates::parse_snapshot(&payload_json).map_err(to_napi_error)?;
    let output = amortize_core::exchange_rates::rate_table(&snapshot).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
