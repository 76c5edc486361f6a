//! Fixed-rate loan amortization.
//!
//! Raw loan fields (text as typed by a user, or numbers from JSON) are
//! validated into a [`ValidRequest`], from which [`compute_schedule`]
//! derives the level monthly payment and the month-by-month split of each
//! payment into interest and principal, with the outstanding balance after
//! every payment. Validation is the only fallible step; once a request is
//! valid the schedule always exists.

use std::str::FromStr;
use std::time::Instant;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::InputError;
use crate::time_value::{
    compound_factor, monthly_payment_count, monthly_rate_from_annual_percent, round_money,
    MONTHS_PER_YEAR,
};
use crate::types::{with_metadata, ComputationOutput, LoanField, Money, Rate, Years};
use crate::AmortizeResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on schedule length (1,000 years of monthly payments).
pub const MAX_PAYMENTS: u32 = 12_000;

/// Balance drift tolerated at the end of a schedule before a warning.
const FINAL_BALANCE_TOLERANCE: Money = dec!(0.01);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A raw, unparsed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldInput {
    Number(f64),
    Text(String),
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        FieldInput::Text(value.to_string())
    }
}

impl From<String> for FieldInput {
    fn from(value: String) -> Self {
        FieldInput::Text(value)
    }
}

impl From<f64> for FieldInput {
    fn from(value: f64) -> Self {
        FieldInput::Number(value)
    }
}

impl From<Decimal> for FieldInput {
    fn from(value: Decimal) -> Self {
        FieldInput::Text(value.to_string())
    }
}

/// Loan parameters as supplied, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    /// Amount borrowed
    pub principal: FieldInput,
    /// Nominal annual rate as a percentage (5.5 = 5.5%)
    pub annual_rate_percent: FieldInput,
    /// Loan duration in years
    pub term_years: FieldInput,
}

impl LoanRequest {
    pub fn new(
        principal: impl Into<FieldInput>,
        annual_rate_percent: impl Into<FieldInput>,
        term_years: impl Into<FieldInput>,
    ) -> Self {
        Self {
            principal: principal.into(),
            annual_rate_percent: annual_rate_percent.into(),
            term_years: term_years.into(),
        }
    }
}

/// A loan request proven computable. Only [`validate`] constructs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidRequest {
    principal: Money,
    annual_rate_percent: Decimal,
    term_years: Years,
    number_of_payments: u32,
    monthly_payment: Money,
}

impl ValidRequest {
    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_rate_percent(&self) -> Decimal {
        self.annual_rate_percent
    }

    pub fn term_years(&self) -> Years {
        self.term_years
    }

    /// `round(term_years * 12)`, midpoint away from zero.
    pub fn number_of_payments(&self) -> u32 {
        self.number_of_payments
    }

    pub fn monthly_rate(&self) -> Rate {
        monthly_rate_from_annual_percent(self.annual_rate_percent)
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One month of the schedule. Amounts are rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodEntry {
    /// Month number (1-indexed)
    pub month: u32,
    /// Interest charged on the opening balance
    pub interest_portion: Money,
    /// Principal repaid by this month's payment
    pub principal_portion: Money,
    /// Outstanding principal after the payment
    pub remaining_balance: Money,
}

/// Full amortization schedule for one loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    /// Level monthly payment, rounded to cents
    pub monthly_payment: Money,
    /// Schedule length in months
    pub number_of_payments: u32,
    /// Sum of monthly interest over the life of the loan
    pub total_interest: Money,
    /// Monthly payment times the number of payments
    pub total_paid: Money,
    /// Month-by-month breakdown in increasing month order
    pub periods: Vec<PeriodEntry>,
}

impl AmortizationSchedule {
    pub fn principal_portions(&self) -> Vec<Money> {
        self.periods.iter().map(|p| p.principal_portion).collect()
    }

    pub fn interest_portions(&self) -> Vec<Money> {
        self.periods.iter().map(|p| p.interest_portion).collect()
    }

    pub fn remaining_balances(&self) -> Vec<Money> {
        self.periods.iter().map(|p| p.remaining_balance).collect()
    }

    /// Balance after the last payment, zero for an empty schedule.
    pub fn final_balance(&self) -> Money {
        self.periods
            .last()
            .map(|p| p.remaining_balance)
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse and check the three loan fields.
///
/// Every field is parsed before any is range-checked, so a non-numeric
/// field is reported ahead of a non-positive one. Within each stage fields
/// are checked in the order principal, rate, term.
pub fn validate(request: &LoanRequest) -> Result<ValidRequest, InputError> {
    let result = validate_inner(request);
    if let Err(ref e) = result {
        warn!(field = %e.field(), error = %e, "loan request rejected");
    }
    result
}

/// Build the schedule for a validated request. Pure and total.
pub fn compute_schedule(request: &ValidRequest) -> AmortizationSchedule {
    let monthly_rate = request.monthly_rate();
    let payment = request.monthly_payment;
    let n = request.number_of_payments;

    let mut balance = request.principal;
    let mut total_interest = Decimal::ZERO;
    let mut periods = Vec::with_capacity(n as usize);

    for month in 1..=n {
        let interest = balance * monthly_rate;
        let principal_paid = payment - interest;
        balance -= principal_paid;
        total_interest += interest;

        periods.push(PeriodEntry {
            month,
            interest_portion: round_money(interest),
            principal_portion: round_money(principal_paid),
            remaining_balance: round_money(balance),
        });
    }

    debug!(
        principal = %request.principal,
        annual_rate_percent = %request.annual_rate_percent,
        payments = n,
        monthly_payment = %payment,
        final_balance = %balance,
        "amortization schedule computed"
    );

    AmortizationSchedule {
        monthly_payment: round_money(payment),
        number_of_payments: n,
        total_interest: round_money(total_interest),
        total_paid: round_money(payment * Decimal::from(n)),
        periods,
    }
}

/// Validate and compute in one step, wrapped in the standard envelope.
pub fn calculate_amortization(
    request: &LoanRequest,
) -> AmortizeResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let valid = validate(request)?;

    let months = valid.term_years * MONTHS_PER_YEAR;
    if !months.fract().is_zero() {
        warnings.push(format!(
            "Term of {} years is {} months; schedule uses {} monthly payments.",
            valid.term_years.normalize(),
            months.normalize(),
            valid.number_of_payments
        ));
    }

    let schedule = compute_schedule(&valid);

    if schedule.final_balance().abs() > FINAL_BALANCE_TOLERANCE {
        warnings.push(format!(
            "Final balance {} differs from zero by more than one cent.",
            schedule.final_balance()
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "principal": valid.principal.to_string(),
        "annual_rate_percent": valid.annual_rate_percent.to_string(),
        "term_years": valid.term_years.to_string(),
        "compounding": "monthly, nominal annual rate / 12",
        "payment_count": "round(term_years * 12), midpoint away from zero",
        "display_rounding": "2 dp per period; running balance carried unrounded"
    });

    Ok(with_metadata(
        "Fixed-rate annuity amortization (level monthly payment)",
        &assumptions,
        warnings,
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_inner(request: &LoanRequest) -> Result<ValidRequest, InputError> {
    let principal = parse_field(LoanField::Principal, &request.principal)?;
    let annual_rate_percent =
        parse_field(LoanField::AnnualRatePercent, &request.annual_rate_percent)?;
    let term_years = parse_field(LoanField::TermYears, &request.term_years)?;

    require_positive(LoanField::Principal, principal)?;
    require_positive(LoanField::AnnualRatePercent, annual_rate_percent)?;
    require_positive(LoanField::TermYears, term_years)?;

    let number_of_payments = match monthly_payment_count(term_years) {
        Some(0) => {
            return Err(out_of_range(
                LoanField::TermYears,
                "term must cover at least one monthly payment",
            ))
        }
        Some(n) if n <= MAX_PAYMENTS => n,
        _ => {
            return Err(out_of_range(
                LoanField::TermYears,
                &format!("term exceeds {MAX_PAYMENTS} monthly payments"),
            ))
        }
    };

    let monthly_payment = level_payment(principal, annual_rate_percent, number_of_payments)?;

    Ok(ValidRequest {
        principal,
        annual_rate_percent,
        term_years,
        number_of_payments,
        monthly_payment,
    })
}

/// Level payment, attributing any arithmetic failure to the field that
/// drives it.
fn level_payment(
    principal: Money,
    annual_rate_percent: Decimal,
    number_of_payments: u32,
) -> Result<Money, InputError> {
    let monthly_rate = monthly_rate_from_annual_percent(annual_rate_percent);

    let factor = compound_factor(monthly_rate, number_of_payments).ok_or_else(|| {
        out_of_range(
            LoanField::AnnualRatePercent,
            "compounding over the term exceeds the supported range",
        )
    })?;

    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(out_of_range(
            LoanField::AnnualRatePercent,
            "rate is too small to accrue interest",
        ));
    }

    let too_large = || out_of_range(LoanField::Principal, "amount exceeds the supported range");

    let payment = principal
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(too_large)?;

    // total_paid must also be representable
    payment
        .checked_mul(Decimal::from(number_of_payments))
        .ok_or_else(too_large)?;

    Ok(payment)
}

fn parse_field(field: LoanField, input: &FieldInput) -> Result<Decimal, InputError> {
    match input {
        FieldInput::Number(n) => {
            if !n.is_finite() {
                return Err(InputError::NotANumber {
                    field,
                    value: n.to_string(),
                });
            }
            Decimal::from_f64(*n).ok_or_else(|| unrepresentable(field, &n.to_string()))
        }
        FieldInput::Text(s) => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|_| {
                    // a real number that does not fit 96 bits / 28 dp
                    match trimmed.parse::<f64>() {
                        Ok(v) if v.is_finite() => unrepresentable(field, trimmed),
                        _ => InputError::NotANumber {
                            field,
                            value: s.clone(),
                        },
                    }
                })
        }
    }
}

fn unrepresentable(field: LoanField, value: &str) -> InputError {
    out_of_range(
        field,
        &format!("{value} is outside the supported decimal range"),
    )
}

fn require_positive(field: LoanField, value: Decimal) -> Result<(), InputError> {
    if value <= Decimal::ZERO {
        return Err(InputError::NonPositive { field, value });
    }
    Ok(())
}

fn out_of_range(field: LoanField, reason: &str) -> InputError {
    InputError::OutOfRange {
        field,
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_loan() -> LoanRequest {
        LoanRequest::new("10000", "5.5", "5")
    }

    fn schedule_for(request: &LoanRequest) -> AmortizationSchedule {
        compute_schedule(&validate(request).unwrap())
    }

    // -----------------------------------------------------------------------
    // 1. Validation
    // -----------------------------------------------------------------------

    #[test]
    fn test_validate_accepts_text_fields() {
        let valid = validate(&standard_loan()).unwrap();
        assert_eq!(valid.principal(), dec!(10000));
        assert_eq!(valid.annual_rate_percent(), dec!(5.5));
        assert_eq!(valid.term_years(), dec!(5));
        assert_eq!(valid.number_of_payments(), 60);
    }

    #[test]
    fn test_validate_accepts_numeric_fields() {
        let valid = validate(&LoanRequest::new(10000.0, 5.5, 5.0)).unwrap();
        assert_eq!(valid.principal(), dec!(10000));
        assert_eq!(valid.annual_rate_percent(), dec!(5.5));
        assert_eq!(valid.number_of_payments(), 60);
    }

    #[test]
    fn test_validate_trims_whitespace_and_accepts_scientific() {
        let valid = validate(&LoanRequest::new(" 1e4 ", "5.5\n", "\t5")).unwrap();
        assert_eq!(valid.principal(), dec!(10000));
    }

    #[test]
    fn test_validate_zero_principal() {
        let err = validate(&LoanRequest::new("0", "5.5", "5")).unwrap_err();
        assert!(matches!(
            err,
            InputError::NonPositive {
                field: LoanField::Principal,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_negative_principal() {
        let err = validate(&LoanRequest::new("-100", "5.5", "5")).unwrap_err();
        assert_eq!(
            err,
            InputError::NonPositive {
                field: LoanField::Principal,
                value: dec!(-100),
            }
        );
    }

    #[test]
    fn test_validate_non_numeric_rate() {
        let err = validate(&LoanRequest::new("10000", "abc", "5")).unwrap_err();
        assert_eq!(
            err,
            InputError::NotANumber {
                field: LoanField::AnnualRatePercent,
                value: "abc".into(),
            }
        );
    }

    #[test]
    fn test_validate_nan_term() {
        let numeric = validate(&LoanRequest::new(10000.0, 5.5, f64::NAN)).unwrap_err();
        assert!(matches!(
            numeric,
            InputError::NotANumber {
                field: LoanField::TermYears,
                ..
            }
        ));

        let text = validate(&LoanRequest::new("10000", "5.5", "NaN")).unwrap_err();
        assert_eq!(text.field(), LoanField::TermYears);
    }

    #[test]
    fn test_validate_infinite_and_empty_are_not_numbers() {
        let inf = validate(&LoanRequest::new(f64::INFINITY, 5.5, 5.0)).unwrap_err();
        assert!(matches!(inf, InputError::NotANumber { .. }));

        let empty = validate(&LoanRequest::new("", "5.5", "5")).unwrap_err();
        assert!(matches!(empty, InputError::NotANumber { .. }));
    }

    #[test]
    fn test_validate_unrepresentable_real_is_out_of_range() {
        let numeric = validate(&LoanRequest::new(1e300, 5.5, 5.0)).unwrap_err();
        assert!(matches!(
            numeric,
            InputError::OutOfRange {
                field: LoanField::Principal,
                ..
            }
        ));

        let text = validate(&LoanRequest::new("1e40", "5.5", "5")).unwrap_err();
        assert!(matches!(
            text,
            InputError::OutOfRange {
                field: LoanField::Principal,
                ..
            }
        ));

        // still a parse failure, not a range failure
        let word = validate(&LoanRequest::new("inf", "5.5", "5")).unwrap_err();
        assert!(matches!(word, InputError::NotANumber { .. }));
    }

    #[test]
    fn test_validate_parse_errors_reported_before_sign_errors() {
        // principal is negative, but the term does not parse at all
        let err = validate(&LoanRequest::new("-1", "5.5", "five")).unwrap_err();
        assert!(matches!(err, InputError::NotANumber { .. }));
        assert_eq!(err.field(), LoanField::TermYears);
    }

    #[test]
    fn test_validate_zero_rate_rejected() {
        let err = validate(&LoanRequest::new("10000", "0", "5")).unwrap_err();
        assert_eq!(err.field(), LoanField::AnnualRatePercent);
        assert!(matches!(err, InputError::NonPositive { .. }));
    }

    #[test]
    fn test_validate_term_shorter_than_half_a_month() {
        let err = validate(&LoanRequest::new("10000", "5.5", "0.01")).unwrap_err();
        assert!(matches!(
            err,
            InputError::OutOfRange {
                field: LoanField::TermYears,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_term_beyond_payment_cap() {
        let err = validate(&LoanRequest::new("10000", "5.5", "1001")).unwrap_err();
        assert_eq!(err.field(), LoanField::TermYears);
    }

    #[test]
    fn test_validate_rate_too_small_to_register() {
        let err = validate(&LoanRequest::new("10000", "1e-27", "5")).unwrap_err();
        assert!(matches!(
            err,
            InputError::OutOfRange {
                field: LoanField::AnnualRatePercent,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_compounding_overflow() {
        let err = validate(&LoanRequest::new("10000", "100000", "100")).unwrap_err();
        assert_eq!(err.field(), LoanField::AnnualRatePercent);
    }

    #[test]
    fn test_user_message_is_uniform() {
        let a = validate(&LoanRequest::new("x", "5.5", "5")).unwrap_err();
        let b = validate(&LoanRequest::new("-5", "5.5", "5")).unwrap_err();
        assert_eq!(a.user_message(), "Please enter valid positive numbers.");
        assert_eq!(a.user_message(), b.user_message());
    }

    // -----------------------------------------------------------------------
    // 2. Schedule
    // -----------------------------------------------------------------------

    #[test]
    fn test_standard_loan_first_and_last_month() {
        let s = schedule_for(&standard_loan());
        assert_eq!(s.monthly_payment, dec!(191.01));
        assert_eq!(s.periods.len(), 60);

        let first = &s.periods[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.interest_portion, dec!(45.83));
        assert_eq!(first.principal_portion, dec!(145.18));
        assert_eq!(first.remaining_balance, dec!(9854.82));

        let last = s.periods.last().unwrap();
        assert_eq!(last.month, 60);
        assert_eq!(last.remaining_balance, dec!(0.00));
    }

    #[test]
    fn test_schedule_totals() {
        let s = schedule_for(&standard_loan());
        // total paid = 60 * 191.0117... ~= 11460.70
        assert!((s.total_paid - dec!(11460.70)).abs() <= dec!(0.01));
        // interest is whatever is paid beyond the principal
        assert!((s.total_interest - (s.total_paid - dec!(10000))).abs() <= dec!(0.01));
    }

    #[test]
    fn test_parallel_sequences_line_up() {
        let s = schedule_for(&standard_loan());
        let principal = s.principal_portions();
        let interest = s.interest_portions();
        let balances = s.remaining_balances();
        assert_eq!(principal.len(), 60);
        assert_eq!(interest.len(), 60);
        assert_eq!(balances.len(), 60);
        assert_eq!(principal[0], dec!(145.18));
        assert_eq!(interest[0], dec!(45.83));
        assert_eq!(balances[0], dec!(9854.82));
    }

    #[test]
    fn test_interest_declines_principal_grows() {
        let s = schedule_for(&standard_loan());
        for pair in s.periods.windows(2) {
            assert!(pair[1].interest_portion <= pair[0].interest_portion);
            assert!(pair[1].principal_portion >= pair[0].principal_portion);
        }
    }

    #[test]
    fn test_tiny_principal_high_rate() {
        let s = schedule_for(&LoanRequest::new("1", "100", "1"));
        assert_eq!(s.periods.len(), 12);
        assert!(s.monthly_payment > Decimal::ZERO);
        assert!(s.final_balance().abs() <= dec!(0.01));
    }

    #[test]
    fn test_fractional_term_rounds_payment_count() {
        let s = schedule_for(&LoanRequest::new("5000", "7", "2.5"));
        assert_eq!(s.number_of_payments, 30);
        assert_eq!(s.periods.len(), 30);
    }

    #[test]
    fn test_calculate_amortization_envelope() {
        let out = calculate_amortization(&standard_loan()).unwrap();
        assert_eq!(out.result.monthly_payment, dec!(191.01));
        assert!(out.warnings.is_empty());
        assert_eq!(out.assumptions["term_years"], "5");
        assert!(out.methodology.contains("amortization"));
    }

    #[test]
    fn test_calculate_amortization_warns_on_fractional_months() {
        let out = calculate_amortization(&LoanRequest::new("5000", "7", "1.04")).unwrap();
        assert_eq!(out.result.number_of_payments, 12);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("12 monthly payments"));
    }

    #[test]
    fn test_calculate_amortization_invalid_input() {
        let err = calculate_amortization(&LoanRequest::new("-5000", "5.5", "5")).unwrap_err();
        assert!(matches!(
            err,
            crate::AmortizeError::Input(InputError::NonPositive { .. })
        ));
    }

    #[test]
    fn test_loan_request_json_accepts_strings_and_numbers() {
        let req: LoanRequest = serde_json::from_str(
            r#"{"principal": 10000, "annual_rate_percent": "5.5", "term_years": 5}"#,
        )
        .unwrap();
        assert_eq!(req.principal, FieldInput::Number(10000.0));
        assert_eq!(req.annual_rate_percent, FieldInput::Text("5.5".into()));
        assert_eq!(validate(&req).unwrap().number_of_payments(), 60);
    }
}
