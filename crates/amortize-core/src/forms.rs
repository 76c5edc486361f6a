//! Loan calculator form state.
//!
//! The presentation layer owns a [`LoanForm`] and hands it back and forth
//! through `calculate`, `edit` and `reset`; each returns a fresh value and
//! nothing is retained between calls.

use serde::{Deserialize, Serialize};

use crate::amortization::{compute_schedule, validate, AmortizationSchedule, LoanRequest};
use crate::currency::{format_money, Currency};
use crate::error::InputError;

/// Field values as typed, plus the display currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanFormState {
    pub loan_amount: String,
    pub interest_rate: String,
    pub loan_term: String,
    #[serde(default)]
    pub currency: Currency,
}

impl Default for LoanFormState {
    fn default() -> Self {
        Self {
            loan_amount: "10000".into(),
            interest_rate: "5.5".into(),
            loan_term: "5".into(),
            currency: Currency::USD,
        }
    }
}

impl LoanFormState {
    /// Empty text fields, USD.
    pub fn cleared() -> Self {
        Self {
            loan_amount: String::new(),
            interest_rate: String::new(),
            loan_term: String::new(),
            currency: Currency::USD,
        }
    }

    pub fn to_request(&self) -> LoanRequest {
        LoanRequest::new(
            self.loan_amount.as_str(),
            self.interest_rate.as_str(),
            self.loan_term.as_str(),
        )
    }
}

/// What the form currently displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormOutcome {
    #[default]
    Idle,
    Calculated {
        schedule: AmortizationSchedule,
    },
    Invalid {
        message: String,
        #[serde(skip)]
        error: InputError,
    },
}

/// Which field values a reset restores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    #[default]
    Defaults,
    Cleared,
}

/// A month of the schedule formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub month: u32,
    pub principal: String,
    pub interest: String,
    pub remaining_balance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoanForm {
    pub state: LoanFormState,
    pub outcome: FormOutcome,
}

impl LoanForm {
    pub fn new(state: LoanFormState) -> Self {
        Self {
            state,
            outcome: FormOutcome::Idle,
        }
    }

    /// Run the engine on the current fields. An invalid submission
    /// discards any previously displayed schedule.
    pub fn calculate(self) -> Self {
        let outcome = match validate(&self.state.to_request()) {
            Ok(valid) => FormOutcome::Calculated {
                schedule: compute_schedule(&valid),
            },
            Err(error) => FormOutcome::Invalid {
                message: error.user_message().to_string(),
                error,
            },
        };
        Self {
            state: self.state,
            outcome,
        }
    }

    /// Replace the field values. The displayed outcome stays until the
    /// next calculation.
    pub fn edit(self, state: LoanFormState) -> Self {
        Self {
            state,
            outcome: self.outcome,
        }
    }

    pub fn reset(self, policy: ResetPolicy) -> Self {
        let state = match policy {
            ResetPolicy::Defaults => LoanFormState::default(),
            ResetPolicy::Cleared => LoanFormState::cleared(),
        };
        Self::new(state)
    }

    pub fn schedule(&self) -> Option<&AmortizationSchedule> {
        match &self.outcome {
            FormOutcome::Calculated { schedule } => Some(schedule),
            _ => None,
        }
    }

    /// Monthly payment with the selected currency symbol.
    pub fn display_payment(&self) -> Option<String> {
        self.schedule()
            .map(|s| format_money(&self.state.currency, s.monthly_payment))
    }

    /// Schedule rows with the selected currency symbol; empty unless a
    /// schedule is displayed.
    pub fn display_rows(&self) -> Vec<DisplayRow> {
        let currency = &self.state.currency;
        self.schedule()
            .map(|s| {
                s.periods
                    .iter()
                    .map(|p| DisplayRow {
                        month: p.month,
                        principal: format_money(currency, p.principal_portion),
                        interest: format_money(currency, p.interest_portion),
                        remaining_balance: format_money(currency, p.remaining_balance),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
