use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::{Money, Rate, Years};

pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Displayed amounts carry cents.
pub const MONEY_DP: u32 = 2;

/// Compounding factor `(1 + rate)^nper`. `None` when it leaves the decimal range.
pub fn compound_factor(rate: Rate, nper: u32) -> Option<Decimal> {
    (Decimal::ONE + rate).checked_powu(u64::from(nper))
}

/// Level payment that fully repays `principal` over `nper` periods at `rate`
/// per period:
///
/// `principal * rate * (1+rate)^nper / ((1+rate)^nper - 1)`
///
/// Returns `None` if any intermediate overflows or the denominator
/// collapses to zero (a rate too small to register at 28 decimal places).
pub fn annuity_payment(rate: Rate, nper: u32, principal: Money) -> Option<Money> {
    if nper == 0 {
        return None;
    }

    let factor = compound_factor(rate, nper)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return None;
    }

    let numerator = principal.checked_mul(rate)?.checked_mul(factor)?;
    numerator.checked_div(denominator)
}

/// Nominal annual percentage (5.5 = 5.5%) to a monthly periodic rate.
pub fn monthly_rate_from_annual_percent(annual_rate_percent: Decimal) -> Rate {
    annual_rate_percent / dec!(100) / MONTHS_PER_YEAR
}

/// Number of monthly payments in a term: `round(years * 12)`, midpoint away
/// from zero. `None` if the count does not fit a `u32`.
pub fn monthly_payment_count(term_years: Years) -> Option<u32> {
    term_years
        .checked_mul(MONTHS_PER_YEAR)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

/// Round to cents, midpoint away from zero, always carrying two decimal
/// places. Never yields negative zero.
pub fn round_money(value: Money) -> Money {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(MONEY_DP);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_annuity_payment_basic() {
        // 10,000 over 60 months at 5.5% nominal => ~191.01
        let rate = monthly_rate_from_annual_percent(dec!(5.5));
        let pmt = annuity_payment(rate, 60, dec!(10000)).unwrap();
        assert_eq!(round_money(pmt), dec!(191.01));
    }

    #[test]
    fn test_annuity_payment_single_period() {
        // One period: repay principal plus one period of interest
        let pmt = annuity_payment(dec!(0.10), 1, dec!(1000)).unwrap();
        assert_eq!(round_money(pmt), dec!(1100.00));
    }

    #[test]
    fn test_annuity_payment_zero_periods() {
        assert!(annuity_payment(dec!(0.01), 0, dec!(1000)).is_none());
    }

    #[test]
    fn test_annuity_payment_zero_rate_has_no_denominator() {
        assert!(annuity_payment(Decimal::ZERO, 12, dec!(1000)).is_none());
    }

    #[test]
    fn test_annuity_payment_overflow() {
        // (1 + 1000)^1200 is far outside the decimal range
        assert!(annuity_payment(dec!(1000), 1200, dec!(1000)).is_none());
    }

    #[test]
    fn test_monthly_rate_from_annual_percent() {
        assert_eq!(monthly_rate_from_annual_percent(dec!(12)), dec!(0.01));
    }

    #[test]
    fn test_monthly_payment_count_rounds_to_nearest() {
        assert_eq!(monthly_payment_count(dec!(5)), Some(60));
        assert_eq!(monthly_payment_count(dec!(2.5)), Some(30));
        // 1.04 years = 12.48 months => 12
        assert_eq!(monthly_payment_count(dec!(1.04)), Some(12));
        // 1.0417 years = 12.5004 months => 13
        assert_eq!(monthly_payment_count(dec!(1.0417)), Some(13));
        // exactly half a month rounds away from zero
        assert_eq!(monthly_payment_count(dec!(0.125)), Some(2));
        assert_eq!(monthly_payment_count(dec!(0.01)), Some(0));
    }

    #[test]
    fn test_round_money_midpoint_and_negative_zero() {
        assert_eq!(round_money(dec!(45.835)), dec!(45.84));
        assert_eq!(round_money(dec!(-45.835)), dec!(-45.84));
        let tiny = round_money(dec!(-0.0000001));
        assert!(tiny.is_zero());
        assert!(tiny.is_sign_positive());
        assert_eq!(tiny.to_string(), "0.00");
        assert_eq!(round_money(dec!(1100)).to_string(), "1100.00");
    }
}
