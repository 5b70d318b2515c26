use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::consortium::params::{DropdownEvent, LoanParameters, RecalculationStrategy};
use crate::consortium::validation::{validate, ValidatedLoan};
use crate::error::ConstructaError;
use crate::types::{Money, Rate, ScheduleEntry};
use crate::ConstructaResult;

/// A generated schedule plus facts noticed while running it.
#[derive(Debug, Clone)]
pub(crate) struct ScheduleRun {
    pub entries: Vec<ScheduleEntry>,
    /// Month at which the payment floor forced early settlement
    pub floor_settled_at: Option<u32>,
}

/// Baseline schedule for a bare contract.
///
/// Linear amortization: quota = principal / term, fee = balance * fee / 12,
/// balance corrected by `correction_index_annual` at months 13, 25, ...
pub fn generate(
    principal: Money,
    term_months: u32,
    fee_rate_annual: Rate,
    correction_index_annual: Rate,
) -> ConstructaResult<Vec<ScheduleEntry>> {
    let params = LoanParameters::new(
        principal,
        term_months,
        fee_rate_annual,
        correction_index_annual,
    );
    generate_schedule(&params)
}

/// Baseline schedule for a contract, with lances netted from the principal.
pub fn generate_schedule(params: &LoanParameters) -> ConstructaResult<Vec<ScheduleEntry>> {
    let loan = validate(params, &[])?;
    Ok(run_schedule(&loan, RecalculationStrategy::PreserveTerm)?.entries)
}

/// Step through the contract month by month, landing `loan.events` as they
/// come due. Events must already be sorted by month.
pub(crate) fn run_schedule(
    loan: &ValidatedLoan,
    strategy: RecalculationStrategy,
) -> ConstructaResult<ScheduleRun> {
    let params = &loan.params;
    let term = params.term_months;
    let correction_factor = checked(
        Decimal::ONE.checked_add(params.correction_index),
        "correction factor",
        1,
    )?;

    let mut balance = loan.financed_principal;
    let mut quota = balance / Decimal::from(term);
    let mut cumulative_paid = Decimal::ZERO;
    let mut events = loan.events.iter().peekable();
    let mut entries = Vec::with_capacity(term as usize);
    let mut floor_settled_at = None;

    log::debug!(
        "generating schedule: financed {} over {} months, quota {}",
        balance,
        term,
        quota
    );

    for month in 1..=term {
        if balance.is_zero() {
            break;
        }

        // Correction lands at the start of each contract year after the first,
        // before that month's fee and amortization.
        let mut correction = Decimal::ZERO;
        if month > 1 && (month - 1) % 12 == 0 && !params.correction_index.is_zero() {
            correction = checked(
                balance.checked_mul(params.correction_index),
                "monetary correction",
                month,
            )?;
            balance = checked(balance.checked_add(correction), "corrected balance", month)?;
            quota = checked(quota.checked_mul(correction_factor), "corrected quota", month)?;
        }

        let opening_balance = balance;
        let finance_charge = checked(
            opening_balance.checked_mul(loan.monthly_fee_rate),
            "administration fee",
            month,
        )?;
        let mut amortization = if month == term {
            balance
        } else {
            quota.min(balance)
        };
        let mut payment = checked(amortization.checked_add(finance_charge), "payment", month)?;

        if payment < params.min_payment && amortization < balance {
            amortization = balance;
            payment = checked(amortization.checked_add(finance_charge), "payment", month)?;
            floor_settled_at = Some(month);
            log::warn!(
                "installment fell below the {} floor at month {}, settling {}",
                params.min_payment,
                month,
                balance
            );
        }

        balance -= amortization;
        if balance < Decimal::ZERO {
            balance = Decimal::ZERO;
        }

        let mut dropdown_reduction = Decimal::ZERO;
        let mut dropdown_paid = Decimal::ZERO;
        if let Some(event) = events.next_if(|e| e.month == month) {
            dropdown_reduction = land_dropdown(event, balance)?;
            dropdown_paid = event.amount;
            balance -= dropdown_reduction;

            let remaining = term - month;
            if strategy == RecalculationStrategy::PreserveTerm && remaining > 0 {
                quota = balance / Decimal::from(remaining);
            }
            log::debug!(
                "dropdown at month {}: balance reduced by {}, quota now {}",
                month,
                dropdown_reduction,
                quota
            );
        }

        cumulative_paid = checked(
            cumulative_paid.checked_add(payment),
            "cumulative paid",
            month,
        )?;
        entries.push(ScheduleEntry {
            month,
            due_date: due_date(params.start_date, month),
            opening_balance,
            correction,
            amortization,
            finance_charge,
            payment,
            dropdown_paid,
            dropdown_reduction,
            closing_balance: balance,
            cumulative_paid,
        });
    }

    // Events past the last generated month found nothing left to prepay.
    if let Some(event) = events.next() {
        return Err(ConstructaError::DropdownExceedsBalance {
            month: event.month,
            amount: event.amount,
            balance: Decimal::ZERO,
        });
    }

    Ok(ScheduleRun {
        entries,
        floor_settled_at,
    })
}

/// Reduction a dropdown makes against the post-payment balance.
fn land_dropdown(event: &DropdownEvent, balance: Money) -> ConstructaResult<Money> {
    if event.amount > balance {
        return Err(ConstructaError::DropdownExceedsBalance {
            month: event.month,
            amount: event.amount,
            balance,
        });
    }
    let uplift = checked(
        (event.agio_percent / dec!(100)).checked_add(Decimal::ONE),
        "dropdown agio",
        event.month,
    )?;
    let effective = checked(event.amount.checked_mul(uplift), "dropdown agio", event.month)?;
    Ok(effective.min(balance))
}

fn checked(value: Option<Decimal>, context: &str, month: u32) -> ConstructaResult<Decimal> {
    value.ok_or_else(|| ConstructaError::NumericOverflow {
        context: format!("{context} at month {month}"),
    })
}

fn due_date(start: Option<NaiveDate>, month: u32) -> Option<NaiveDate> {
    start.and_then(|d| d.checked_add_months(Months::new(month - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_month_known_answer() {
        let schedule = generate(dec!(1000000), 60, dec!(0.12), Decimal::ZERO).unwrap();
        let first = &schedule[0];

        assert_eq!(schedule.len(), 60);
        assert_eq!(first.amortization.round_dp(2), dec!(16666.67));
        // Fee: 1,000,000 * 0.12 / 12 = 10,000
        assert_eq!(first.finance_charge, dec!(10000));
        assert_eq!(first.payment.round_dp(2), dec!(26666.67));
        assert_eq!(first.closing_balance.round_dp(2), dec!(983333.33));
    }

    #[test]
    fn test_fee_follows_declining_balance() {
        let schedule = generate(dec!(1200), 12, dec!(0.12), Decimal::ZERO);
        // Tiny contract: the floor settles it in month 1
        let schedule = schedule.unwrap();
        assert_eq!(schedule.len(), 1);

        let mut params = LoanParameters::new(dec!(1200), 12, dec!(0.12), Decimal::ZERO);
        params.min_payment = Decimal::ZERO;
        let schedule = generate_schedule(&params).unwrap();
        assert_eq!(schedule[0].finance_charge, dec!(12));
        assert_eq!(schedule[1].finance_charge, dec!(11));
        assert_eq!(schedule[11].finance_charge, dec!(1));
    }

    #[test]
    fn test_last_month_settles_residual() {
        let schedule = generate(dec!(1000000), 60, dec!(0.12), Decimal::ZERO).unwrap();
        let last = schedule.last().unwrap();
        assert_eq!(last.closing_balance, Decimal::ZERO);
        let total: Decimal = schedule.iter().map(|e| e.amortization).sum();
        assert!((total - dec!(1000000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_correction_applied_at_start_of_second_year() {
        let schedule = generate(dec!(1200000), 24, Decimal::ZERO, dec!(0.10)).unwrap();
        assert!(schedule[11].correction.is_zero());

        // Balance after 12 months is 600,000; corrected by 10% in month 13
        let m13 = &schedule[12];
        assert_eq!(m13.correction, dec!(60000));
        assert_eq!(m13.opening_balance, dec!(660000));
        assert_eq!(m13.amortization, dec!(55000));
        assert_eq!(schedule.last().unwrap().closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_lance_reduces_financed_principal() {
        let params =
            LoanParameters::new(dec!(1000000), 50, dec!(0.12), Decimal::ZERO).with_bid(dec!(0.20));
        let schedule = generate_schedule(&params).unwrap();
        assert_eq!(schedule[0].opening_balance, dec!(800000));
        assert_eq!(schedule[0].amortization, dec!(16000));
    }

    #[test]
    fn test_due_dates_follow_start_date() {
        let mut params = LoanParameters::new(dec!(120000), 12, dec!(0.12), Decimal::ZERO);
        params.start_date = NaiveDate::from_ymd_opt(2024, 1, 31);
        let schedule = generate_schedule(&params).unwrap();
        assert_eq!(schedule[0].due_date, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(schedule[1].due_date, NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate(dec!(750000), 120, dec!(0.15), dec!(0.045)).unwrap();
        let b = generate(dec!(750000), 120, dec!(0.15), dec!(0.045)).unwrap();
        pretty_assertions::assert_eq!(a, b);
    }

    #[test]
    fn test_runaway_correction_reports_overflow() {
        let err = generate(dec!(1000000), 240, dec!(0.12), dec!(100)).unwrap_err();
        assert!(matches!(err, ConstructaError::NumericOverflow { .. }));
    }

    #[test]
    fn test_oversized_fee_reports_overflow() {
        let principal = Decimal::from_i128_with_scale(10_i128.pow(24), 0);
        let err = generate(principal, 60, dec!(1000000000), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, ConstructaError::NumericOverflow { .. }));
        assert!(!err.is_validation() && !err.is_domain());
    }
}
