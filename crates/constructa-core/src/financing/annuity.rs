use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConstructaError;
use crate::time_value::{effective_monthly_rate, fv, nominal_monthly_rate, pmt};
use crate::types::{Money, Rate, ScheduleEntry};
use crate::ConstructaResult;

/// How an annual rate becomes a monthly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateConvention {
    /// (1 + annual)^(1/12) - 1
    #[default]
    EffectiveAnnual,
    /// annual / 12
    NominalMonthly,
}

impl RateConvention {
    pub fn monthly_rate(&self, annual: Rate) -> ConstructaResult<Rate> {
        match self {
            RateConvention::EffectiveAnnual => effective_monthly_rate(annual),
            RateConvention::NominalMonthly => Ok(nominal_monthly_rate(annual)),
        }
    }
}

/// Cost of a level monthly contribution under two annual rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEconomy {
    pub traditional_cost: Money,
    pub consortium_cost: Money,
    pub economy: Money,
}

/// Monthly rate of a loan priced at `rate_annual` on top of an annual
/// correction index: (1 + rate)(1 + index) - 1, then converted.
fn loan_monthly_rate(
    rate_annual: Rate,
    correction_index_annual: Rate,
    convention: RateConvention,
) -> ConstructaResult<Rate> {
    let combined =
        (Decimal::ONE + rate_annual) * (Decimal::ONE + correction_index_annual) - Decimal::ONE;
    convention.monthly_rate(combined)
}

fn validate_loan(principal: Money, term_months: u32, rate_annual: Rate) -> ConstructaResult<()> {
    if principal <= Decimal::ZERO {
        return Err(ConstructaError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    if term_months < 1 {
        return Err(ConstructaError::invalid(
            "term_months",
            "Term must be at least 1 month",
        ));
    }
    if rate_annual < Decimal::ZERO {
        return Err(ConstructaError::invalid(
            "rate_annual",
            "Interest rate cannot be negative",
        ));
    }
    Ok(())
}

/// Level monthly payment that amortizes `principal` over `term_months`.
pub fn annuity_payment(
    principal: Money,
    term_months: u32,
    rate_annual: Rate,
    correction_index_annual: Rate,
    convention: RateConvention,
) -> ConstructaResult<Money> {
    validate_loan(principal, term_months, rate_annual)?;
    let monthly = loan_monthly_rate(rate_annual, correction_index_annual, convention)?;
    Ok(-pmt(monthly, term_months, principal, Decimal::ZERO)?)
}

/// Price-table schedule: constant payment, interest on the declining balance.
pub fn generate_annuity_schedule(
    principal: Money,
    term_months: u32,
    rate_annual: Rate,
    correction_index_annual: Rate,
    convention: RateConvention,
) -> ConstructaResult<Vec<ScheduleEntry>> {
    validate_loan(principal, term_months, rate_annual)?;
    let monthly = loan_monthly_rate(rate_annual, correction_index_annual, convention)?;
    let payment = -pmt(monthly, term_months, principal, Decimal::ZERO)?;

    let mut balance = principal;
    let mut cumulative_paid = Decimal::ZERO;
    let mut entries = Vec::with_capacity(term_months as usize);

    for month in 1..=term_months {
        let interest = balance * monthly;
        let amortization = if month == term_months {
            balance
        } else {
            (payment - interest).min(balance)
        };
        let opening_balance = balance;
        balance = (balance - amortization).max(Decimal::ZERO);
        cumulative_paid += amortization + interest;

        entries.push(ScheduleEntry {
            month,
            due_date: None,
            opening_balance,
            correction: Decimal::ZERO,
            amortization,
            finance_charge: interest,
            payment: amortization + interest,
            dropdown_paid: Decimal::ZERO,
            dropdown_reduction: Decimal::ZERO,
            closing_balance: balance,
            cumulative_paid,
        });
    }

    Ok(entries)
}

/// Future-value cost of contributing `monthly_amount` for `term_months` at a
/// traditional rate versus a consortium rate, both effective annual.
pub fn rate_economy(
    monthly_amount: Money,
    traditional_rate_annual: Rate,
    consortium_rate_annual: Rate,
    term_months: u32,
) -> ConstructaResult<RateEconomy> {
    validate_loan(monthly_amount, term_months, traditional_rate_annual)?;
    if consortium_rate_annual < Decimal::ZERO {
        return Err(ConstructaError::invalid(
            "consortium_rate_annual",
            "Rate cannot be negative",
        ));
    }
    let traditional_cost = -fv(
        effective_monthly_rate(traditional_rate_annual)?,
        term_months,
        monthly_amount,
        Decimal::ZERO,
    )?;
    let consortium_cost = -fv(
        effective_monthly_rate(consortium_rate_annual)?,
        term_months,
        monthly_amount,
        Decimal::ZERO,
    )?;

    Ok(RateEconomy {
        traditional_cost,
        consortium_cost,
        economy: traditional_cost - consortium_cost,
    })
}
