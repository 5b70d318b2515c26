use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::consortium::params::LoanParameters;
use crate::consortium::validation::validate;
use crate::error::ConstructaError;
use crate::time_value::nominal_monthly_rate;
use crate::types::{Money, Rate};
use crate::ConstructaResult;

/// Where a consortium credit letter goes once the lance is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditBreakdown {
    pub principal: Money,
    pub cash_lance: Money,
    pub embedded_lance: Money,
    pub total_lance: Money,
    /// Credit-novo, the balance amortized
    pub financed_principal: Money,
    pub credit_released: Money,
    /// Credit released less the cash lance
    pub net_cash_at_signing: Money,
    /// First installment of the linear schedule
    pub first_installment: Money,
    /// First installment over the credit letter value
    pub payment_to_credit_ratio: Rate,
}

pub fn credit_breakdown(params: &LoanParameters) -> ConstructaResult<CreditBreakdown> {
    let loan = validate(params, &[])?;
    let cash_lance = params.cash_lance();
    let embedded_lance = params.embedded_lance();
    let financed = loan.financed_principal;
    let first_installment = financed
        .checked_mul(loan.monthly_fee_rate)
        .and_then(|fee| fee.checked_add(financed / Decimal::from(params.term_months)))
        .ok_or_else(|| ConstructaError::NumericOverflow {
            context: "first installment".into(),
        })?;

    Ok(CreditBreakdown {
        principal: params.principal,
        cash_lance,
        embedded_lance,
        total_lance: cash_lance + embedded_lance,
        financed_principal: financed,
        credit_released: params.credit_released(),
        net_cash_at_signing: params.credit_released() - cash_lance,
        first_installment,
        payment_to_credit_ratio: first_installment / params.principal,
    })
}

/// Installment as a fraction of the quota value for a lance-free quota:
/// 1 / term + annual fee / 12.
pub fn payment_to_credit_ratio(
    quota_value: Money,
    fee_rate_annual: Rate,
    term_months: u32,
) -> ConstructaResult<Rate> {
    if quota_value <= Decimal::ZERO {
        return Err(ConstructaError::invalid(
            "quota_value",
            "Quota value must be positive",
        ));
    }
    if term_months == 0 {
        return Err(ConstructaError::invalid(
            "term_months",
            "Term must be at least 1 month",
        ));
    }
    if fee_rate_annual < Decimal::ZERO {
        return Err(ConstructaError::invalid(
            "fee_rate_annual",
            "Administration fee rate cannot be negative",
        ));
    }
    // The quota value cancels out of installment / quota value.
    Ok(Decimal::ONE / Decimal::from(term_months) + nominal_monthly_rate(fee_rate_annual))
}
