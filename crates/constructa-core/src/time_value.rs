use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ConstructaError;
use crate::types::{Money, Rate};
use crate::ConstructaResult;

/// Bracket searched for a periodic IRR.
pub const IRR_LOWER_BOUND: Rate = dec!(-0.99);
pub const IRR_UPPER_BOUND: Rate = dec!(0.99);

/// Bisection stops once the bracket is narrower than this.
pub const IRR_TOLERANCE: Rate = dec!(0.0000001);
const MAX_BISECTIONS: u32 = 200;

/// Outcome of an IRR search.
///
/// `Indeterminate` is returned when the NPV has no sign change inside the
/// bracket, typically because every flow has the same sign. Callers render it
/// as "N/A"; it is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "rate", rename_all = "snake_case")]
pub enum Irr {
    Defined(Rate),
    Indeterminate,
}

impl Irr {
    pub fn rate(&self) -> Option<Rate> {
        match self {
            Irr::Defined(r) => Some(*r),
            Irr::Indeterminate => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Irr::Defined(_))
    }
}

/// Net Present Value of a series of cash flows, first flow undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> ConstructaResult<Money> {
    if rate <= dec!(-1) {
        return Err(ConstructaError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut result = Decimal::ZERO;

    // Horner from the last period back keeps intermediate values bounded
    // for non-negative rates.
    for (t, cf) in cash_flows.iter().enumerate().rev() {
        result = result
            .checked_div(one_plus_r)
            .and_then(|v| v.checked_add(*cf))
            .ok_or_else(|| ConstructaError::NumericOverflow {
                context: format!("NPV discounting at period {t}"),
            })?;
    }

    Ok(result)
}

/// A value with the same sign as NPV(rate) that cannot overflow on the IRR
/// bracket. Below zero the series is compounded forward instead, which
/// multiplies the NPV by the positive factor (1+r)^n.
fn npv_sign_proxy(rate: Rate, cash_flows: &[Money]) -> Option<Decimal> {
    let one_plus_r = Decimal::ONE + rate;
    if rate >= Decimal::ZERO {
        let mut acc = Decimal::ZERO;
        for cf in cash_flows.iter().rev() {
            acc = acc.checked_div(one_plus_r)?.checked_add(*cf)?;
        }
        Some(acc)
    } else {
        let mut acc = Decimal::ZERO;
        for cf in cash_flows {
            acc = acc.checked_mul(one_plus_r)?.checked_add(*cf)?;
        }
        Some(acc)
    }
}

/// Internal Rate of Return by bisection over [`IRR_LOWER_BOUND`, `IRR_UPPER_BOUND`].
pub fn irr(cash_flows: &[Money]) -> Irr {
    if cash_flows.len() < 2 {
        return Irr::Indeterminate;
    }
    let has_inflow = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    let has_outflow = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    if !(has_inflow && has_outflow) {
        return Irr::Indeterminate;
    }

    let mut lo = IRR_LOWER_BOUND;
    let mut hi = IRR_UPPER_BOUND;
    let (Some(mut f_lo), Some(f_hi)) = (
        npv_sign_proxy(lo, cash_flows),
        npv_sign_proxy(hi, cash_flows),
    ) else {
        return Irr::Indeterminate;
    };

    if f_lo.is_zero() {
        return Irr::Defined(lo);
    }
    if f_hi.is_zero() {
        return Irr::Defined(hi);
    }
    if f_lo.is_sign_negative() == f_hi.is_sign_negative() {
        return Irr::Indeterminate;
    }

    for _ in 0..MAX_BISECTIONS {
        let mid = (lo + hi) / dec!(2);
        let Some(f_mid) = npv_sign_proxy(mid, cash_flows) else {
            return Irr::Indeterminate;
        };
        if f_mid.is_zero() || hi - lo < IRR_TOLERANCE {
            return Irr::Defined(mid);
        }
        if f_mid.is_sign_negative() == f_lo.is_sign_negative() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    Irr::Defined((lo + hi) / dec!(2))
}

/// Future Value
pub fn fv(rate: Rate, nper: u32, pmt: Money, present_value: Money) -> ConstructaResult<Money> {
    if rate.is_zero() {
        return Ok(-(present_value + pmt * Decimal::from(nper)));
    }

    let factor = compound_factor(rate, nper)?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    Ok(-(present_value * factor + pmt * annuity_factor))
}

/// Payment (PMT). Negative for a positive present value, spreadsheet style.
pub fn pmt(
    rate: Rate,
    nper: u32,
    present_value: Money,
    future_value: Money,
) -> ConstructaResult<Money> {
    if nper == 0 {
        return Err(ConstructaError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let factor = compound_factor(rate, nper)?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(ConstructaError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(-(present_value * factor + future_value) / annuity_factor)
}

/// Monthly rate equivalent to an effective annual rate: (1+r)^(1/12) - 1.
pub fn effective_monthly_rate(annual: Rate) -> ConstructaResult<Rate> {
    if annual <= dec!(-1) {
        return Err(ConstructaError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate must be greater than -100%".into(),
        });
    }
    if annual.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let monthly = (Decimal::ONE + annual)
        .checked_powd(Decimal::ONE / dec!(12))
        .ok_or_else(|| ConstructaError::NumericOverflow {
            context: "effective monthly rate".into(),
        })?;
    Ok(monthly - Decimal::ONE)
}

/// Monthly rate from a nominal annual rate: r / 12.
pub fn nominal_monthly_rate(annual: Rate) -> Rate {
    annual / dec!(12)
}

fn compound_factor(rate: Rate, nper: u32) -> ConstructaResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(u64::from(nper))
        .ok_or_else(|| ConstructaError::NumericOverflow {
            context: format!("compounding over {nper} periods"),
        })
}
