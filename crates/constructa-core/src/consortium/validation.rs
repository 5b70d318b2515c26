use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::consortium::params::{DropdownEvent, LoanParameters};
use crate::error::ConstructaError;
use crate::types::{Money, Rate};
use crate::ConstructaResult;

/// Parameters that passed validation, with derived values resolved once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedLoan {
    pub params: LoanParameters,
    /// Credit-novo, principal net of both lances
    pub financed_principal: Money,
    pub monthly_fee_rate: Rate,
    /// Dropdowns sorted by month
    pub events: Vec<DropdownEvent>,
}

/// Check structural validity of a contract and its dropdowns.
///
/// The dropdown amount versus available balance check depends on the
/// balance path and is made later, while the dropdowns are applied.
pub fn validate(
    params: &LoanParameters,
    events: &[DropdownEvent],
) -> ConstructaResult<ValidatedLoan> {
    if params.principal <= Decimal::ZERO {
        return Err(ConstructaError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    if params.term_months < 1 {
        return Err(ConstructaError::invalid(
            "term_months",
            "Term must be at least 1 month",
        ));
    }
    if params.fee_rate < Decimal::ZERO {
        return Err(ConstructaError::invalid(
            "fee_rate",
            "Administration fee rate cannot be negative",
        ));
    }
    if params.correction_index < Decimal::ZERO {
        return Err(ConstructaError::invalid(
            "correction_index",
            "Correction index cannot be negative",
        ));
    }
    if params.min_payment < Decimal::ZERO {
        return Err(ConstructaError::invalid(
            "min_payment",
            "Minimum payment cannot be negative",
        ));
    }
    validate_bid("bid_percentage", params.bid_percentage)?;
    validate_bid("embedded_bid_percentage", params.embedded_bid_percentage)?;

    let lance = params.cash_lance() + params.embedded_lance();
    if lance >= params.principal {
        return Err(ConstructaError::LanceExceedsCredit {
            lance,
            credit: params.principal,
        });
    }

    let mut seen = BTreeSet::new();
    for (i, event) in events.iter().enumerate() {
        if event.month < 1 || event.month > params.term_months {
            return Err(ConstructaError::invalid(
                &format!("dropdowns[{i}].month"),
                format!(
                    "Month {} is outside the contract term 1..={}",
                    event.month, params.term_months
                ),
            ));
        }
        if event.amount <= Decimal::ZERO {
            return Err(ConstructaError::invalid(
                &format!("dropdowns[{i}].amount"),
                "Dropdown amount must be positive",
            ));
        }
        if event.agio_percent < Decimal::ZERO {
            return Err(ConstructaError::invalid(
                &format!("dropdowns[{i}].agio_percent"),
                "Agio cannot be negative",
            ));
        }
        if !seen.insert(event.month) {
            return Err(ConstructaError::invalid(
                &format!("dropdowns[{i}].month"),
                format!("More than one dropdown scheduled for month {}", event.month),
            ));
        }
    }

    let mut sorted = events.to_vec();
    sorted.sort_by_key(|e| e.month);

    Ok(ValidatedLoan {
        params: params.clone(),
        financed_principal: params.financed_principal(),
        monthly_fee_rate: params.monthly_fee_rate(),
        events: sorted,
    })
}

fn validate_bid(field: &str, bid: Option<Rate>) -> ConstructaResult<()> {
    if let Some(b) = bid {
        if b < Decimal::ZERO || b >= Decimal::ONE {
            return Err(ConstructaError::invalid(
                field,
                "Bid must be between 0 and 1 (exclusive upper)",
            ));
        }
    }
    Ok(())
}
