use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, Rate};

/// Payment below which the remaining balance is settled in one installment.
pub const DEFAULT_MIN_PAYMENT: Money = dec!(500);

/// How `fee_rate` is quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeBasis {
    /// Annual rate, charged monthly at rate / 12.
    #[default]
    Annual,
    /// Already a monthly rate.
    Monthly,
}

/// What a dropdown changes for the rest of the contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecalculationStrategy {
    /// Keep the remaining months, shrink the amortization quota.
    #[default]
    PreserveTerm,
    /// Keep the amortization quota, finish the contract earlier.
    PreservePayment,
}

/// Contract parameters for one consortium quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Credit letter value
    pub principal: Money,
    /// Contract length in months
    pub term_months: u32,
    /// Administration fee rate, see `fee_basis`
    pub fee_rate: Rate,
    #[serde(default)]
    pub fee_basis: FeeBasis,
    /// Annual monetary correction, compounded every 12 months
    #[serde(default)]
    pub correction_index: Rate,
    /// Cash lance as a fraction of principal (0.20 = 20%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_percentage: Option<Rate>,
    /// Embedded lance as a fraction of principal, taken from the credit itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_bid_percentage: Option<Rate>,
    /// Minimal viable installment
    #[serde(default = "default_min_payment")]
    pub min_payment: Money,
    /// Date of the first installment, used to label due dates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

fn default_min_payment() -> Money {
    DEFAULT_MIN_PAYMENT
}

impl LoanParameters {
    pub fn new(principal: Money, term_months: u32, fee_rate: Rate, correction_index: Rate) -> Self {
        LoanParameters {
            principal,
            term_months,
            fee_rate,
            fee_basis: FeeBasis::Annual,
            correction_index,
            bid_percentage: None,
            embedded_bid_percentage: None,
            min_payment: DEFAULT_MIN_PAYMENT,
            start_date: None,
        }
    }

    pub fn with_bid(mut self, bid_percentage: Rate) -> Self {
        self.bid_percentage = Some(bid_percentage);
        self
    }

    pub fn with_embedded_bid(mut self, embedded_bid_percentage: Rate) -> Self {
        self.embedded_bid_percentage = Some(embedded_bid_percentage);
        self
    }

    pub fn monthly_fee_rate(&self) -> Rate {
        match self.fee_basis {
            FeeBasis::Annual => self.fee_rate / dec!(12),
            FeeBasis::Monthly => self.fee_rate,
        }
    }

    /// Lance paid in cash at signing.
    pub fn cash_lance(&self) -> Money {
        self.principal * self.bid_percentage.unwrap_or(Decimal::ZERO)
    }

    /// Lance deducted from the released credit.
    pub fn embedded_lance(&self) -> Money {
        self.principal * self.embedded_bid_percentage.unwrap_or(Decimal::ZERO)
    }

    /// Credit-novo: the balance actually amortized.
    pub fn financed_principal(&self) -> Money {
        self.principal - self.cash_lance() - self.embedded_lance()
    }

    /// Credit handed to the member at contemplation.
    pub fn credit_released(&self) -> Money {
        self.principal - self.embedded_lance()
    }
}

/// A lump-sum prepayment against the outstanding balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownEvent {
    /// Month at whose end the prepayment lands (1..=term)
    pub month: u32,
    /// Nominal amount paid in
    pub amount: Money,
    /// Premium in percent (20 = 20%) applied to `amount` before it reduces the balance
    #[serde(default)]
    pub agio_percent: Percent,
}

impl DropdownEvent {
    pub fn new(month: u32, amount: Money, agio_percent: Percent) -> Self {
        DropdownEvent {
            month,
            amount,
            agio_percent,
        }
    }

    /// Balance reduction before clamping: amount * (1 + agio / 100).
    pub fn effective_amount(&self) -> Money {
        self.amount * (Decimal::ONE + self.agio_percent / dec!(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_amount_applies_agio() {
        let event = DropdownEvent::new(12, dec!(100000), dec!(20));
        assert_eq!(event.effective_amount(), dec!(120000));
    }

    #[test]
    fn test_financed_principal_nets_both_lances() {
        let params = LoanParameters::new(dec!(1000000), 60, dec!(0.12), Decimal::ZERO)
            .with_bid(dec!(0.25))
            .with_embedded_bid(dec!(0.25));
        assert_eq!(params.cash_lance(), dec!(250000));
        assert_eq!(params.financed_principal(), dec!(500000));
        assert_eq!(params.credit_released(), dec!(750000));
    }

    #[test]
    fn test_serde_defaults() {
        let params: LoanParameters = serde_json::from_str(
            r#"{"principal": "1000000", "term_months": 60, "fee_rate": "0.12"}"#,
        )
        .unwrap();
        assert_eq!(params.fee_basis, FeeBasis::Annual);
        assert_eq!(params.min_payment, DEFAULT_MIN_PAYMENT);
        assert_eq!(params.monthly_fee_rate(), dec!(0.01));
        assert!(params.correction_index.is_zero());
    }
}
