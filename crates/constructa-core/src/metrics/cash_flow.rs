use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time_value::{irr, npv, Irr};
use crate::types::{Money, Rate};
use crate::ConstructaResult;

/// Month at which the running cash position recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "month", rename_all = "snake_case")]
pub enum Payback {
    Reached(u32),
    NotReached,
}

impl Payback {
    pub fn month(&self) -> Option<u32> {
        match self {
            Payback::Reached(m) => Some(*m),
            Payback::NotReached => None,
        }
    }
}

/// Metrics of a signed monthly cash flow series (index = month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowMetrics {
    pub npv: Money,
    pub irr: Irr,
    pub payback: Payback,
    /// Deepest negative running total, reported as a positive amount
    pub max_exposure: Money,
    pub total_inflows: Money,
    pub total_outflows: Money,
    pub net_total: Money,
}

pub fn compute_cash_flow_metrics(
    flows: &[Money],
    discount_rate: Rate,
) -> ConstructaResult<CashFlowMetrics> {
    let npv = npv(discount_rate, flows)?;
    let total_inflows: Money = flows.iter().filter(|f| f.is_sign_positive()).sum();
    let total_outflows: Money = flows
        .iter()
        .filter(|f| f.is_sign_negative())
        .map(|f| -*f)
        .sum();

    Ok(CashFlowMetrics {
        npv,
        irr: irr(flows),
        payback: payback_month(flows),
        max_exposure: max_exposure(flows),
        total_inflows,
        total_outflows,
        net_total: total_inflows - total_outflows,
    })
}

/// Running total of the series.
pub fn cumulative(flows: &[Money]) -> Vec<Money> {
    flows
        .iter()
        .scan(Decimal::ZERO, |acc, f| {
            *acc += *f;
            Some(*acc)
        })
        .collect()
}

/// Leading zero months are ignored. If the running total is non-negative at
/// the first real flow, that month is the payback; otherwise it is the first
/// later month at which the running total climbs back to non-negative.
pub fn payback_month(flows: &[Money]) -> Payback {
    let mut running = Decimal::ZERO;
    let mut started = false;

    for (month, flow) in flows.iter().enumerate() {
        if !started && flow.is_zero() {
            continue;
        }
        started = true;
        running += *flow;
        if running >= Decimal::ZERO {
            return Payback::Reached(month as u32);
        }
    }

    Payback::NotReached
}

pub fn max_exposure(flows: &[Money]) -> Money {
    let deepest = cumulative(flows)
        .into_iter()
        .min()
        .unwrap_or(Decimal::ZERO);
    if deepest < Decimal::ZERO {
        -deepest
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payback_after_initial_outlay() {
        let flows = vec![dec!(-100), dec!(30), dec!(30), dec!(40), dec!(10)];
        assert_eq!(payback_month(&flows), Payback::Reached(3));
    }

    #[test]
    fn test_payback_skips_leading_zeros() {
        let flows = vec![Decimal::ZERO, dec!(50), dec!(-20)];
        assert_eq!(payback_month(&flows), Payback::Reached(1));
    }

    #[test]
    fn test_payback_not_reached() {
        let flows = vec![dec!(-100), dec!(30), dec!(30)];
        assert_eq!(payback_month(&flows), Payback::NotReached);
        assert_eq!(payback_month(&[]), Payback::NotReached);
    }

    #[test]
    fn test_max_exposure() {
        let flows = vec![dec!(10), dec!(-50), dec!(-20), dec!(100)];
        assert_eq!(max_exposure(&flows), dec!(60));
        assert_eq!(max_exposure(&[dec!(5)]), Decimal::ZERO);
    }

    #[test]
    fn test_metrics_totals() {
        let flows = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let metrics = compute_cash_flow_metrics(&flows, Decimal::ZERO).unwrap();
        assert_eq!(metrics.npv, dec!(200));
        assert_eq!(metrics.total_inflows, dec!(1200));
        assert_eq!(metrics.total_outflows, dec!(1000));
        assert_eq!(metrics.net_total, dec!(200));
        assert!(metrics.irr.is_defined());
    }
}
