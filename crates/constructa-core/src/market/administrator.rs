//! Health ratios of consortium administrators from their monthly segment
//! reports: how many active quotas are current, how many were contemplated,
//! and how well freed quotas were resold.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ConstructaError;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::ConstructaResult;

/// One administrator's figures for one segment and reference month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentReport {
    pub administrator_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
    /// Reference month as YYYYMM
    pub reference_period: u32,
    pub segment_code: u32,
    /// Administration fee in percent as reported
    #[serde(default)]
    pub admin_fee_percent: Decimal,
    #[serde(default)]
    pub active_groups: u64,
    pub quotas_sold_in_month: u64,
    /// Quotas freed by exclusions and offered for resale
    pub excluded_quotas_for_sale: u64,
    pub active_contemplated_accumulated: u64,
    pub active_not_contemplated: u64,
    /// Active quotas with installments up to date
    pub active_current: u64,
    #[serde(default)]
    pub contemplated_defaulting: u64,
    #[serde(default)]
    pub not_contemplated_defaulting: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRatios {
    pub administrator_name: String,
    pub reference_period: u32,
    pub segment_code: u32,
    /// Current quotas over active quotas
    pub default_free_ratio: Option<Rate>,
    /// Contemplated quotas over active quotas
    pub contemplation_ratio: Option<Rate>,
    /// Quotas sold over quotas offered for resale
    pub sales_efficiency: Option<Rate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministratorReportInput {
    pub reports: Vec<SegmentReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministratorAnalysis {
    pub segments: Vec<SegmentRatios>,
    /// Ratios over all segments pooled together
    pub overall: SegmentTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTotals {
    pub active_quotas: u64,
    pub default_free_ratio: Option<Rate>,
    pub contemplation_ratio: Option<Rate>,
    pub sales_efficiency: Option<Rate>,
}

pub fn segment_ratios(report: &SegmentReport) -> SegmentRatios {
    let active = report.active_contemplated_accumulated + report.active_not_contemplated;
    SegmentRatios {
        administrator_name: report.administrator_name.clone(),
        reference_period: report.reference_period,
        segment_code: report.segment_code,
        default_free_ratio: ratio(report.active_current, active),
        contemplation_ratio: ratio(report.active_contemplated_accumulated, active),
        sales_efficiency: ratio(report.quotas_sold_in_month, report.excluded_quotas_for_sale),
    }
}

pub fn analyze_administrators(
    input: &AdministratorReportInput,
) -> ConstructaResult<ComputationOutput<AdministratorAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.reports.is_empty() {
        return Err(ConstructaError::invalid(
            "reports",
            "At least one segment report is required",
        ));
    }

    let segments: Vec<SegmentRatios> = input.reports.iter().map(segment_ratios).collect();
    for s in &segments {
        if s.default_free_ratio.is_none() {
            warnings.push(format!(
                "{} segment {} has no active quotas in {}",
                s.administrator_name, s.segment_code, s.reference_period
            ));
        }
    }

    let sum = |f: fn(&SegmentReport) -> u64| input.reports.iter().map(f).sum::<u64>();
    let contemplated = sum(|r| r.active_contemplated_accumulated);
    let active = contemplated + sum(|r| r.active_not_contemplated);
    let overall = SegmentTotals {
        active_quotas: active,
        default_free_ratio: ratio(sum(|r| r.active_current), active),
        contemplation_ratio: ratio(contemplated, active),
        sales_efficiency: ratio(
            sum(|r| r.quotas_sold_in_month),
            sum(|r| r.excluded_quotas_for_sale),
        ),
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Consortium administrator segment ratios",
        input,
        warnings,
        elapsed,
        AdministratorAnalysis { segments, overall },
    ))
}

fn ratio(numerator: u64, denominator: u64) -> Option<Rate> {
    if denominator == 0 {
        None
    } else {
        Some(Decimal::from(numerator) / Decimal::from(denominator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn report(segment: u32, sold: u64, offered: u64, contemplated: u64, not_c: u64, current: u64) -> SegmentReport {
        SegmentReport {
            administrator_name: "ADEMICON ADM CONS S.A.".into(),
            registration_id: Some("84911098".into()),
            reference_period: 202408,
            segment_code: segment,
            admin_fee_percent: dec!(23.66916),
            active_groups: 67,
            quotas_sold_in_month: sold,
            excluded_quotas_for_sale: offered,
            active_contemplated_accumulated: contemplated,
            active_not_contemplated: not_c,
            active_current: current,
            contemplated_defaulting: 0,
            not_contemplated_defaulting: 0,
        }
    }

    #[test]
    fn test_segment_ratios() {
        let r = segment_ratios(&report(2, 553, 3518, 19365, 17693, 33720));
        // 33720 / 37058
        assert_eq!(r.default_free_ratio.unwrap().round_dp(4), dec!(0.9099));
        assert_eq!(r.contemplation_ratio.unwrap().round_dp(4), dec!(0.5226));
        assert_eq!(r.sales_efficiency.unwrap().round_dp(4), dec!(0.1572));
    }

    #[test]
    fn test_empty_segment_has_no_ratios() {
        let r = segment_ratios(&report(4, 0, 0, 0, 0, 0));
        assert!(r.default_free_ratio.is_none());
        assert!(r.contemplation_ratio.is_none());
        assert!(r.sales_efficiency.is_none());
    }

    #[test]
    fn test_pooled_totals_and_warnings() {
        let input = AdministratorReportInput {
            reports: vec![report(1, 10, 20, 30, 70, 90), report(4, 0, 0, 0, 0, 0)],
        };
        let out = analyze_administrators(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.result.overall.active_quotas, 100);
        assert_eq!(out.result.overall.default_free_ratio, Some(dec!(0.9)));
        assert_eq!(out.result.overall.sales_efficiency, Some(dec!(0.5)));
    }

    #[test]
    fn test_rejects_empty_input() {
        let input = AdministratorReportInput { reports: vec![] };
        assert!(analyze_administrators(&input).unwrap_err().is_validation());
    }
}
