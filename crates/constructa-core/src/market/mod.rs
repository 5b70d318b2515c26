pub mod administrator;

pub use administrator::{
    analyze_administrators, segment_ratios, AdministratorAnalysis, AdministratorReportInput,
    SegmentRatios, SegmentReport, SegmentTotals,
};
