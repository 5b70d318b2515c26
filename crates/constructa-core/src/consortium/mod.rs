//! Consortium (rotating-credit) contracts: parameter validation, linear
//! amortization with annual monetary correction, and lump-sum dropdown
//! prepayments with agio.

pub mod credit;
pub mod dropdown;
pub mod params;
pub mod schedule;
pub mod validation;

pub use dropdown::{apply_dropdowns, simulate_dropdowns, DropdownComparison, DropdownRequest};
pub use params::{DropdownEvent, FeeBasis, LoanParameters, RecalculationStrategy};
pub use schedule::{generate, generate_schedule};
pub use validation::{validate, ValidatedLoan};
