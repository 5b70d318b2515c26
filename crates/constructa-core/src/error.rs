use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConstructaError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(
        "Dropdown at month {month} of {amount} exceeds the outstanding balance of {balance}"
    )]
    DropdownExceedsBalance {
        month: u32,
        amount: Decimal,
        balance: Decimal,
    },

    #[error("Lance of {lance} leaves no credit to amortize out of {credit}")]
    LanceExceedsCredit { lance: Decimal, credit: Decimal },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ConstructaError {
    /// Malformed or out-of-range input rejected before any simulation runs.
    pub fn is_validation(&self) -> bool {
        matches!(self, ConstructaError::InvalidInput { .. })
    }

    /// A well-formed request whose contract terms cannot be honoured.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            ConstructaError::DropdownExceedsBalance { .. }
                | ConstructaError::LanceExceedsCredit { .. }
        )
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConstructaError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ConstructaError {
    fn from(e: serde_json::Error) -> Self {
        ConstructaError::SerializationError(e.to_string())
    }
}
