pub mod error;
pub mod time_value;
pub mod types;

pub mod metrics;

#[cfg(feature = "consortium")]
pub mod consortium;

#[cfg(feature = "financing")]
pub mod financing;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "market")]
pub mod market;

pub use error::ConstructaError;
pub use types::*;

/// Standard result type for all constructa operations
pub type ConstructaResult<T> = Result<T, ConstructaError>;
