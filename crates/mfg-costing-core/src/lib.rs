pub mod error;
pub mod formatting;
pub mod sanitize;
pub mod types;

#[cfg(feature = "cost_sheet")]
pub mod cost_sheet;

#[cfg(feature = "pricing")]
pub mod pricing;

#[cfg(feature = "breakeven")]
pub mod breakeven;

#[cfg(feature = "reports")]
pub mod reports;

#[cfg(feature = "records")]
pub mod records;

pub use error::CostingError;
pub use types::*;

/// Standard result type for the non-calculation surfaces (records, I/O)
pub type CostingResult<T> = Result<T, CostingError>;
