pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "currency")]
pub mod currency;

#[cfg(feature = "forms")]
pub mod forms;

#[cfg(feature = "exchange_rates")]
pub mod exchange_rates;

pub use error::{AmortizeError, InputError};
pub use types::*;

/// Standard result type for all amortize operations
pub type AmortizeResult<T> = Result<T, AmortizeError>;
