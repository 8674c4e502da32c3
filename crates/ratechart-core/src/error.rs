use thiserror::Error;

/// Validation errors for currencies, calendar days and range selections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("currency must be one of EUR, USD, CNY: '{value}'")]
    InvalidCurrency { value: String },

    #[error("date must be a calendar day formatted YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("range start {start} is after range end {end}")]
    InvertedRange { start: String, end: String },
    #[error("range end {end} is after today ({today})")]
    RangeInFuture { end: String, today: String },

    #[error("invalid source '{value}', expected one of cbr, synthetic")]
    InvalidSource { value: String },
    #[error("invalid locale '{value}', expected one of en, ru")]
    InvalidLocale { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
