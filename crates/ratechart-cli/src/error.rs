use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ratechart_core::ValidationError),

    #[error("strict mode failed: {failed} currency fetch(es) failed")]
    FetchFailures { failed: usize },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ratechart_core::CoreError> for CliError {
    fn from(error: ratechart_core::CoreError) -> Self {
        match error {
            ratechart_core::CoreError::Validation(error) => Self::Validation(error),
            ratechart_core::CoreError::Serialization(error) => Self::Serialization(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Serialization(_) => 4,
            Self::FetchFailures { .. } => 5,
            Self::Io(_) => 10,
        }
    }
}
