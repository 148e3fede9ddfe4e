use thiserror::Error;

/// Errors raised while turning selector labels into filter tokens.
///
/// The filter stages themselves never fail; callers that receive one of these
/// fall back to the unfiltered table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid week label: {0}")]
    InvalidWeekLabel(String),

    #[error("Invalid day label: {0}")]
    InvalidDayLabel(String),

    #[error("Unknown month: {0}")]
    UnknownMonth(String),

    #[error("Invalid month number {0}: must be between 1 and 12")]
    InvalidMonthNumber(u32),

    #[error("At least one month must be selected")]
    EmptyMonthSelection,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Missing data file: {0}")]
    MissingFile(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
