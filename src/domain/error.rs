//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for overnight.
#[derive(Debug, thiserror::Error)]
pub enum OvernightError {
    #[error("missing input file(s): {}", paths.join(", "))]
    MissingInput { paths: Vec<String> },

    #[error("schema error in {input}: {reason}")]
    Schema { input: String, reason: String },

    #[error("duplicate date {date} in {input}")]
    DuplicateDate { input: String, date: NaiveDate },

    #[error("empty sample for {strategy}: no rows left after filtering and joining")]
    EmptySample { strategy: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl OvernightError {
    pub fn schema(input: &str, reason: impl Into<String>) -> Self {
        OvernightError::Schema {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this error class.
    pub fn exit_status(&self) -> u8 {
        match self {
            OvernightError::Io(_) => 1,
            OvernightError::ConfigParse { .. } | OvernightError::ConfigInvalid { .. } => 2,
            OvernightError::MissingInput { .. } => 3,
            OvernightError::Schema { .. } | OvernightError::DuplicateDate { .. } => 4,
            OvernightError::EmptySample { .. } => 5,
        }
    }
}

impl From<&OvernightError> for std::process::ExitCode {
    fn from(err: &OvernightError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
