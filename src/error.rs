use std::fmt;

/// Errors surfaced by the validation pipeline.
///
/// Row-level data-quality problems (bad amounts, bad NITs, undecodable CUFs)
/// never appear here; they are absorbed into counters. This type covers the
/// structural failures that abort a whole run.
#[derive(Debug)]
pub enum ValidationError {
    /// A required column is absent from an input dataset. Raised before any
    /// row processing begins; partial results must not be produced.
    MissingColumn { dataset: String, column: String },
    /// A total-amount column could not be coerced to numeric dataset-wide.
    /// Fatal: the amount totals drive the sync gate, a silent zero would lie.
    DataType { dataset: String, detail: String },
    /// Malformed request input (unparseable date, empty path, ...).
    BadRequest(String),
    /// CSV read/write failure.
    Csv(csv::Error),
    Io(std::io::Error),
    Database(sqlx::Error),
    /// Ledger sync requested but the validation gate did not pass.
    SyncRejected(String),
    /// Ledger sync requested but no ledger database is configured.
    LedgerNotConfigured,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { dataset, column } => {
                write!(f, "dataset '{dataset}': missing required column '{column}'")
            }
            Self::DataType { dataset, detail } => {
                write!(f, "dataset '{dataset}': amount column not numeric: {detail}")
            }
            Self::BadRequest(msg) => write!(f, "bad request: {msg}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Database(e) => write!(f, "database error: {e}"),
            Self::SyncRejected(msg) => write!(f, "sync rejected: {msg}"),
            Self::LedgerNotConfigured => {
                write!(f, "ledger database not configured (LEDGER_DB_URL)")
            }
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for ValidationError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<std::io::Error> for ValidationError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<sqlx::Error> for ValidationError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}
