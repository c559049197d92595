use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WordleError {
    #[error("invalid date `{0}`: use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("solution request for {date} failed with status {status}")]
    FetchStatus { date: NaiveDate, status: u16 },
    #[error("response for {0} has no solution field")]
    MissingSolution(NaiveDate),
    #[error("response for {date} has malformed solution `{word}`")]
    MalformedSolution { date: NaiveDate, word: String },
    #[error("response for {requested} is for {returned}")]
    DateMismatch {
        requested: NaiveDate,
        returned: String,
    },
    #[error("archive is locked by another run: {}", .0.display())]
    ArchiveLocked(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnCode {
    W001MalformedLine,
    W002DuplicateDate,
    W003Unsorted,
    W004UnknownEnv,
}

impl WarnCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::W001MalformedLine => "W001_MALFORMED_LINE",
            Self::W002DuplicateDate => "W002_DUPLICATE_DATE",
            Self::W003Unsorted => "W003_UNSORTED",
            Self::W004UnknownEnv => "W004_UNKNOWN_ENV",
        }
    }
}
