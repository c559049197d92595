use crate::error::WordleError;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Return the current Unix epoch in seconds.
pub fn now_epoch_secs() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, WordleError> {
    let trimmed = raw.trim();
    // chrono accepts signs and unpadded fields; the archive format does not.
    let well_shaped = trimmed.len() == 10
        && trimmed.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_shaped {
        return Err(WordleError::InvalidDate(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| WordleError::InvalidDate(trimmed.to_string()))
}
