//! Utility functions for SQLite storage operations.

use std::str::FromStr;

use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::StorageError;

/// Wall-clock stamp for `updated_at` bookkeeping columns.
///
/// Domain timestamps (awards, completions) come from the injected clock and
/// never from here.
pub fn row_timestamp() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Parses a decimal stored as TEXT.
pub fn parse_decimal(column: &str, value: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value.trim()).map_err(|e| {
        StorageError::InvalidValue(format!(
            "{} holds '{}' which is not a decimal: {}",
            column, value, e
        ))
    })
}
