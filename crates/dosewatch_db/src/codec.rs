//! Column encodings shared by the SQL repositories.
//!
//! The `Any` driver cannot decode chrono types or SQLite booleans, so
//! timestamps are stored as fixed-width RFC 3339 text (millisecond precision,
//! `Z` suffix, text order equals time order) and flags as `0`/`1` integers.
//!
//! Nullable columns go through [`optional`]: the `Any` value reports NULL only
//! through its type info, so decoding straight into `Option<T>` fails.

use crate::error::DbError;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::AnyRow;
use sqlx_core::any::AnyTypeInfoKind;
use sqlx::{Any, Decode, Row, Type, ValueRef};

pub fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::DecodeError(format!("bad timestamp '{}': {}", value, e)))
}

pub fn encode_flag(value: bool) -> i64 {
    i64::from(value)
}

/// Reads a nullable column, `None` for SQL NULL.
pub(crate) fn optional<'r, T>(row: &'r AnyRow, column: &str) -> Result<Option<T>, DbError>
where
    T: Decode<'r, Any> + Type<Any>,
{
    let raw = row.try_get_raw(column)?;
    if raw.type_info().kind() == AnyTypeInfoKind::Null {
        return Ok(None);
    }
    Ok(Some(row.try_get(column)?))
}

pub(crate) fn timestamp(row: &AnyRow, column: &str) -> Result<DateTime<Utc>, DbError> {
    let raw: String = row.try_get(column)?;
    decode_timestamp(&raw)
}

pub(crate) fn optional_timestamp(
    row: &AnyRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, DbError> {
    let raw: Option<String> = optional(row, column)?;
    raw.as_deref().map(decode_timestamp).transpose()
}

pub(crate) fn flag(row: &AnyRow, column: &str) -> Result<bool, DbError> {
    let raw: i64 = row.try_get(column)?;
    Ok(raw != 0)
}

/// A flag from an outer-joined table; `None` when the joined row is missing.
pub(crate) fn optional_flag(row: &AnyRow, column: &str) -> Result<Option<bool>, DbError> {
    let raw: Option<i64> = optional(row, column)?;
    Ok(raw.map(|v| v != 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        assert_eq!(encode_timestamp(whole), "2026-03-01T08:00:00.000Z");
        let parsed = decode_timestamp("2026-03-01T08:00:00.000Z").unwrap();
        assert_eq!(parsed, whole);
    }

    #[test]
    fn test_text_order_matches_time_order() {
        let earlier = Utc.with_ymd_and_hms(2026, 3, 1, 9, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        assert!(encode_timestamp(earlier) < encode_timestamp(later));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_timestamp("yesterday"),
            Err(DbError::DecodeError(_))
        ));
    }
}
