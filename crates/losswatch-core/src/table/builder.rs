//! Feed payload → loss table.
//!
//! Expected payload: `{"stories": [{"content": {...}}, ...]}`. Every declared
//! column is cast strictly; one bad row fails the whole build.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use super::{EncodedTable, LossColumn, LossRow, LossTable, DATE_COLUMN};
use crate::error::FeedError;

/// Accepted `date` layouts besides RFC 3339. Time of day is dropped.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Build the encoded loss table for a raw feed payload.
pub fn build(raw: &[u8]) -> Result<EncodedTable, FeedError> {
    let table = parse_feed(raw)?;
    EncodedTable::encode(&table)
}

/// Parse and coerce a raw feed payload into a typed table.
pub fn parse_feed(raw: &[u8]) -> Result<LossTable, FeedError> {
    let payload: Value = serde_json::from_slice(raw)
        .map_err(|e| FeedError::MalformedFeed(format!("response is not JSON: {}", e)))?;

    let stories = match payload.get("stories") {
        Some(Value::Array(stories)) => stories,
        Some(_) => return Err(FeedError::MalformedFeed("`stories` is not a list".into())),
        None => return Err(FeedError::MalformedFeed("missing `stories` key".into())),
    };

    let rows = stories
        .iter()
        .enumerate()
        .map(|(row, story)| {
            let content = story
                .get("content")
                .and_then(Value::as_object)
                .ok_or_else(|| {
                    FeedError::MalformedFeed(format!("story {} has no `content` object", row))
                })?;
            coerce_row(content, row)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LossTable::new(rows))
}

fn coerce_row(content: &Map<String, Value>, row: usize) -> Result<LossRow, FeedError> {
    let int = |column: LossColumn| {
        let field = column.feed_field();
        coerce_int(content.get(field), field, row)
    };

    Ok(LossRow {
        date: coerce_date(content.get(DATE_COLUMN), row)?,
        killed: int(LossColumn::Killed)?,
        wounded: int(LossColumn::Wounded)?,
        artillery: int(LossColumn::Artillery)?,
        aircraft: int(LossColumn::Aircraft)?,
        helicopters: int(LossColumn::Helicopters)?,
        tanks: int(LossColumn::Tanks)?,
        armored: int(LossColumn::Armored)?,
        ships: int(LossColumn::Ships)?,
    })
}

fn coerce_date(value: Option<&Value>, row: usize) -> Result<NaiveDate, FeedError> {
    let text = match value {
        Some(Value::String(text)) => text.trim(),
        Some(other) => {
            return Err(FeedError::coercion(
                DATE_COLUMN,
                row,
                format!("expected a date string, got {}", other),
            ))
        }
        None => return Err(FeedError::coercion(DATE_COLUMN, row, "missing field")),
    };

    parse_date(text)
        .ok_or_else(|| FeedError::coercion(DATE_COLUMN, row, format!("not a date: {:?}", text)))
}

/// Parse the date part of a feed or table date string.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|dt| dt.date())
}

fn coerce_int(value: Option<&Value>, field: &str, row: usize) -> Result<i64, FeedError> {
    match value {
        None => Err(FeedError::coercion(field, row, "missing field")),
        Some(Value::Number(number)) => {
            if let Some(n) = number.as_i64() {
                Ok(n)
            } else if number.is_u64() {
                Err(FeedError::coercion(field, row, format!("out of range: {}", number)))
            } else if let Some(f) = number.as_f64().filter(|f| f.is_finite()) {
                let truncated = f.trunc();
                // i64::MAX as f64 rounds up to 2^63, which is itself out of range
                if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
                    Ok(truncated as i64)
                } else {
                    Err(FeedError::coercion(field, row, format!("out of range: {}", number)))
                }
            } else {
                Err(FeedError::coercion(field, row, format!("out of range: {}", number)))
            }
        }
        Some(Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| FeedError::coercion(field, row, format!("not an integer: {:?}", text))),
        Some(other) => Err(FeedError::coercion(
            field,
            row,
            format!("expected an integer, got {}", other),
        )),
    }
}
