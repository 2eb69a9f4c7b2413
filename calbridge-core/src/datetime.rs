//! Date parsing and formatting for store records.
//!
//! Store records carry epoch milliseconds; the public string form is UTC
//! ISO-8601 with millisecond precision and a literal `Z`. Every date-bearing
//! input accepts either form, symmetrically.

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CalBridgeError, CalBridgeResult};

/// Public-facing timestamp format.
pub const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Compact form used by the store's rule grammar for `UNTIL` tokens.
pub const RULE_UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A date-bearing input field: either a formatted date string or a raw
/// epoch-millisecond number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateTimeInput {
    Millis(i64),
    Text(String),
}

impl DateTimeInput {
    /// Resolve to epoch milliseconds. String inputs are parsed with
    /// [`UTC_FORMAT`]; when `utc` is false they are interpreted in the
    /// local zone instead (the caller opted out of UTC normalization).
    pub fn to_millis(&self, field: &'static str, utc: bool) -> CalBridgeResult<i64> {
        match self {
            DateTimeInput::Millis(ms) => Ok(*ms),
            DateTimeInput::Text(text) => parse_millis(text, field, utc),
        }
    }
}

impl From<i64> for DateTimeInput {
    fn from(ms: i64) -> Self {
        DateTimeInput::Millis(ms)
    }
}

impl From<&str> for DateTimeInput {
    fn from(text: &str) -> Self {
        DateTimeInput::Text(text.to_string())
    }
}

/// Parse a formatted date string into epoch milliseconds.
pub fn parse_millis(text: &str, field: &'static str, utc: bool) -> CalBridgeResult<i64> {
    let naive = NaiveDateTime::parse_from_str(text, UTC_FORMAT).map_err(|e| {
        CalBridgeError::Malformed(field, format!("unparsable date string {text:?}: {e}"))
    })?;

    let instant = if utc {
        Utc.from_utc_datetime(&naive)
    } else {
        match Local.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            LocalResult::None => {
                return Err(CalBridgeError::Malformed(
                    field,
                    format!("{text:?} does not exist in the local time zone"),
                ));
            }
        }
    };

    Ok(instant.timestamp_millis())
}

/// Convert stored epoch milliseconds into a UTC instant. `None` when the
/// value is outside the representable range.
pub fn utc_from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Format an instant in the public string form.
pub fn format_utc(instant: &DateTime<Utc>) -> String {
    instant.format(UTC_FORMAT).to_string()
}

/// Serde support for optional UTC instants in the public string form.
pub mod serde_utc_option {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::UTC_FORMAT;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value
            .map(|dt| dt.format(UTC_FORMAT).to_string())
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|text| {
            NaiveDateTime::parse_from_str(&text, UTC_FORMAT)
                .map(|naive| Utc.from_utc_datetime(&naive))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
