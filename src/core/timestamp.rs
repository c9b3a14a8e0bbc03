//! Fixed-width timestamp encoding for stored records
//!
//! Every instant is written as `YYYY-MM-DDTHH:MM:SS.mmmZ` (UTC, millisecond
//! precision). Keeping the width constant makes string ordering in the
//! document store agree with chronological ordering, which range filters
//! on `createdAt`-style fields rely on.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Format an instant in the stored representation
pub fn format(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an instant from query or document text
///
/// Accepts RFC 3339 (any offset) and bare `YYYY-MM-DD` dates. A bare date is
/// the start of that day in the server's local time zone.
pub fn parse(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .map(|local| local.with_timezone(&Utc))
}

/// Advance an instant to 23:59:59.999 of the same local calendar day
pub fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_timezone(&Local)
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .and_then(|naive| naive.and_local_timezone(Local).latest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or(instant)
}

pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(instant))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", text)))
}
