//! RFC 3339 timestamps on the wire.
//!
//! Input also accepts a bare calendar date (`2024-05-01`), read as midnight UTC, since
//! citation and action dates are often known only to the day.

pub mod option;

use serde::{Deserialize, Deserializer, Serializer};
use time::{
	Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, String> {
	let raw = raw.trim();

	if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Ok(parsed);
	}

	Date::parse(raw, format_description!("[year]-[month]-[day]"))
		.map(|date| date.midnight().assume_utc())
		.map_err(|_| format!("{raw:?} is neither an RFC 3339 timestamp nor a YYYY-MM-DD date."))
}
