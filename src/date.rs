//! Wire date formats and serde helpers.
//!
//! The gateway mixes several textual date encodings (ISO with and without
//! sub-second precision, slash-separated local datetimes, bare dates and times, and
//! the RFC-style response `Date` header). All instants decoded here are UTC unless a
//! decode context says otherwise.

// crates.io
use serde::{Deserializer, Serializer, de::Error as _};
use time::{
	Month, Time, format_description::BorrowedFormatItem, format_description::well_known::Rfc2822,
	macros::format_description, util,
};
// self
use crate::_prelude::*;

pub(crate) const ISO_MILLIS: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]");
pub(crate) const ISO_SECONDS: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
pub(crate) const DATE_ONLY: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]");
pub(crate) const TIME_ONLY: &[BorrowedFormatItem<'static>] =
	format_description!("[hour]:[minute]:[second]");
pub(crate) const SLASH_DATETIME: &[BorrowedFormatItem<'static>] =
	format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");

const MONTH_ABBREVS: [&str; 12] =
	["JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC"];

/// Parses a wire datetime accepting millisecond, second, and minute precision.
pub(crate) fn parse_flexible(raw: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
	if raw.contains('.') {
		return PrimitiveDateTime::parse(raw, ISO_MILLIS);
	}
	if raw.len() == 16 {
		// `yyyy-MM-ddTHH:mm`; normalize to second precision.
		return PrimitiveDateTime::parse(&format!("{raw}:00"), ISO_SECONDS);
	}

	PrimitiveDateTime::parse(raw, ISO_SECONDS)
}

/// Parses the response `Date` header (`E, d MMM yyyy HH:mm:ss zzz`).
pub(crate) fn parse_http_date(raw: &str) -> Option<OffsetDateTime> {
	let trimmed = raw.trim();

	if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc2822) {
		return Some(parsed);
	}

	// RFC 2822 obsolete zone names; the gateway emits `GMT`.
	let normalized = format!("{} +0000", trimmed.strip_suffix(" GMT")?);

	OffsetDateTime::parse(&normalized, &Rfc2822).ok()
}

/// Uppercase three-letter month abbreviation used by the expiry encoding.
pub(crate) fn month_abbrev(month: Month) -> &'static str {
	MONTH_ABBREVS[month as usize - 1]
}

/// Case-insensitive lookup of a three-letter month abbreviation.
pub(crate) fn month_from_abbrev(raw: &str) -> Option<Month> {
	let index = MONTH_ABBREVS.iter().position(|abbrev| abbrev.eq_ignore_ascii_case(raw))?;

	Month::try_from(index as u8 + 1).ok()
}

/// Last calendar day of the given month.
pub(crate) fn last_day_of_month(year: i32, month: Month) -> Option<Date> {
	Date::from_calendar_date(year, month, util::days_in_year_month(year, month)).ok()
}

/// Serde helpers for `yyyy-MM-dd'T'HH:mm:ss[.SSS]` instants decoded as UTC.
pub mod flexible {
	use super::*;

	/// Serializes with millisecond precision.
	pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let formatted = value
			.to_offset(UtcOffset::UTC)
			.format(ISO_MILLIS)
			.map_err(serde::ser::Error::custom)?;

		serializer.serialize_str(&formatted)
	}

	/// Deserializes, accepting millisecond, second, and minute precision.
	pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = <&str>::deserialize(deserializer)?;

		parse_flexible(raw).map(PrimitiveDateTime::assume_utc).map_err(D::Error::custom)
	}

	/// `Option` wrapper around [`flexible`](self).
	pub mod option {
		use super::*;

		/// Serializes `Some` with millisecond precision, `None` as `null`.
		pub fn serialize<S>(
			value: &Option<OffsetDateTime>,
			serializer: S,
		) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			match value {
				Some(value) => super::serialize(value, serializer),
				None => serializer.serialize_none(),
			}
		}

		/// Deserializes a nullable instant.
		pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
		where
			D: Deserializer<'de>,
		{
			let raw = Option::<&str>::deserialize(deserializer)?;

			raw.map(|raw| {
				parse_flexible(raw).map(PrimitiveDateTime::assume_utc).map_err(D::Error::custom)
			})
			.transpose()
		}
	}
}

/// Serde helpers for bare `yyyy-MM-dd` dates.
pub mod date_only {
	use super::*;

	/// Serializes as `yyyy-MM-dd`.
	pub fn serialize<S>(value: &Date, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let formatted = value.format(DATE_ONLY).map_err(serde::ser::Error::custom)?;

		serializer.serialize_str(&formatted)
	}

	/// Deserializes from `yyyy-MM-dd`.
	pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = <&str>::deserialize(deserializer)?;

		Date::parse(raw, DATE_ONLY).map_err(D::Error::custom)
	}
}

/// Serde helpers for bare `HH:mm:ss` times.
pub mod time_only {
	use super::*;

	/// Serializes as `HH:mm:ss`.
	pub fn serialize<S>(value: &Time, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let formatted = value.format(TIME_ONLY).map_err(serde::ser::Error::custom)?;

		serializer.serialize_str(&formatted)
	}

	/// Deserializes from `HH:mm:ss`.
	pub fn deserialize<'de, D>(deserializer: D) -> Result<Time, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = <&str>::deserialize(deserializer)?;

		Time::parse(raw, TIME_ONLY).map_err(D::Error::custom)
	}

	/// `Option` wrapper around [`time_only`](self).
	pub mod option {
		use super::*;

		/// Serializes `Some` as `HH:mm:ss`, `None` as `null`.
		pub fn serialize<S>(value: &Option<Time>, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			match value {
				Some(value) => super::serialize(value, serializer),
				None => serializer.serialize_none(),
			}
		}

		/// Deserializes a nullable time.
		pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Time>, D::Error>
		where
			D: Deserializer<'de>,
		{
			let raw = Option::<&str>::deserialize(deserializer)?;

			raw.map(|raw| Time::parse(raw, TIME_ONLY).map_err(D::Error::custom)).transpose()
		}
	}
}

/// Serde helpers for local `yyyy/MM/dd HH:mm:ss` datetimes.
///
/// The offset is context-dependent (account timezone), so values stay
/// [`PrimitiveDateTime`] until a decode context fixes them.
pub mod slash_datetime {
	use super::*;

	/// Serializes as `yyyy/MM/dd HH:mm:ss`.
	pub fn serialize<S>(value: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let formatted = value.format(SLASH_DATETIME).map_err(serde::ser::Error::custom)?;

		serializer.serialize_str(&formatted)
	}

	/// Deserializes from `yyyy/MM/dd HH:mm:ss`.
	pub fn deserialize<'de, D>(deserializer: D) -> Result<PrimitiveDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = <&str>::deserialize(deserializer)?;

		PrimitiveDateTime::parse(raw, SLASH_DATETIME).map_err(D::Error::custom)
	}
}
