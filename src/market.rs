//! Closed string-encoded vocabularies shared by market and dealing payloads.
//!
//! Every enum here rejects unknown wire values; aliases are accepted where the
//! gateway emits more than one spelling for the same state.

// self
use crate::{_prelude::*, date};

/// Dealing state of a market.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
	/// Open for dealing.
	Tradeable,
	/// Closed outside market hours.
	Closed,
	/// Open for position edits only.
	EditsOnly,
	/// In auction.
	OnAuction,
	/// In auction with edits suspended.
	OnAuctionNoEdits,
	/// Offline.
	Offline,
	/// Suspended by the platform.
	Suspended,
}

/// Deal direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
	/// Long.
	Buy,
	/// Short.
	Sell,
}
impl Direction {
	/// The opposite direction.
	pub fn oppose(self) -> Self {
		match self {
			Self::Buy => Self::Sell,
			Self::Sell => Self::Buy,
		}
	}
}

/// Lifecycle state of a position; the gateway emits two spellings for two of the
/// states and both are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
	/// Newly opened (`OPEN`, also emitted as `OPENED`).
	#[serde(rename = "OPEN", alias = "OPENED")]
	Open,
	/// Amended after opening.
	#[serde(rename = "AMENDED")]
	Amended,
	/// Partially closed.
	#[serde(rename = "PARTIALLY_CLOSED")]
	PartiallyClosed,
	/// Fully closed (`FULLY_CLOSED`, also emitted as `CLOSED`).
	#[serde(rename = "FULLY_CLOSED", alias = "CLOSED")]
	Closed,
	/// Deleted.
	#[serde(rename = "DELETED")]
	Deleted,
}

/// Working-order kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkingOrderType {
	/// Execute at the given level or better.
	Limit,
	/// Execute once the given level trades.
	Stop,
}

/// Expiration rule of a working order. `GoodTillDate` requires the date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkingOrderExpiration {
	/// The order rests until cancelled.
	GoodTillCancelled,
	/// The order rests until the given instant (account-local).
	GoodTillDate(PrimitiveDateTime),
}
impl WorkingOrderExpiration {
	/// Wire value of the `timeInForce` field.
	pub fn time_in_force(&self) -> &'static str {
		match self {
			Self::GoodTillCancelled => "GOOD_TILL_CANCELLED",
			Self::GoodTillDate(_) => "GOOD_TILL_DATE",
		}
	}

	/// Wire value of the `goodTillDate` field, when applicable.
	pub fn good_till_date(&self) -> Option<PrimitiveDateTime> {
		match self {
			Self::GoodTillCancelled => None,
			Self::GoodTillDate(date) => Some(*date),
		}
	}
}

/// Error produced when an expiry string cannot be interpreted.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unrecognized instrument expiry: `{raw}`.")]
pub struct ExpiryParseError {
	/// The offending wire value.
	pub raw: String,
}

/// Instrument expiry, a single string field on the wire.
///
/// `"-"` means no expiry, `"DFB"` (case-insensitive) a daily funded bet, anything
/// else a forward expiring on a concrete date. `MMM-yy` values decode to the last
/// day of that month and re-encode to the same shape; other dates round-trip as
/// `dd-MMM-yy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expiry {
	/// The instrument does not expire.
	None,
	/// Daily funded bet; indefinite expiry with daily funding.
	DailyFunded,
	/// Forward expiring on the carried date.
	Forward(Date),
}
impl Expiry {
	/// Parses the wire encoding.
	pub fn parse(raw: &str) -> Result<Self, ExpiryParseError> {
		let unknown = || ExpiryParseError { raw: raw.to_owned() };

		if raw == "-" {
			return Ok(Self::None);
		}
		if raw.eq_ignore_ascii_case("DFB") {
			return Ok(Self::DailyFunded);
		}

		let segments = raw.split('-').collect::<Vec<_>>();

		match segments.as_slice() {
			[day, month, year] if day.len() <= 2 => {
				let day = day.parse::<u8>().map_err(|_| unknown())?;
				let month = date::month_from_abbrev(month).ok_or_else(unknown)?;
				let year = parse_two_digit_year(year).ok_or_else(unknown)?;
				let date =
					Date::from_calendar_date(year, month, day).map_err(|_| unknown())?;

				Ok(Self::Forward(date))
			},
			[month, year] => {
				let month = date::month_from_abbrev(month).ok_or_else(unknown)?;
				let year = parse_two_digit_year(year).ok_or_else(unknown)?;
				let date = date::last_day_of_month(year, month).ok_or_else(unknown)?;

				Ok(Self::Forward(date))
			},
			_ => {
				// ISO without timezone; the date portion carries the expiry.
				let datetime = date::parse_flexible(raw)
					.map(|parsed| parsed.date())
					.or_else(|_| Date::parse(raw, date::DATE_ONLY))
					.map_err(|_| unknown())?;

				Ok(Self::Forward(datetime))
			},
		}
	}

	/// Produces the wire encoding.
	pub fn encode(&self) -> String {
		match self {
			Self::None => "-".into(),
			Self::DailyFunded => "DFB".into(),
			Self::Forward(date) => {
				let month = date::month_abbrev(date.month());
				let year = date.year().rem_euclid(100);

				if date::last_day_of_month(date.year(), date.month()) == Some(*date) {
					format!("{month}-{year:02}")
				} else {
					format!("{:02}-{month}-{year:02}", date.day())
				}
			},
		}
	}
}
impl TryFrom<String> for Expiry {
	type Error = ExpiryParseError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}
impl From<Expiry> for String {
	fn from(value: Expiry) -> Self {
		value.encode()
	}
}
impl Display for Expiry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.encode())
	}
}

fn parse_two_digit_year(raw: &str) -> Option<i32> {
	if raw.len() != 2 {
		return None;
	}

	raw.parse::<i32>().ok().map(|year| 2000 + year)
}
