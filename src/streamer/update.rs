//! Subscription vocabulary and the raw update map.

// self
use crate::_prelude::*;

/// Subscription mode of the multiplexed transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
	/// Later field values merge over earlier ones; suited to slowly changing items.
	Merge,
	/// Every update is delivered distinctly; suited to tick-like items.
	Distinct,
}
impl Mode {
	/// Wire value of the mode.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Merge => "MERGE",
			Self::Distinct => "DISTINCT",
		}
	}
}

/// One subscription request handed to the transport.
#[derive(Clone, Debug)]
pub struct Subscription {
	/// Delivery mode.
	pub mode: Mode,
	/// Item name, e.g. `CHART:CS.D.EURUSD.MINI.IP:TICK`.
	pub item: String,
	/// Fields to deliver.
	pub fields: Vec<String>,
	/// Whether an initial snapshot of the current state is requested.
	pub snapshot: bool,
}

/// One server-pushed update: field name to optional textual value.
///
/// Absent and null-valued fields are indistinguishable to consumers; both read as
/// `None`.
#[derive(Clone, Debug, Default)]
pub struct Update {
	item: String,
	fields: BTreeMap<String, Option<String>>,
}
impl Update {
	/// Builds an update for `item` from field/value pairs.
	pub fn new(
		item: impl Into<String>,
		fields: impl IntoIterator<Item = (String, Option<String>)>,
	) -> Self {
		Self { item: item.into(), fields: fields.into_iter().collect() }
	}

	/// Item this update belongs to.
	pub fn item(&self) -> &str {
		&self.item
	}

	/// Textual value of `field`, when present and non-null.
	pub fn value(&self, field: &str) -> Option<&str> {
		self.fields.get(field).and_then(|value| value.as_deref())
	}

	/// Decimal value of `field`; unparseable text is a decode failure.
	pub fn decimal(&self, field: &str) -> Result<Option<f64>> {
		self.value(field)
			.map(|raw| {
				raw.parse::<f64>().map_err(|_| {
					Error::streamer(
						format!("field `{field}` value `{raw}` is not a decimal"),
						Some(self.item.clone()),
					)
				})
			})
			.transpose()
	}

	/// Instant value of `field`, encoded as milliseconds since the Unix epoch.
	pub fn millis_instant(&self, field: &str) -> Result<Option<OffsetDateTime>> {
		self.value(field)
			.map(|raw| {
				let millis = raw.parse::<i128>().map_err(|_| {
					Error::streamer(
						format!("field `{field}` value `{raw}` is not an epoch millisecond count"),
						Some(self.item.clone()),
					)
				})?;

				OffsetDateTime::from_unix_timestamp_nanos(millis * 1_000_000).map_err(|_| {
					Error::streamer(
						format!("field `{field}` value `{raw}` is outside the representable range"),
						Some(self.item.clone()),
					)
				})
			})
			.transpose()
	}
}
