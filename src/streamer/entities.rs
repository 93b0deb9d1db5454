//! Typed entities decoded from raw streaming updates.

// self
use crate::{
	_prelude::*,
	auth::{AccountId, DealId, DealReference, Epic},
	endpoints::positions::DealStatus,
	error::Suggestion,
	market::{Direction, PositionStatus},
	streamer::update::Update,
};

/// One price tick of an instrument.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartTick {
	/// Bid price, when the update carried one.
	pub bid: Option<f64>,
	/// Offer price, when the update carried one.
	pub offer: Option<f64>,
	/// Instant of the tick.
	pub date: Option<OffsetDateTime>,
	/// Last traded volume.
	pub volume: Option<f64>,
}
impl ChartTick {
	/// Fields this entity consumes.
	pub const FIELDS: [&'static str; 4] = ["BID", "OFR", "UTM", "LTV"];

	/// Item name of the tick stream for `epic`.
	pub fn item(epic: &Epic) -> String {
		format!("CHART:{}:TICK", epic.as_ref())
	}

	/// Decodes one update.
	pub fn from_update(update: &Update) -> Result<Self> {
		Ok(Self {
			bid: update.decimal("BID")?,
			offer: update.decimal("OFR")?,
			date: update.millis_instant("UTM")?,
			volume: update.decimal("LTV")?,
		})
	}
}

/// Balance delta of an account.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccountUpdate {
	/// Running profit and loss.
	pub profit_loss: Option<f64>,
	/// Margin deposit in use.
	pub deposit: Option<f64>,
	/// Cash available to deal.
	pub available_cash: Option<f64>,
	/// Total funds.
	pub funds: Option<f64>,
	/// Margin requirement.
	pub margin: Option<f64>,
	/// Account equity.
	pub equity: Option<f64>,
}
impl AccountUpdate {
	/// Fields this entity consumes.
	pub const FIELDS: [&'static str; 6] =
		["PNL", "DEPOSIT", "AVAILABLE_CASH", "FUNDS", "MARGIN", "EQUITY"];

	/// Item name of the balance stream for `account`.
	pub fn item(account: &AccountId) -> String {
		format!("ACCOUNT:{}", account.as_ref())
	}

	/// Decodes one update.
	pub fn from_update(update: &Update) -> Result<Self> {
		Ok(Self {
			profit_loss: update.decimal("PNL")?,
			deposit: update.decimal("DEPOSIT")?,
			available_cash: update.decimal("AVAILABLE_CASH")?,
			funds: update.decimal("FUNDS")?,
			margin: update.decimal("MARGIN")?,
			equity: update.decimal("EQUITY")?,
		})
	}
}

/// Open-position change pushed on the trade stream.
///
/// The payload arrives as JSON inside the `OPU` field.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealUpdate {
	/// Permanent deal identifier.
	pub deal_id: DealId,
	/// Reference the deal was created under, when one was supplied.
	pub deal_reference: Option<DealReference>,
	/// Whether the change was accepted.
	pub deal_status: DealStatus,
	/// Position lifecycle state after the change.
	pub status: PositionStatus,
	/// Instrument dealt on.
	pub epic: Epic,
	/// Deal direction.
	pub direction: Direction,
	/// Deal size, when applicable.
	pub size: Option<f64>,
	/// Execution level, when applicable.
	pub level: Option<f64>,
}
impl DealUpdate {
	/// Fields the trade stream delivers.
	pub const FIELDS: [&'static str; 3] = ["CONFIRMS", "OPU", "WOU"];

	/// Item name of the trade stream for `account`.
	pub fn item(account: &AccountId) -> String {
		format!("TRADE:{}", account.as_ref())
	}

	/// Decodes one update; `None` when it carries no open-position payload.
	pub fn from_update(update: &Update) -> Result<Option<Self>> {
		let Some(raw) = update.value("OPU") else {
			return Ok(None);
		};

		serde_json::from_str(raw).map(Some).map_err(|e| Error::Streamer {
			message: "the OPU payload could not be decoded".into(),
			item: Some(update.item().to_owned()),
			source: Some(Box::new(e)),
			suggestion: Suggestion::ReviewError,
			context: Vec::new(),
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn chart_ticks_decode_partial_updates() {
		let update = Update::new(
			"CHART:CS.D.EURUSD.MINI.IP:TICK",
			[
				("BID".to_owned(), Some("1.0925".to_owned())),
				("UTM".to_owned(), Some("1734264000000".to_owned())),
			],
		);
		let tick = ChartTick::from_update(&update).expect("A partial tick should decode.");

		assert_eq!(tick.bid, Some(1.0925));
		assert_eq!(tick.offer, None);
		assert!(tick.date.is_some());
	}

	#[test]
	fn account_updates_surface_bad_decimals_as_streamer_errors() {
		let update = Update::new(
			"ACCOUNT:Z3TWI9",
			[("PNL".to_owned(), Some("not-a-number".to_owned()))],
		);

		assert!(matches!(
			AccountUpdate::from_update(&update),
			Err(Error::Streamer { .. })
		));
	}

	#[test]
	fn deal_updates_decode_the_opu_payload() {
		let payload = r#"{
			"dealId": "DIAAAABBBCCC123",
			"dealReference": "my_ref-01",
			"dealStatus": "ACCEPTED",
			"status": "OPEN",
			"epic": "CS.D.EURUSD.MINI.IP",
			"direction": "BUY",
			"size": 1.5,
			"level": 1.0931
		}"#;
		let update =
			Update::new("TRADE:Z3TWI9", [("OPU".to_owned(), Some(payload.to_owned()))]);
		let decoded = DealUpdate::from_update(&update)
			.expect("A well-formed OPU payload should decode.")
			.expect("The update carries an OPU payload.");

		assert_eq!(decoded.deal_id.as_ref(), "DIAAAABBBCCC123");
		assert_eq!(decoded.status, PositionStatus::Open);
		assert_eq!(decoded.direction, Direction::Buy);

		let without = Update::new("TRADE:Z3TWI9", [("WOU".to_owned(), Some("{}".to_owned()))]);

		assert!(
			DealUpdate::from_update(&without)
				.expect("Updates without OPU decode to nothing.")
				.is_none()
		);
	}

	#[test]
	fn malformed_opu_payloads_fail_with_evidence() {
		let update = Update::new("TRADE:Z3TWI9", [("OPU".to_owned(), Some("{".to_owned()))]);
		let Err(Error::Streamer { item, source, .. }) = DealUpdate::from_update(&update) else {
			panic!("Malformed OPU payloads should fail as streamer errors.");
		};

		assert_eq!(item.as_deref(), Some("TRADE:Z3TWI9"));
		assert!(source.is_some());
	}
}
