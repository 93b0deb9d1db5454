//! Open position endpoints: list, read, create, amend, close, and deal confirmation.
//!
//! Closing tunnels `DELETE` semantics through `POST /positions/otc` with the
//! `_method` header, as the gateway requires.

// self
use crate::{
	_prelude::*,
	api::Api,
	auth::{DealId, DealReference, Epic},
	date,
	endpoints::markets::MarketHit,
	http::header,
	market::{Direction, Expiry, PositionStatus},
};

/// Open position endpoints bound to an API handle.
#[derive(Clone, Copy, Debug)]
pub struct Positions<'a> {
	api: &'a Api,
}
impl<'a> Positions<'a> {
	pub(crate) fn new(api: &'a Api) -> Self {
		Self { api }
	}

	/// Lists all open positions (`GET /positions`, version 2).
	pub async fn all(&self) -> Result<Vec<OpenPosition>> {
		let payload = self
			.api
			.request(Method::GET, "positions")
			.version(2)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode::<PositionsPayload>()?;

		Ok(payload.positions)
	}

	/// Fetches one open position (`GET /positions/{dealId}`, version 2).
	pub async fn get(&self, deal_id: &DealId) -> Result<OpenPosition> {
		self.api
			.request(Method::GET, format!("positions/{}", deal_id.as_ref()))
			.version(2)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode()
	}

	/// Opens a position (`POST /positions/otc`, version 2).
	///
	/// Returns the deal reference to confirm with [`Positions::confirmation`].
	pub async fn create(&self, draft: &PositionDraft) -> Result<DealReference> {
		draft.validate()?;

		let payload = self
			.api
			.request(Method::POST, "positions/otc")
			.version(2)
			.with_credentials()
			.json_body(&draft.body())?
			.send(&[StatusCode::OK])
			.await?
			.decode::<DealReferencePayload>()?;

		Ok(payload.deal_reference)
	}

	/// Amends the stop/limit levels of a position
	/// (`PUT /positions/otc/{dealId}`, version 2).
	pub async fn update(
		&self,
		deal_id: &DealId,
		limit_level: Option<f64>,
		stop_level: Option<f64>,
	) -> Result<DealReference> {
		let payload = self
			.api
			.request(Method::PUT, format!("positions/otc/{}", deal_id.as_ref()))
			.version(2)
			.with_credentials()
			.json_body(&UpdateBody { limit_level, stop_level })?
			.send(&[StatusCode::OK])
			.await?
			.decode::<DealReferencePayload>()?;

		Ok(payload.deal_reference)
	}

	/// Closes (part of) a position at market
	/// (`POST /positions/otc` with `_method: DELETE`, version 1).
	///
	/// `direction` is the closing direction, i.e. the opposite of the position's.
	pub async fn close(
		&self,
		deal_id: &DealId,
		direction: Direction,
		size: f64,
	) -> Result<DealReference> {
		if size <= 0.0 {
			return Err(Error::invalid_request("Close size must be a positive number"));
		}

		let payload = self
			.api
			.request(Method::POST, "positions/otc")
			.version(1)
			.with_credentials()
			.header(header::METHOD_OVERRIDE, "DELETE")
			.json_body(&CloseBody {
				deal_id: deal_id.as_ref(),
				direction,
				size,
				order_type: "MARKET",
			})?
			.send(&[StatusCode::OK])
			.await?
			.decode::<DealReferencePayload>()?;

		Ok(payload.deal_reference)
	}

	/// Fetches the confirmation of a deal (`GET /confirms/{dealReference}`, version 1).
	pub async fn confirmation(&self, reference: &DealReference) -> Result<DealConfirmation> {
		self.api
			.request(Method::GET, format!("confirms/{}", reference.as_ref()))
			.version(1)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode()
	}
}

/// One open position together with its market.
#[derive(Clone, Debug, Deserialize)]
pub struct OpenPosition {
	/// The position itself.
	pub position: Position,
	/// Condensed description of the market it is held on.
	pub market: MarketHit,
}

/// One open position.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
	/// Deal identifier.
	pub deal_id: DealId,
	/// Caller-chosen reference, when one was supplied at creation.
	pub deal_reference: Option<DealReference>,
	/// UTC instant the position was opened.
	#[serde(rename = "createdDateUTC", with = "date::flexible")]
	pub created_date_utc: OffsetDateTime,
	/// Deal direction.
	pub direction: Direction,
	/// Contract size.
	pub contract_size: f64,
	/// Deal size.
	pub size: f64,
	/// Opening level.
	pub level: f64,
	/// Attached limit level, if any.
	pub limit_level: Option<f64>,
	/// Attached stop level, if any.
	pub stop_level: Option<f64>,
	/// Position currency code.
	pub currency: String,
	/// Whether the stop is guaranteed.
	pub controlled_risk: bool,
}

/// How a position creation should execute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PositionOrder {
	/// Execute at the current market level.
	Market,
	/// Execute at `level` or better.
	Limit {
		/// Level to execute at or better.
		level: f64,
	},
}

/// Parameters for opening a position.
#[derive(Clone, Debug)]
pub struct PositionDraft {
	/// Instrument to deal on.
	pub epic: Epic,
	/// Instrument expiry.
	pub expiry: Expiry,
	/// Deal direction.
	pub direction: Direction,
	/// Deal size; must be positive.
	pub size: f64,
	/// Execution rule.
	pub order: PositionOrder,
	/// Deal currency code.
	pub currency_code: String,
	/// Whether to force open a new position rather than net against existing ones.
	pub force_open: bool,
	/// Whether the stop is guaranteed.
	pub guaranteed_stop: bool,
	/// Limit level, mutually exclusive with `limit_distance`.
	pub limit_level: Option<f64>,
	/// Limit distance, mutually exclusive with `limit_level`.
	pub limit_distance: Option<f64>,
	/// Stop level, mutually exclusive with `stop_distance`.
	pub stop_level: Option<f64>,
	/// Stop distance, mutually exclusive with `stop_level`.
	pub stop_distance: Option<f64>,
	/// Caller-chosen reference to recognize the deal by.
	pub deal_reference: Option<DealReference>,
}
impl PositionDraft {
	/// Market-order draft with everything optional left out.
	pub fn market(epic: Epic, direction: Direction, size: f64, currency_code: &str) -> Self {
		Self {
			epic,
			expiry: Expiry::None,
			direction,
			size,
			order: PositionOrder::Market,
			currency_code: currency_code.to_owned(),
			force_open: false,
			guaranteed_stop: false,
			limit_level: None,
			limit_distance: None,
			stop_level: None,
			stop_distance: None,
			deal_reference: None,
		}
	}

	fn validate(&self) -> Result<()> {
		if self.size <= 0.0 {
			return Err(Error::invalid_request("Position size must be a positive number"));
		}
		if self.limit_level.is_some() && self.limit_distance.is_some() {
			return Err(Error::invalid_request(
				"You cannot set both a limit level and a limit distance",
			));
		}
		if self.stop_level.is_some() && self.stop_distance.is_some() {
			return Err(Error::invalid_request(
				"You cannot set both a stop level and a stop distance",
			));
		}
		if self.guaranteed_stop && self.stop_level.is_none() && self.stop_distance.is_none() {
			return Err(Error::invalid_request("A guaranteed stop requires a stop"));
		}

		Ok(())
	}

	fn body(&self) -> CreateBody<'_> {
		let (order_type, level) = match self.order {
			PositionOrder::Market => ("MARKET", None),
			PositionOrder::Limit { level } => ("LIMIT", Some(level)),
		};

		CreateBody {
			epic: self.epic.as_ref(),
			expiry: self.expiry.encode(),
			direction: self.direction,
			size: self.size,
			order_type,
			level,
			currency_code: &self.currency_code,
			force_open: self.force_open,
			guaranteed_stop: self.guaranteed_stop,
			limit_level: self.limit_level,
			limit_distance: self.limit_distance,
			stop_level: self.stop_level,
			stop_distance: self.stop_distance,
			deal_reference: self.deal_reference.as_ref().map(AsRef::as_ref),
		}
	}
}

/// Confirmation of a deal previously referenced by its [`DealReference`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealConfirmation {
	/// Instant of the confirmation.
	#[serde(with = "date::flexible")]
	pub date: OffsetDateTime,
	/// Permanent deal identifier.
	pub deal_id: DealId,
	/// Reference the deal was created under.
	pub deal_reference: DealReference,
	/// Whether the deal was accepted.
	pub deal_status: DealStatus,
	/// Position lifecycle state after the deal, when applicable.
	pub status: Option<PositionStatus>,
	/// Instrument dealt on.
	pub epic: Epic,
	/// Deal direction.
	pub direction: Direction,
	/// Deal size, absent on rejection.
	pub size: Option<f64>,
	/// Execution level, absent on rejection.
	pub level: Option<f64>,
	/// Rejection reason label, `SUCCESS` on acceptance.
	pub reason: Option<String>,
}

/// Acceptance state of a deal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealStatus {
	/// The deal went through.
	Accepted,
	/// The deal was rejected.
	Rejected,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DealReferencePayload {
	pub(crate) deal_reference: DealReference,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody<'a> {
	epic: &'a str,
	expiry: String,
	direction: Direction,
	size: f64,
	order_type: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	level: Option<f64>,
	currency_code: &'a str,
	force_open: bool,
	guaranteed_stop: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	limit_level: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	limit_distance: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	stop_level: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	stop_distance: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	deal_reference: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody {
	limit_level: Option<f64>,
	stop_level: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CloseBody<'a> {
	deal_id: &'a str,
	direction: Direction,
	size: f64,
	order_type: &'static str,
}

#[derive(Deserialize)]
struct PositionsPayload {
	positions: Vec<OpenPosition>,
}
