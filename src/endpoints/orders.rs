//! Working order endpoints: list, create, amend, delete.

// self
use crate::{
	_prelude::*,
	api::Api,
	auth::{DealId, DealReference, Epic},
	date,
	endpoints::{markets::MarketHit, positions::DealReferencePayload},
	error::Suggestion,
	market::{Direction, Expiry, WorkingOrderExpiration, WorkingOrderType},
};

/// Working order endpoints bound to an API handle.
#[derive(Clone, Copy, Debug)]
pub struct WorkingOrders<'a> {
	api: &'a Api,
}
impl<'a> WorkingOrders<'a> {
	pub(crate) fn new(api: &'a Api) -> Self {
		Self { api }
	}

	/// Lists all resting working orders (`GET /workingorders`, version 2).
	pub async fn all(&self) -> Result<Vec<WorkingOrder>> {
		let payload = self
			.api
			.request(Method::GET, "workingorders")
			.version(2)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode::<WorkingOrdersPayload>()?;

		Ok(payload.working_orders)
	}

	/// Creates a working order (`POST /workingorders/otc`, version 2).
	pub async fn create(&self, draft: &WorkingOrderDraft) -> Result<DealReference> {
		draft.validate()?;

		let payload = self
			.api
			.request(Method::POST, "workingorders/otc")
			.version(2)
			.with_credentials()
			.json_body(&draft.body()?)?
			.send(&[StatusCode::OK])
			.await?
			.decode::<DealReferencePayload>()?;

		Ok(payload.deal_reference)
	}

	/// Amends the level and expiration of a working order
	/// (`PUT /workingorders/otc/{dealId}`, version 2).
	pub async fn update(
		&self,
		deal_id: &DealId,
		level: f64,
		expiration: WorkingOrderExpiration,
	) -> Result<DealReference> {
		let payload = self
			.api
			.request(Method::PUT, format!("workingorders/otc/{}", deal_id.as_ref()))
			.version(2)
			.with_credentials()
			.json_body(&UpdateBody {
				level,
				time_in_force: expiration.time_in_force(),
				good_till_date: format_good_till_date(&expiration)?,
			})?
			.send(&[StatusCode::OK])
			.await?
			.decode::<DealReferencePayload>()?;

		Ok(payload.deal_reference)
	}

	/// Deletes a working order (`DELETE /workingorders/otc/{dealId}`, version 2).
	pub async fn delete(&self, deal_id: &DealId) -> Result<DealReference> {
		let payload = self
			.api
			.request(Method::DELETE, format!("workingorders/otc/{}", deal_id.as_ref()))
			.version(2)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode::<DealReferencePayload>()?;

		Ok(payload.deal_reference)
	}
}

/// One resting working order together with its market.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingOrder {
	/// The order itself.
	#[serde(rename = "workingOrderData")]
	pub data: WorkingOrderData,
	/// Condensed description of the market it rests on.
	#[serde(rename = "marketData")]
	pub market: MarketHit,
}

/// One resting working order.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingOrderData {
	/// Deal identifier.
	pub deal_id: DealId,
	/// Order direction.
	pub direction: Direction,
	/// Instrument the order rests on.
	pub epic: Epic,
	/// Order size.
	pub order_size: f64,
	/// Resting level.
	pub order_level: f64,
	/// Order kind.
	pub order_type: WorkingOrderType,
	/// Order currency code.
	pub currency_code: String,
	/// UTC instant the order was created.
	#[serde(rename = "createdDateUTC", with = "date::flexible")]
	pub created_date_utc: OffsetDateTime,
	/// Whether the stop is guaranteed.
	#[serde(default)]
	pub guaranteed_stop: bool,
}

/// Parameters for creating a working order.
#[derive(Clone, Debug)]
pub struct WorkingOrderDraft {
	/// Instrument to rest the order on.
	pub epic: Epic,
	/// Instrument expiry.
	pub expiry: Expiry,
	/// Order direction.
	pub direction: Direction,
	/// Order size; must be positive.
	pub size: f64,
	/// Level to rest at.
	pub level: f64,
	/// Order kind.
	pub kind: WorkingOrderType,
	/// Expiration rule.
	pub expiration: WorkingOrderExpiration,
	/// Order currency code.
	pub currency_code: String,
	/// Whether the stop is guaranteed.
	pub guaranteed_stop: bool,
	/// Caller-chosen reference to recognize the deal by.
	pub deal_reference: Option<DealReference>,
}
impl WorkingOrderDraft {
	fn validate(&self) -> Result<()> {
		if self.size <= 0.0 {
			return Err(Error::invalid_request("Order size must be a positive number"));
		}

		Ok(())
	}

	fn body(&self) -> Result<CreateBody<'_>> {
		Ok(CreateBody {
			epic: self.epic.as_ref(),
			expiry: self.expiry.encode(),
			direction: self.direction,
			size: self.size,
			level: self.level,
			order_type: self.kind,
			time_in_force: self.expiration.time_in_force(),
			good_till_date: format_good_till_date(&self.expiration)?,
			currency_code: &self.currency_code,
			guaranteed_stop: self.guaranteed_stop,
			deal_reference: self.deal_reference.as_ref().map(AsRef::as_ref),
		})
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody<'a> {
	epic: &'a str,
	expiry: String,
	direction: Direction,
	size: f64,
	level: f64,
	#[serde(rename = "type")]
	order_type: WorkingOrderType,
	time_in_force: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	good_till_date: Option<String>,
	currency_code: &'a str,
	guaranteed_stop: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	deal_reference: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody {
	level: f64,
	time_in_force: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	good_till_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkingOrdersPayload {
	working_orders: Vec<WorkingOrder>,
}

/// The gateway expects `yyyy/MM/dd HH:mm:ss` for `goodTillDate`.
fn format_good_till_date(expiration: &WorkingOrderExpiration) -> Result<Option<String>> {
	expiration
		.good_till_date()
		.map(|instant| {
			instant.format(date::SLASH_DATETIME).map_err(|e| Error::InvalidRequest {
				message: "goodTillDate could not be formatted".into(),
				request: None,
				source: Some(Box::new(e)),
				suggestion: Suggestion::FileBug,
				context: Vec::new(),
			})
		})
		.transpose()
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn good_till_date_uses_the_slash_encoding() {
		let expiration =
			WorkingOrderExpiration::GoodTillDate(macros::datetime!(2026-03-01 12:30:00));
		let formatted = format_good_till_date(&expiration)
			.expect("Formatting should succeed.")
			.expect("A dated expiration carries a date.");

		assert_eq!(formatted, "2026/03/01 12:30:00");
		assert_eq!(
			format_good_till_date(&WorkingOrderExpiration::GoodTillCancelled)
				.expect("Formatting should succeed."),
			None
		);
	}

	#[test]
	fn create_bodies_render_the_expiration_pair() {
		let draft = WorkingOrderDraft {
			epic: Epic::new("CS.D.EURUSD.MINI.IP").expect("Epic fixture should be valid."),
			expiry: Expiry::DailyFunded,
			direction: Direction::Sell,
			size: 2.0,
			level: 1.09,
			kind: WorkingOrderType::Limit,
			expiration: WorkingOrderExpiration::GoodTillDate(macros::datetime!(2026-03-01 12:30:00)),
			currency_code: "USD".into(),
			guaranteed_stop: false,
			deal_reference: None,
		};
		let rendered = serde_json::to_string(&draft.body().expect("Body should build."))
			.expect("Body should serialize.");

		assert!(rendered.contains("\"timeInForce\":\"GOOD_TILL_DATE\""));
		assert!(rendered.contains("\"goodTillDate\":\"2026/03/01 12:30:00\""));
		assert!(rendered.contains("\"expiry\":\"DFB\""));
	}
}
