//! Market data endpoints: bulk fetch by epics, single market details, and search.

// std
use std::collections::HashSet;
// crates.io
use time::Time;
// self
use crate::{
	_prelude::*,
	api::Api,
	auth::Epic,
	date,
	market::{Expiry, MarketStatus},
	pipeline::DecodeContext,
};

/// Most epics a single bulk request may carry.
const MAX_EPICS: usize = 50;

/// Market data endpoints bound to an API handle.
#[derive(Clone, Copy, Debug)]
pub struct Markets<'a> {
	api: &'a Api,
}
impl<'a> Markets<'a> {
	pub(crate) fn new(api: &'a Api) -> Self {
		Self { api }
	}

	/// Fetches details for 1 to 50 unique epics (`GET /markets`, version 2).
	///
	/// Snapshot update times are resolved against the account timezone and the
	/// server response date.
	pub async fn get_by_epics(&self, epics: &[Epic]) -> Result<Vec<MarketDetails>> {
		if epics.is_empty() {
			return Err(Error::invalid_request("You must pass at least one epic"));
		}
		if epics.len() > MAX_EPICS {
			return Err(Error::invalid_request("You cannot pass more than 50 epics"));
		}
		if epics.iter().collect::<HashSet<_>>().len() != epics.len() {
			return Err(Error::invalid_request("Epics must be unique"));
		}

		let csv = epics.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
		let details = self
			.api
			.request(Method::GET, "markets")
			.version(2)
			.with_credentials()
			.query("epics", csv)
			.query("filter", "ALL")
			.send(&[StatusCode::OK])
			.await?
			.decode_with(|context, data| {
				let mut deserializer = serde_json::Deserializer::from_slice(data);
				let payload: MarketsPayload = serde_path_to_error::deserialize(&mut deserializer)?;

				Ok::<_, serde_path_to_error::Error<serde_json::Error>>(
					payload
						.market_details
						.into_iter()
						.map(|raw| raw.resolve(context))
						.collect::<Vec<_>>(),
				)
			})?;

		Ok(details)
	}

	/// Fetches details for a single epic (`GET /markets/{epic}`, version 3).
	pub async fn get(&self, epic: &Epic) -> Result<MarketDetails> {
		self.api
			.request(Method::GET, format!("markets/{}", epic.as_ref()))
			.version(3)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode_with(|context, data| {
				let mut deserializer = serde_json::Deserializer::from_slice(data);
				let raw: RawMarketDetails = serde_path_to_error::deserialize(&mut deserializer)?;

				Ok::<_, serde_path_to_error::Error<serde_json::Error>>(raw.resolve(context))
			})
	}

	/// Searches markets by free text (`GET /markets?searchTerm=`, version 1).
	pub async fn search(&self, term: &str) -> Result<Vec<MarketHit>> {
		if term.trim().is_empty() {
			return Err(Error::invalid_request("Search term cannot be empty"));
		}

		let payload = self
			.api
			.request(Method::GET, "markets")
			.version(1)
			.with_credentials()
			.query("searchTerm", term)
			.send(&[StatusCode::OK])
			.await?
			.decode::<SearchPayload>()?;

		Ok(payload.markets)
	}
}

/// Full details of one market.
#[derive(Clone, Debug)]
pub struct MarketDetails {
	/// The tradable instrument.
	pub instrument: Instrument,
	/// Current price snapshot.
	pub snapshot: MarketSnapshot,
	/// Dealing constraints, when the endpoint version delivers them.
	pub dealing_rules: Option<DealingRules>,
}

/// Static description of a tradable instrument.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
	/// Instrument identifier.
	pub epic: Epic,
	/// Display name.
	pub name: String,
	/// Underlying real-world instrument identifier used by research endpoints.
	pub market_id: String,
	/// Instrument category.
	#[serde(rename = "type")]
	pub kind: InstrumentType,
	/// Expiry encoding; see [`Expiry`].
	pub expiry: Expiry,
	/// Contract lot size, when the instrument defines one.
	pub lot_size: Option<f64>,
	/// Whether the instrument streams live prices.
	#[serde(default)]
	pub streaming_prices_available: bool,
}

/// Category of an instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentType {
	/// Binary bet.
	Binary,
	/// Commodity.
	Commodities,
	/// Currency pair.
	Currencies,
	/// Stock index.
	Indices,
	/// Option on a commodity.
	OptCommodities,
	/// Option on a currency pair.
	OptCurrencies,
	/// Option on an index.
	OptIndices,
	/// Option on rates.
	OptRates,
	/// Option on shares.
	OptShares,
	/// Interest rates.
	Rates,
	/// Market sector.
	Sectors,
	/// Shares.
	Shares,
	/// Spread bet.
	Spreadbet,
	/// Platform test market.
	TestMarket,
	/// Category unknown to the platform.
	Unknown,
}

/// Current price snapshot of a market.
#[derive(Clone, Debug)]
pub struct MarketSnapshot {
	/// Dealing state.
	pub market_status: MarketStatus,
	/// Bid price.
	pub bid: Option<f64>,
	/// Offer price.
	pub offer: Option<f64>,
	/// Session high.
	pub high: Option<f64>,
	/// Session low.
	pub low: Option<f64>,
	/// Absolute change since the previous close.
	pub net_change: Option<f64>,
	/// Relative change since the previous close.
	pub percentage_change: Option<f64>,
	/// Instant of the last update, resolved against the account timezone and the
	/// server response date; absent when either side is missing.
	pub update_time: Option<OffsetDateTime>,
	/// Price delay in minutes.
	pub delay_time: f64,
	/// Factor to scale prices by.
	pub scaling_factor: f64,
}

/// One dealing constraint: a value with its unit.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealingRule {
	/// Unit the value is expressed in.
	pub unit: RuleUnit,
	/// Constraint value.
	pub value: f64,
}

/// Unit of a dealing constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleUnit {
	/// Percentage of the price.
	Percentage,
	/// Price points.
	Points,
}

/// Dealing constraints of a market.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealingRules {
	/// Smallest deal size accepted.
	pub min_deal_size: DealingRule,
	/// Smallest distance of a normal stop or limit.
	pub min_normal_stop_or_limit_distance: DealingRule,
	/// Smallest distance of a guaranteed stop.
	pub min_controlled_risk_stop_distance: DealingRule,
	/// Smallest step distance.
	pub min_step_distance: DealingRule,
	/// Largest distance of a stop or limit.
	pub max_stop_or_limit_distance: DealingRule,
}

/// Condensed market description returned by search, navigation, and watchlists.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketHit {
	/// Instrument identifier.
	pub epic: Epic,
	/// Display name.
	pub instrument_name: String,
	/// Instrument category.
	pub instrument_type: InstrumentType,
	/// Expiry encoding.
	pub expiry: Expiry,
	/// Dealing state.
	pub market_status: MarketStatus,
	/// Bid price.
	pub bid: Option<f64>,
	/// Offer price.
	pub offer: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketsPayload {
	market_details: Vec<RawMarketDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPayload {
	markets: Vec<MarketHit>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMarketDetails {
	instrument: Instrument,
	snapshot: RawSnapshot,
	dealing_rules: Option<DealingRules>,
}
impl RawMarketDetails {
	fn resolve(self, context: &DecodeContext) -> MarketDetails {
		MarketDetails {
			instrument: self.instrument,
			snapshot: self.snapshot.resolve(context),
			dealing_rules: self.dealing_rules,
		}
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
	market_status: MarketStatus,
	bid: Option<f64>,
	offer: Option<f64>,
	high: Option<f64>,
	low: Option<f64>,
	net_change: Option<f64>,
	percentage_change: Option<f64>,
	#[serde(default, with = "date::time_only::option")]
	update_time: Option<Time>,
	#[serde(default)]
	delay_time: f64,
	#[serde(default = "default_scaling_factor")]
	scaling_factor: f64,
}
impl RawSnapshot {
	fn resolve(self, context: &DecodeContext) -> MarketSnapshot {
		MarketSnapshot {
			market_status: self.market_status,
			bid: self.bid,
			offer: self.offer,
			high: self.high,
			low: self.low,
			net_change: self.net_change,
			percentage_change: self.percentage_change,
			update_time: resolve_update_time(self.update_time, context),
			delay_time: self.delay_time,
			scaling_factor: self.scaling_factor,
		}
	}
}

fn default_scaling_factor() -> f64 {
	1.0
}

/// Combines a local wall-clock update time with the server date and the account
/// timezone into an absolute instant.
fn resolve_update_time(raw: Option<Time>, context: &DecodeContext) -> Option<OffsetDateTime> {
	let time = raw?;
	let server_date = context.server_date?;
	let local_day = server_date.to_offset(context.timezone).date();

	Some(PrimitiveDateTime::new(local_day, time).assume_offset(context.timezone))
}
