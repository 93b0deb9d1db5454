//! Client sentiment endpoints, keyed by market id rather than epic.

// self
use crate::{_prelude::*, api::Api};

/// Client sentiment endpoints bound to an API handle.
#[derive(Clone, Copy, Debug)]
pub struct Sentiment<'a> {
	api: &'a Api,
}
impl<'a> Sentiment<'a> {
	pub(crate) fn new(api: &'a Api) -> Self {
		Self { api }
	}

	/// Fetches sentiment for one market (`GET /clientsentiment/{marketId}`, version 1).
	pub async fn get(&self, market_id: &str) -> Result<MarketSentiment> {
		validate_market_id(market_id)?;

		self.api
			.request(Method::GET, format!("clientsentiment/{market_id}"))
			.version(1)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode()
	}

	/// Fetches sentiment for several markets at once
	/// (`GET /clientsentiment?marketIds=csv`, version 1).
	pub async fn get_many(&self, market_ids: &[&str]) -> Result<Vec<MarketSentiment>> {
		if market_ids.is_empty() {
			return Err(Error::invalid_request("You must pass at least one market identifier"));
		}

		for market_id in market_ids {
			validate_market_id(market_id)?;
		}

		let payload = self
			.api
			.request(Method::GET, "clientsentiment")
			.version(1)
			.with_credentials()
			.query("marketIds", market_ids.join(","))
			.send(&[StatusCode::OK])
			.await?
			.decode::<SentimentsPayload>()?;

		Ok(payload.client_sentiments)
	}

	/// Fetches sentiment for markets related to one market
	/// (`GET /clientsentiment/related/{marketId}`, version 1).
	pub async fn related(&self, market_id: &str) -> Result<Vec<MarketSentiment>> {
		validate_market_id(market_id)?;

		let payload = self
			.api
			.request(Method::GET, format!("clientsentiment/related/{market_id}"))
			.version(1)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode::<SentimentsPayload>()?;

		Ok(payload.client_sentiments)
	}
}

/// Client positioning on one market.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSentiment {
	/// Market the sentiment concerns.
	pub market_id: String,
	/// Percentage of clients positioned long.
	pub long_position_percentage: f64,
	/// Percentage of clients positioned short.
	pub short_position_percentage: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentsPayload {
	client_sentiments: Vec<MarketSentiment>,
}

fn validate_market_id(market_id: &str) -> Result<()> {
	if market_id.trim().is_empty() {
		return Err(Error::invalid_request("Market identifier cannot be empty"));
	}

	Ok(())
}
