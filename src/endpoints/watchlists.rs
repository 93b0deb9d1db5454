//! Watchlist endpoints: list, create, read, epic add/remove, delete.

// self
use crate::{
	_prelude::*,
	api::Api,
	auth::Epic,
	endpoints::{accounts::StatusPayload, markets::MarketHit},
};

/// Watchlist endpoints bound to an API handle.
#[derive(Clone, Copy, Debug)]
pub struct Watchlists<'a> {
	api: &'a Api,
}
impl<'a> Watchlists<'a> {
	pub(crate) fn new(api: &'a Api) -> Self {
		Self { api }
	}

	/// Lists every watchlist on the account (`GET /watchlists`, version 1).
	pub async fn all(&self) -> Result<Vec<Watchlist>> {
		let payload = self
			.api
			.request(Method::GET, "watchlists")
			.version(1)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode::<WatchlistsPayload>()?;

		Ok(payload.watchlists)
	}

	/// Creates a watchlist (`POST /watchlists`, version 1).
	///
	/// The returned status tells whether every requested epic was accepted.
	pub async fn create(&self, name: &str, epics: &[Epic]) -> Result<CreatedWatchlist> {
		if name.trim().is_empty() {
			return Err(Error::invalid_request("Watchlist name cannot be empty"));
		}

		self.api
			.request(Method::POST, "watchlists")
			.version(1)
			.with_credentials()
			.json_body(&CreateBody {
				name,
				epics: epics.iter().map(AsRef::as_ref).collect(),
			})?
			.send(&[StatusCode::OK])
			.await?
			.decode()
	}

	/// Fetches the markets of one watchlist (`GET /watchlists/{id}`, version 1).
	pub async fn get(&self, id: &str) -> Result<Vec<MarketHit>> {
		validate_watchlist_id(id)?;

		let payload = self
			.api
			.request(Method::GET, format!("watchlists/{id}"))
			.version(1)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode::<WatchlistMarketsPayload>()?;

		Ok(payload.markets)
	}

	/// Adds an epic to a watchlist (`PUT /watchlists/{id}`, version 1).
	pub async fn add_epic(&self, id: &str, epic: &Epic) -> Result<()> {
		validate_watchlist_id(id)?;

		self.api
			.request(Method::PUT, format!("watchlists/{id}"))
			.version(1)
			.with_credentials()
			.json_body(&EpicBody { epic: epic.as_ref() })?
			.send(&[StatusCode::OK])
			.await?
			.decode::<StatusPayload>()?;

		Ok(())
	}

	/// Removes an epic from a watchlist (`DELETE /watchlists/{id}/{epic}`, version 1).
	pub async fn remove_epic(&self, id: &str, epic: &Epic) -> Result<()> {
		validate_watchlist_id(id)?;

		self.api
			.request(Method::DELETE, format!("watchlists/{id}/{}", epic.as_ref()))
			.version(1)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode::<StatusPayload>()?;

		Ok(())
	}

	/// Deletes a watchlist (`DELETE /watchlists/{id}`, version 1).
	pub async fn delete(&self, id: &str) -> Result<()> {
		validate_watchlist_id(id)?;

		self.api
			.request(Method::DELETE, format!("watchlists/{id}"))
			.version(1)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode::<StatusPayload>()?;

		Ok(())
	}
}

/// One watchlist.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watchlist {
	/// Watchlist identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Whether entries may be added or removed.
	pub editable: bool,
	/// Whether the watchlist may be deleted.
	pub deleteable: bool,
	/// Whether the platform owns this watchlist.
	#[serde(default)]
	pub default_system_watchlist: bool,
}

/// Outcome of a watchlist creation.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedWatchlist {
	/// Identifier of the new watchlist.
	pub watchlist_id: String,
	/// Whether every requested epic was accepted.
	pub status: CreateStatus,
}

/// Acceptance status of a watchlist creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateStatus {
	/// Every requested epic was added.
	Success,
	/// The watchlist was created, but some epics were rejected.
	SuccessNotAllInstrumentsAdded,
}

#[derive(Serialize)]
struct CreateBody<'a> {
	name: &'a str,
	epics: Vec<&'a str>,
}

#[derive(Serialize)]
struct EpicBody<'a> {
	epic: &'a str,
}

#[derive(Deserialize)]
struct WatchlistsPayload {
	watchlists: Vec<Watchlist>,
}

#[derive(Deserialize)]
struct WatchlistMarketsPayload {
	markets: Vec<MarketHit>,
}

fn validate_watchlist_id(id: &str) -> Result<()> {
	if id.trim().is_empty() {
		return Err(Error::invalid_request("Watchlist identifier cannot be empty"));
	}

	Ok(())
}
