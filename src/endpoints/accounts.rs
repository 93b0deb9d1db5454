//! Account endpoints: listing and dealing preferences.

// self
use crate::{_prelude::*, api::Api, auth::AccountId};

/// Account endpoints bound to an API handle.
#[derive(Clone, Copy, Debug)]
pub struct Accounts<'a> {
	api: &'a Api,
}
impl<'a> Accounts<'a> {
	pub(crate) fn new(api: &'a Api) -> Self {
		Self { api }
	}

	/// Lists every account owned by the client (`GET /accounts`, version 1).
	pub async fn all(&self) -> Result<Vec<Account>> {
		let payload = self
			.api
			.request(Method::GET, "accounts")
			.version(1)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode::<AccountsPayload>()?;

		Ok(payload.accounts)
	}

	/// Fetches the dealing preferences (`GET /accounts/preferences`, version 1).
	pub async fn preferences(&self) -> Result<AccountPreferences> {
		self.api
			.request(Method::GET, "accounts/preferences")
			.version(1)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode()
	}

	/// Updates the dealing preferences (`PUT /accounts/preferences`, version 1).
	pub async fn update_preferences(&self, trailing_stops_enabled: bool) -> Result<()> {
		self.api
			.request(Method::PUT, "accounts/preferences")
			.version(1)
			.with_credentials()
			.json_body(&AccountPreferences { trailing_stops_enabled })?
			.send(&[StatusCode::OK])
			.await?
			.decode::<StatusPayload>()?;

		Ok(())
	}
}

/// One dealing account.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
	/// Account identifier.
	pub account_id: AccountId,
	/// Display name.
	pub account_name: String,
	/// Optional user-chosen alias.
	pub account_alias: Option<String>,
	/// Product kind of the account.
	pub account_type: AccountType,
	/// Lifecycle status.
	pub status: AccountStatus,
	/// Whether this is the preferred (default) account.
	pub preferred: bool,
	/// Account currency code.
	pub currency: String,
	/// Balance sheet of the account.
	pub balance: AccountBalance,
}

/// Product kind of an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
	/// Contracts for difference.
	Cfd,
	/// Physical shares.
	Physical,
	/// Spread betting.
	Spreadbet,
}

/// Lifecycle status of an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
	/// Open for dealing.
	Enabled,
	/// Disabled.
	Disabled,
	/// Dealing suspended by the platform.
	SuspendedFromDealing,
}

/// Balance sheet of an account.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
	/// Settled funds.
	pub balance: f64,
	/// Margin deposit in use.
	pub deposit: f64,
	/// Running profit and loss.
	pub profit_loss: f64,
	/// Funds available for dealing.
	pub available: f64,
}

/// Dealing preferences of the active account.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPreferences {
	/// Whether stops may trail the market.
	pub trailing_stops_enabled: bool,
}

#[derive(Deserialize)]
pub(crate) struct StatusPayload {
	#[allow(dead_code)]
	pub(crate) status: String,
}

#[derive(Deserialize)]
struct AccountsPayload {
	accounts: Vec<Account>,
}
