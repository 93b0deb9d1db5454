//! API application endpoints: listing the client's applications and updating their
//! allowances.

// self
use crate::{_prelude::*, api::Api, auth::ApiKey};

/// API application endpoints bound to an API handle.
#[derive(Clone, Copy, Debug)]
pub struct Applications<'a> {
	api: &'a Api,
}
impl<'a> Applications<'a> {
	pub(crate) fn new(api: &'a Api) -> Self {
		Self { api }
	}

	/// Lists the client's API applications (`GET /operations/application`, version 1).
	pub async fn all(&self) -> Result<Vec<Application>> {
		self.api
			.request(Method::GET, "operations/application")
			.version(1)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode()
	}

	/// Updates one application's status and allowances
	/// (`PUT /operations/application`, version 1).
	pub async fn update(
		&self,
		api_key: &ApiKey,
		status: ApplicationStatus,
		allowance_account_overall: f64,
		allowance_account_trading: f64,
	) -> Result<Application> {
		self.api
			.request(Method::PUT, "operations/application")
			.version(1)
			.with_credentials()
			.json_body(&UpdateBody {
				api_key: api_key.as_ref(),
				status,
				allowance_account_overall,
				allowance_account_trading,
			})?
			.send(&[StatusCode::OK])
			.await?
			.decode()
	}
}

/// One API application registered by the client.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
	/// Display name.
	pub name: String,
	/// Key of this application.
	pub api_key: ApiKey,
	/// Lifecycle status.
	pub status: ApplicationStatus,
	/// Overall per-account request allowance.
	pub allowance_account_overall: f64,
	/// Trading per-account request allowance.
	pub allowance_account_trading: f64,
	/// Historical-data per-account request allowance.
	#[serde(default)]
	pub allowance_account_historical_data: f64,
	/// Overall per-application request allowance.
	#[serde(default)]
	pub allowance_application_overall: f64,
	/// Concurrent streaming subscription limit.
	#[serde(default)]
	pub concurrent_subscriptions_limit: u32,
}

/// Lifecycle status of an application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
	/// Usable.
	Enabled,
	/// Disabled by the client.
	Disabled,
	/// Revoked by the platform.
	Revoked,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody<'a> {
	api_key: &'a str,
	status: ApplicationStatus,
	allowance_account_overall: f64,
	allowance_account_trading: f64,
}
