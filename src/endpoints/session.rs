//! Session endpoints: login (certificate and OAuth), refresh, details, logout, and
//! account switching.

// self
use crate::{
	_prelude::*,
	api::Api,
	auth::{
		AccountId, ApiKey, ClientId, Credentials, Password, Token, Username,
		token::CERTIFICATE_LIFETIME,
	},
	error::Suggestion,
	http::header,
};

/// Session endpoints bound to an API handle.
#[derive(Clone, Copy, Debug)]
pub struct Session<'a> {
	api: &'a Api,
}
impl<'a> Session<'a> {
	pub(crate) fn new(api: &'a Api) -> Self {
		Self { api }
	}

	/// Opens a certificate session (`POST /session`, version 2).
	///
	/// The token pair arrives in the `CST` and `X-SECURITY-TOKEN` response headers;
	/// the account context arrives in the body. On success the produced credentials
	/// replace whatever the session held before.
	pub async fn login_certificate(
		&self,
		api_key: ApiKey,
		username: Username,
		password: Password,
	) -> Result<Credentials> {
		let response = self
			.api
			.request(Method::POST, "session")
			.version(2)
			.header(header::API_KEY, api_key.as_ref())
			.json_body(&LoginBody {
				identifier: username.as_ref(),
				password: password.as_ref(),
				encrypted_password: false,
			})?
			.send(&[StatusCode::OK])
			.await?;
		let access = response
			.header(header::CST)
			.map(str::to_owned)
			.ok_or_else(|| missing_token_header(header::CST))?;
		let security = response
			.header(header::SECURITY_TOKEN)
			.map(str::to_owned)
			.ok_or_else(|| missing_token_header(header::SECURITY_TOKEN))?;
		let payload = response.decode::<CertificateLoginPayload>()?;
		let token =
			Token::certificate(access, security, OffsetDateTime::now_utc() + CERTIFICATE_LIFETIME);
		let credentials = Credentials {
			client: payload.client_id,
			account: payload.current_account_id,
			api_key,
			streamer_url: parse_streamer_url(&payload.lightstreamer_endpoint)?,
			timezone: offset_from_hours(payload.timezone_offset),
			token,
		};

		self.api.session_state().update(credentials.clone());
		tracing::info!(account = %credentials.account, "certificate session opened");

		Ok(credentials)
	}

	/// Opens an OAuth session (`POST /session`, version 3).
	///
	/// Everything, token included, arrives in the body; `expires_in` is a decimal
	/// string of seconds converted to an absolute expiry at decode time.
	pub async fn login_oauth(
		&self,
		api_key: ApiKey,
		username: Username,
		password: Password,
	) -> Result<Credentials> {
		let payload = self
			.api
			.request(Method::POST, "session")
			.version(3)
			.header(header::API_KEY, api_key.as_ref())
			.json_body(&LoginBody {
				identifier: username.as_ref(),
				password: password.as_ref(),
				encrypted_password: false,
			})?
			.send(&[StatusCode::OK])
			.await?
			.decode::<OauthLoginPayload>()?;
		let token = oauth_token(payload.oauth_token)?;
		let credentials = Credentials {
			client: payload.client_id,
			account: payload.account_id,
			api_key,
			streamer_url: parse_streamer_url(&payload.lightstreamer_endpoint)?,
			timezone: offset_from_hours(payload.timezone_offset),
			token,
		};

		self.api.session_state().update(credentials.clone());
		tracing::info!(account = %credentials.account, "oauth session opened");

		Ok(credentials)
	}

	/// Exchanges the stored refresh token for a new OAuth token
	/// (`POST /session/refresh-token`, version 1).
	///
	/// Only the token is replaced; account, client, streamer URL, and timezone are
	/// preserved. This crate never refreshes automatically.
	pub async fn refresh(&self) -> Result<Credentials> {
		let credentials = self.api.credentials()?;
		let Some(refresh) = credentials.token.refresh_secret().map(str::to_owned) else {
			return Err(Error::InvalidCredentials {
				message: "only OAuth sessions hold a refresh token".into(),
				suggestion: Suggestion::LogIn,
			});
		};
		let payload = self
			.api
			.request(Method::POST, "session/refresh-token")
			.version(1)
			.header(header::API_KEY, credentials.api_key.as_ref())
			.json_body(&RefreshBody { refresh_token: &refresh })?
			.send(&[StatusCode::OK])
			.await?
			.decode::<OauthTokenPayload>()?;
		let token = oauth_token(payload)?;

		self.api.session_state().replace_token(token)
	}

	/// Fetches the lightweight session view (`GET /session`, version 1).
	pub async fn details(&self) -> Result<SessionDetails> {
		self.api
			.request(Method::GET, "session")
			.version(1)
			.with_credentials()
			.send(&[StatusCode::OK])
			.await?
			.decode()
	}

	/// Ends the session (`DELETE /session`, version 1, expects 204).
	///
	/// When no credentials are stored this completes successfully without contacting
	/// the server. On success the stored credentials are cleared.
	pub async fn logout(&self) -> Result<()> {
		if self.api.session_state().is_empty() {
			return Ok(());
		}

		self.api
			.request(Method::DELETE, "session")
			.version(1)
			.with_credentials()
			.send(&[StatusCode::NO_CONTENT])
			.await?;
		self.api.session_state().remove();
		tracing::info!("session closed");

		Ok(())
	}

	/// Switches the active account (`PUT /session`, version 1).
	///
	/// The target account identifier is validated before anything is built; switching
	/// to the already-active account is reported by the server and surfaced verbatim.
	/// On success the stored credentials' account is mutated in place.
	pub async fn switch(
		&self,
		account: &str,
		default_account: Option<bool>,
	) -> Result<AccountSwitch> {
		let account = AccountId::new(account)?;
		let switch = self
			.api
			.request(Method::PUT, "session")
			.version(1)
			.with_credentials()
			.json_body(&SwitchBody { account_id: account.as_ref(), default_account })?
			.send(&[StatusCode::OK])
			.await?
			.decode::<AccountSwitch>()?;

		self.api.session_state().set_account(account)?;

		Ok(switch)
	}
}

/// Capability flags returned by an account switch.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSwitch {
	/// Whether trailing stops are enabled on the target account.
	pub trailing_stops_enabled: bool,
	/// Whether dealing is enabled on the target account.
	pub dealing_enabled: bool,
	/// Whether the client still owns active demo accounts.
	pub has_active_demo_accounts: bool,
	/// Whether the client still owns active live accounts.
	pub has_active_live_accounts: bool,
}

/// Lightweight session view returned by [`Session::details`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetails {
	/// Platform client owning the session.
	pub client_id: ClientId,
	/// Active account.
	pub account_id: AccountId,
	/// Account timezone as whole or fractional hours from UTC.
	pub timezone_offset: f64,
	/// Account locale.
	pub locale: String,
	/// Account currency code.
	pub currency: String,
	/// Streaming endpoint granted to the session.
	pub lightstreamer_endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody<'a> {
	identifier: &'a str,
	password: &'a str,
	encrypted_password: bool,
}

#[derive(Serialize)]
struct RefreshBody<'a> {
	refresh_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SwitchBody<'a> {
	account_id: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	default_account: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertificateLoginPayload {
	current_account_id: AccountId,
	client_id: ClientId,
	timezone_offset: f64,
	lightstreamer_endpoint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OauthLoginPayload {
	client_id: ClientId,
	account_id: AccountId,
	timezone_offset: f64,
	lightstreamer_endpoint: String,
	oauth_token: OauthTokenPayload,
}

#[derive(Deserialize)]
struct OauthTokenPayload {
	access_token: String,
	refresh_token: String,
	scope: String,
	token_type: String,
	expires_in: String,
}

fn missing_token_header(name: &str) -> Error {
	Error::InvalidCredentials {
		message: format!("login response is missing the `{name}` header"),
		suggestion: Suggestion::ReviewError,
	}
}

fn parse_streamer_url(raw: &str) -> Result<Url> {
	Url::parse(raw).map_err(|_| Error::InvalidCredentials {
		message: format!("streamer endpoint `{raw}` is not a valid URL"),
		suggestion: Suggestion::ReviewError,
	})
}

fn oauth_token(payload: OauthTokenPayload) -> Result<Token> {
	let expires_in = payload.expires_in.parse::<i64>().map_err(|_| Error::InvalidCredentials {
		message: format!("token expiry `{}` is not a number of seconds", payload.expires_in),
		suggestion: Suggestion::ReviewError,
	})?;

	Ok(Token::oauth(
		payload.access_token,
		payload.refresh_token,
		payload.scope,
		payload.token_type,
		OffsetDateTime::now_utc() + Duration::seconds(expires_in),
	))
}

fn offset_from_hours(hours: f64) -> UtcOffset {
	UtcOffset::from_whole_seconds((hours * 3600.0) as i32).unwrap_or(UtcOffset::UTC)
}
