//! Active credentials and the session slot that serializes access to them.

// self
use crate::{
	_prelude::*,
	auth::{AccountId, ApiKey, ClientId, Token, TokenKind},
	http::header,
};

/// Everything a logged-in session knows about itself.
///
/// All fields except the active account are immutable for the lifetime of the value;
/// switching accounts replaces [`account`](Self::account) in place, refresh and
/// re-login replace the whole value.
#[derive(Clone, Debug)]
pub struct Credentials {
	/// Platform client owning the accounts.
	pub client: ClientId,
	/// Currently active dealing account.
	pub account: AccountId,
	/// API key the session was opened with.
	pub api_key: ApiKey,
	/// Root URL of the streaming endpoint granted to this session.
	pub streamer_url: Url,
	/// Fixed UTC offset of the account, keys date decoding for market payloads.
	pub timezone: UtcOffset,
	/// Session token; see [`Token`] for the two kinds.
	pub token: Token,
}
impl Credentials {
	/// Deterministic request-header assembly for authenticated calls.
	///
	/// Always emits `X-IG-API-KEY`. Certificate tokens add `CST` and
	/// `X-SECURITY-TOKEN`; OAuth tokens add `IG-ACCOUNT-ID` and `Authorization`.
	/// The two sets are disjoint.
	pub fn request_headers(&self) -> Vec<(&'static str, String)> {
		let mut headers = vec![(header::API_KEY, self.api_key.as_ref().to_owned())];

		match self.token.kind() {
			TokenKind::Certificate { access, security } => {
				headers.push((header::CST, access.clone()));
				headers.push((header::SECURITY_TOKEN, security.clone()));
			},
			TokenKind::OAuth { access, token_type, .. } => {
				headers.push((header::ACCOUNT_ID, self.account.as_ref().to_owned()));
				headers.push((header::AUTHORIZATION, format!("{token_type} {access}")));
			},
		}

		headers
	}
}

/// Credential slot owned by an [`Api`](crate::api::Api) instance.
///
/// Reads hand out clones; endpoint calls never hold a borrow across an await point,
/// so login/logout/switch stay mutually exclusive with in-flight header assembly.
#[derive(Debug, Default)]
pub struct SessionState(RwLock<Option<Credentials>>);
impl SessionState {
	/// Returns the stored credentials, failing when none are set.
	pub fn credentials(&self) -> Result<Credentials> {
		self.0.read().clone().ok_or_else(Error::no_credentials)
	}

	/// Replaces the stored credentials atomically.
	pub fn update(&self, credentials: Credentials) {
		*self.0.write() = Some(credentials);
	}

	/// Clears the stored credentials.
	pub fn remove(&self) {
		*self.0.write() = None;
	}

	/// Returns `true` while no credentials are stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_none()
	}

	/// Mutates the active account in place after a successful switch.
	pub(crate) fn set_account(&self, account: AccountId) -> Result<()> {
		let mut slot = self.0.write();
		let Some(credentials) = slot.as_mut() else {
			return Err(Error::no_credentials());
		};

		credentials.account = account;

		Ok(())
	}

	/// Replaces only the token, preserving every other field, and returns the result.
	pub(crate) fn replace_token(&self, token: Token) -> Result<Credentials> {
		let mut slot = self.0.write();
		let Some(credentials) = slot.as_mut() else {
			return Err(Error::no_credentials());
		};

		credentials.token = token;

		Ok(credentials.clone())
	}

	/// Account timezone used by the decode context; UTC when logged out.
	pub(crate) fn timezone(&self) -> UtcOffset {
		self.0.read().as_ref().map(|credentials| credentials.timezone).unwrap_or(UtcOffset::UTC)
	}
}
