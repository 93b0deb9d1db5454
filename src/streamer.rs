//! Streaming channel contract for server-pushed items.
//!
//! The request pipeline does not depend on this module; the streamer depends only on
//! [`Credentials`] (streamer URL plus certificate token). The long-lived multiplexed
//! connection itself is a collaborator: implementors provide [`StreamerTransport`]
//! and this module contributes the subscription vocabulary, the connection identity
//! derivation, and typed entity decoding.

pub mod entities;
pub mod update;

pub use entities::*;
pub use update::*;

// crates.io
use futures_util::{Stream, StreamExt};
// self
use crate::{
	_prelude::*,
	auth::{AccountId, Credentials, Epic},
};

/// Connection identity for the streaming endpoint, derived from credentials.
///
/// Only certificate sessions may open the channel; the password is the
/// `CST-<access>|XST-<security>` pair.
#[derive(Clone)]
pub struct StreamerIdentity {
	/// Account the connection authenticates as.
	pub account: AccountId,
	/// Root URL of the streaming endpoint.
	pub url: Url,
	password: String,
}
impl StreamerIdentity {
	/// Derives the identity from stored credentials.
	pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
		Ok(Self {
			account: credentials.account.clone(),
			url: credentials.streamer_url.clone(),
			password: credentials.token.streamer_password()?,
		})
	}

	/// Connection password; avoid logging it.
	pub fn password(&self) -> &str {
		&self.password
	}
}
impl Debug for StreamerIdentity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StreamerIdentity")
			.field("account", &self.account)
			.field("url", &self.url.as_str())
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Transport collaborator driving the multiplexed streaming connection.
///
/// Implementations own connection lifecycle and re-subscription; this crate only
/// requires that each subscription yields a lazy update sequence and that dropping
/// the sequence unsubscribes its observer.
pub trait StreamerTransport
where
	Self: 'static + Send + Sync,
{
	/// Lazy update sequence delivered for one subscription.
	type Updates: Stream<Item = Result<Update>> + Send + Unpin;

	/// Subscribes to `subscription` and returns its update sequence.
	fn subscribe(&self, subscription: Subscription) -> Self::Updates;
}

/// Streaming channel bound to a transport implementation.
pub struct Streamer<T> {
	identity: StreamerIdentity,
	transport: T,
}
impl<T> Streamer<T>
where
	T: StreamerTransport,
{
	/// Binds an identity to a transport.
	pub fn new(identity: StreamerIdentity, transport: T) -> Self {
		Self { identity, transport }
	}

	/// The connection identity this channel was built from.
	pub fn identity(&self) -> &StreamerIdentity {
		&self.identity
	}

	/// Raw subscription to one item.
	pub fn subscribe(
		&self,
		mode: Mode,
		item: impl Into<String>,
		fields: Vec<String>,
		snapshot: bool,
	) -> T::Updates {
		self.transport.subscribe(Subscription { mode, item: item.into(), fields, snapshot })
	}

	/// Subscribes to the tick stream of one instrument, decoded into [`ChartTick`]s.
	pub fn chart_ticks(&self, epic: &Epic) -> impl Stream<Item = Result<ChartTick>> + use<T> {
		self.subscribe(Mode::Distinct, ChartTick::item(epic), owned(&ChartTick::FIELDS), false)
			.map(|result| result.and_then(|update| ChartTick::from_update(&update)))
	}

	/// Subscribes to the balance stream of the identity's account, decoded into
	/// [`AccountUpdate`]s. A snapshot of the current state arrives first.
	pub fn account_updates(&self) -> impl Stream<Item = Result<AccountUpdate>> + use<T> {
		self.subscribe(
			Mode::Merge,
			AccountUpdate::item(&self.identity.account),
			owned(&AccountUpdate::FIELDS),
			true,
		)
		.map(|result| result.and_then(|update| AccountUpdate::from_update(&update)))
	}

	/// Subscribes to the trade stream of the identity's account, decoded into
	/// [`DealUpdate`]s. Updates that carry no open-position payload are skipped.
	pub fn trade_updates(&self) -> impl Stream<Item = Result<DealUpdate>> + use<T> {
		self.subscribe(
			Mode::Distinct,
			DealUpdate::item(&self.identity.account),
			owned(&DealUpdate::FIELDS),
			false,
		)
		.filter_map(|result| async move {
			match result {
				Ok(update) => DealUpdate::from_update(&update).transpose(),
				Err(e) => Some(Err(e)),
			}
		})
	}
}

fn owned(fields: &[&str]) -> Vec<String> {
	fields.iter().map(|field| (*field).to_owned()).collect()
}
