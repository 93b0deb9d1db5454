//! API handle owning the transport, root URL, and session state.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, SessionState},
	endpoints::{
		accounts::Accounts, applications::Applications, history::History, markets::Markets,
		navigation::Navigation, orders::WorkingOrders, positions::Positions, sentiment::Sentiment,
		session::Session, watchlists::Watchlists,
	},
	error::Suggestion,
	http::Transport,
	pipeline::Request,
};

/// Default root URL of the dealing gateway.
pub const ROOT_URL: &str = "https://api.ig.com/gateway/deal";

/// Handle to one gateway instance.
///
/// Exactly one HTTP transport exists per instance; every endpoint call and the
/// session state hang off it. Clones share the instance. Once the last clone drops,
/// the transport is invalidated and deferred calls still holding a weak handle fail
/// with [`Error::SessionExpired`].
#[derive(Clone)]
pub struct Api(Arc<ApiInner>);
pub(crate) struct ApiInner {
	pub(crate) root_url: Url,
	pub(crate) transport: Transport,
	pub(crate) session: SessionState,
}
impl Api {
	/// Creates a handle against the production gateway with the default transport.
	pub fn new() -> Result<Self> {
		Ok(Self::with_transport(parse_root(ROOT_URL)?, Transport::new()?))
	}

	/// Creates a handle against a custom root URL with the default transport.
	pub fn with_root(root_url: Url) -> Result<Self> {
		Ok(Self::with_transport(root_url, Transport::new()?))
	}

	/// Creates a handle from caller-provided parts.
	///
	/// The caller keeps responsibility for the transport policy; see
	/// [`Transport::with_client`].
	pub fn with_transport(root_url: Url, transport: Transport) -> Self {
		Self(Arc::new(ApiInner { root_url, transport, session: SessionState::default() }))
	}

	/// Root URL all endpoint paths are resolved against.
	pub fn root_url(&self) -> &Url {
		&self.0.root_url
	}

	/// Returns the currently stored credentials, failing when none are set.
	pub fn credentials(&self) -> Result<Credentials> {
		self.0.session.credentials()
	}

	/// Starts a pipeline request for `path` relative to the root URL.
	pub fn request(&self, method: Method, path: impl Into<Cow<'static, str>>) -> Request {
		Request::new(self, method, path)
	}

	/// Session endpoints: login, refresh, logout, account switch.
	pub fn session(&self) -> Session<'_> {
		Session::new(self)
	}

	/// Account endpoints.
	pub fn accounts(&self) -> Accounts<'_> {
		Accounts::new(self)
	}

	/// Activity and transaction history endpoints.
	pub fn history(&self) -> History<'_> {
		History::new(self)
	}

	/// Market data endpoints.
	pub fn markets(&self) -> Markets<'_> {
		Markets::new(self)
	}

	/// Market navigation endpoints.
	pub fn navigation(&self) -> Navigation<'_> {
		Navigation::new(self)
	}

	/// Client sentiment endpoints.
	pub fn sentiment(&self) -> Sentiment<'_> {
		Sentiment::new(self)
	}

	/// Watchlist endpoints.
	pub fn watchlists(&self) -> Watchlists<'_> {
		Watchlists::new(self)
	}

	/// Open position endpoints.
	pub fn positions(&self) -> Positions<'_> {
		Positions::new(self)
	}

	/// Working order endpoints.
	pub fn working_orders(&self) -> WorkingOrders<'_> {
		WorkingOrders::new(self)
	}

	/// API application endpoints.
	pub fn applications(&self) -> Applications<'_> {
		Applications::new(self)
	}

	pub(crate) fn session_state(&self) -> &SessionState {
		&self.0.session
	}

	pub(crate) fn downgrade(&self) -> WeakApi {
		WeakApi(Arc::downgrade(&self.0))
	}
}
impl Debug for Api {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Api")
			.field("root_url", &self.0.root_url.as_str())
			.field("logged_in", &!self.0.session.is_empty())
			.finish()
	}
}

/// Non-owning handle captured by deferred pipeline stages.
#[derive(Clone)]
pub(crate) struct WeakApi(Weak<ApiInner>);
impl WeakApi {
	/// Re-acquires the API for one stage, failing once the instance is gone.
	pub(crate) fn upgrade(&self) -> Result<Arc<ApiInner>> {
		self.0.upgrade().ok_or(Error::SessionExpired)
	}
}

fn parse_root(raw: &str) -> Result<Url> {
	Url::parse(raw).map_err(|e| Error::InvalidRequest {
		message: format!("root URL `{raw}` is not a valid URL"),
		request: None,
		source: Some(Box::new(e)),
		suggestion: Suggestion::FileBug,
		context: Vec::new(),
	})
}
