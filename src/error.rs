//! Tagged error model shared by the request pipeline, session state, and streamer.
//!
//! Every failure is terminal; no stage recovers silently. Outer stages may enrich an
//! error created further in with evidence they hold—see [`Error::with_request`],
//! [`Error::with_response`], and [`Error::with_context`].

// self
use crate::{_prelude::*, http::header};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Request header keys whose values never reach error evidence verbatim.
const SECRET_HEADERS: [&str; 4] =
	[header::API_KEY, header::CST, header::SECURITY_TOKEN, header::AUTHORIZATION];

/// Follow-up hint attached to errors so callers know where to look next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Suggestion {
	/// The request violated a documented constraint; re-read the endpoint reference.
	ReadDocumentation,
	/// The session holds no usable credentials; log in first.
	LogIn,
	/// Inspect the attached evidence; the server rejected an otherwise well-formed call.
	ReviewError,
	/// The library reached a state it considers impossible; please file a bug.
	FileBug,
}
impl Suggestion {
	/// Stable string form used in log output.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::ReadDocumentation => "read the endpoint documentation",
			Self::LogIn => "log in before issuing this call",
			Self::ReviewError => "review the attached request/response evidence",
			Self::FileBug => "file a bug against ig-gateway",
		}
	}
}
impl Display for Suggestion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Label/value pair of contributing evidence accumulated by outer stages.
pub type ContextPair = (&'static str, String);

/// Snapshot of an outbound request kept as error evidence.
///
/// Secret-bearing header values (API key, CST, security token, authorization) are
/// redacted at capture time, so snapshots are safe to log.
#[derive(Clone, Debug)]
pub struct RequestSnapshot {
	/// HTTP method of the outbound request.
	pub method: Method,
	/// Fully composed URL, query items included.
	pub url: Url,
	/// Header pairs in the order they were assembled.
	pub headers: Vec<(String, String)>,
}
impl RequestSnapshot {
	pub(crate) fn new(
		method: Method,
		url: Url,
		headers: impl IntoIterator<Item = (String, String)>,
	) -> Self {
		let headers = headers
			.into_iter()
			.map(|(key, value)| {
				if SECRET_HEADERS.iter().any(|secret| secret.eq_ignore_ascii_case(&key)) {
					(key, "<redacted>".into())
				} else {
					(key, value)
				}
			})
			.collect();

		Self { method, url, headers }
	}

	/// One-line rendering used in context pairs and log events.
	pub fn describe(&self) -> String {
		format!("{} {}", self.method, self.url)
	}
}

/// Status line and headers of a received response, kept as error evidence.
#[derive(Clone, Debug)]
pub struct ResponseSnapshot {
	/// HTTP status code of the response.
	pub status: StatusCode,
	/// Response header pairs as received.
	pub headers: Vec<(String, String)>,
}
impl ResponseSnapshot {
	/// Returns the first header value matching `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Canonical error exposed by all public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The owning [`Api`](crate::api::Api) was dropped before a deferred call ran.
	#[error("API instance was dropped before the deferred call could run.")]
	SessionExpired,
	/// No credentials are stored, or the stored ones are unusable for the operation.
	#[error("Credentials are invalid: {message}.")]
	InvalidCredentials {
		/// Human-readable description of what is missing or malformed.
		message: String,
		/// Follow-up hint.
		suggestion: Suggestion,
	},
	/// The call was rejected locally; nothing was sent over the wire.
	#[error("Request is invalid: {message}.")]
	InvalidRequest {
		/// Human-readable description of the violated constraint.
		message: String,
		/// Snapshot of the partially built request, when one exists.
		request: Option<RequestSnapshot>,
		/// Underlying cause, when the rejection wraps a lower-level failure.
		#[source]
		source: Option<BoxError>,
		/// Follow-up hint.
		suggestion: Suggestion,
		/// Evidence pairs accumulated by outer stages.
		context: Vec<ContextPair>,
	},
	/// The HTTP exchange failed at the transport level.
	#[error("Call failed: {message}.")]
	CallFailed {
		/// Human-readable description of the transport failure.
		message: String,
		/// Snapshot of the request that was being executed.
		request: RequestSnapshot,
		/// Partial response evidence, when any arrived before the failure.
		response: Option<ResponseSnapshot>,
		/// Raw body bytes received before the failure, if any.
		data: Option<Vec<u8>>,
		/// Underlying transport error.
		#[source]
		source: Option<BoxError>,
		/// Follow-up hint.
		suggestion: Suggestion,
		/// Evidence pairs accumulated by outer stages.
		context: Vec<ContextPair>,
	},
	/// The server answered, but outside the endpoint's protocol (status, emptiness, shape).
	#[error("Response is invalid: {message}.")]
	InvalidResponse {
		/// Human-readable description of the protocol violation.
		message: String,
		/// Snapshot of the executed request.
		request: RequestSnapshot,
		/// Status line and headers of the offending response.
		response: ResponseSnapshot,
		/// Raw body bytes as received.
		data: Option<Vec<u8>>,
		/// Underlying decoder error, when decoding caused the failure.
		#[source]
		source: Option<BoxError>,
		/// Follow-up hint.
		suggestion: Suggestion,
		/// Evidence pairs accumulated by outer stages.
		context: Vec<ContextPair>,
	},
	/// A streamed update could not be decoded into its target entity.
	#[error("Streamer update is invalid: {message}.")]
	Streamer {
		/// Human-readable description of the decode failure.
		message: String,
		/// Subscription item the update belonged to, when known.
		item: Option<String>,
		/// Underlying decoder error, if any.
		#[source]
		source: Option<BoxError>,
		/// Follow-up hint.
		suggestion: Suggestion,
		/// Evidence pairs accumulated by outer stages.
		context: Vec<ContextPair>,
	},
}
impl Error {
	/// Shorthand for the "no credentials are set" failure.
	pub(crate) fn no_credentials() -> Self {
		Self::InvalidCredentials {
			message: "no credentials are set in the session".into(),
			suggestion: Suggestion::LogIn,
		}
	}

	/// Builds an [`Error::InvalidRequest`] from a plain message.
	pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
		Self::InvalidRequest {
			message: message.into(),
			request: None,
			source: None,
			suggestion: Suggestion::ReadDocumentation,
			context: Vec::new(),
		}
	}

	/// Builds an [`Error::Streamer`] decode failure for `item`.
	pub(crate) fn streamer(message: impl Into<String>, item: Option<String>) -> Self {
		Self::Streamer {
			message: message.into(),
			item,
			source: None,
			suggestion: Suggestion::ReviewError,
			context: Vec::new(),
		}
	}

	/// Attaches a request snapshot if the error does not already carry one.
	pub fn with_request(mut self, snapshot: RequestSnapshot) -> Self {
		if let Self::InvalidRequest { request: request @ None, .. } = &mut self {
			*request = Some(snapshot);
		}

		self
	}

	/// Attaches response evidence to a [`Error::CallFailed`] that lacks it.
	pub fn with_response(mut self, snapshot: ResponseSnapshot) -> Self {
		if let Self::CallFailed { response: response @ None, .. } = &mut self {
			*response = Some(snapshot);
		}

		self
	}

	/// Appends a `(label, value)` evidence pair to errors that accumulate context.
	pub fn with_context(mut self, label: &'static str, value: impl Into<String>) -> Self {
		if let Self::InvalidRequest { context, .. }
		| Self::CallFailed { context, .. }
		| Self::InvalidResponse { context, .. }
		| Self::Streamer { context, .. } = &mut self
		{
			context.push((label, value.into()));
		}

		self
	}

	/// Follow-up hint carried by this error.
	pub fn suggestion(&self) -> Suggestion {
		match self {
			Self::SessionExpired => Suggestion::ReviewError,
			Self::InvalidCredentials { suggestion, .. }
			| Self::InvalidRequest { suggestion, .. }
			| Self::CallFailed { suggestion, .. }
			| Self::InvalidResponse { suggestion, .. }
			| Self::Streamer { suggestion, .. } => *suggestion,
		}
	}

	/// Evidence pairs accumulated so far.
	pub fn context(&self) -> &[ContextPair] {
		match self {
			Self::InvalidRequest { context, .. }
			| Self::CallFailed { context, .. }
			| Self::InvalidResponse { context, .. }
			| Self::Streamer { context, .. } => context,
			_ => &[],
		}
	}

	/// Request snapshot attached to this error, if any.
	pub fn request(&self) -> Option<&RequestSnapshot> {
		match self {
			Self::InvalidRequest { request, .. } => request.as_ref(),
			Self::CallFailed { request, .. } | Self::InvalidResponse { request, .. } =>
				Some(request),
			_ => None,
		}
	}

	/// Response snapshot attached to this error, if any.
	pub fn response(&self) -> Option<&ResponseSnapshot> {
		match self {
			Self::CallFailed { response, .. } => response.as_ref(),
			Self::InvalidResponse { response, .. } => Some(response),
			_ => None,
		}
	}

	/// Raw body bytes attached to this error, if any.
	pub fn data(&self) -> Option<&[u8]> {
		match self {
			Self::CallFailed { data, .. } | Self::InvalidResponse { data, .. } => data.as_deref(),
			_ => None,
		}
	}
}
impl From<crate::auth::IdentifierError> for Error {
	fn from(e: crate::auth::IdentifierError) -> Self {
		let rendered = e.to_string();

		Self::InvalidRequest {
			message: rendered.strip_suffix('.').unwrap_or(&rendered).to_owned(),
			request: None,
			source: Some(Box::new(e)),
			suggestion: Suggestion::ReadDocumentation,
			context: Vec::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn snapshot() -> RequestSnapshot {
		RequestSnapshot::new(
			Method::GET,
			Url::parse("https://api.ig.com/gateway/deal/markets").expect("URL fixture is valid."),
			[
				(header::CST.to_owned(), "secret-cst".to_owned()),
				(header::VERSION.to_owned(), "2".to_owned()),
			],
		)
	}

	#[test]
	fn secret_headers_are_redacted_at_capture() {
		let snapshot = snapshot();

		assert_eq!(snapshot.headers[0].1, "<redacted>");
		assert_eq!(snapshot.headers[1].1, "2");
	}

	#[test]
	fn with_request_fills_only_when_absent() {
		let enriched = Error::invalid_request("missing epic").with_request(snapshot());
		let Some(first) = enriched.request().cloned() else {
			panic!("Request snapshot should have been attached.");
		};
		let unchanged = enriched.with_request(RequestSnapshot::new(
			Method::DELETE,
			Url::parse("https://api.ig.com/gateway/deal/session")
				.expect("URL fixture is valid."),
			[],
		));

		assert_eq!(
			unchanged.request().map(|snapshot| snapshot.method.clone()),
			Some(first.method)
		);
	}

	#[test]
	fn context_pairs_accumulate_in_order() {
		let err = Error::invalid_request("boom")
			.with_context("first", "a")
			.with_context("second", "b");

		assert_eq!(err.context(), &[("first", "a".to_owned()), ("second", "b".to_owned())]);
	}

	#[test]
	fn session_expired_carries_no_attachments() {
		let err = Error::SessionExpired;

		assert!(err.request().is_none());
		assert!(err.response().is_none());
		assert!(err.data().is_none());
		assert!(err.context().is_empty());
	}
}
