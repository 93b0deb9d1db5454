//! Staged request pipeline turning typed endpoint calls into decoded entities.
//!
//! Every endpoint call walks the same stages in documented order: bind (re-acquire
//! the weak API handle), build (URL + query + headers + body), send, status check,
//! laden-data check, decode. Caller-side validation runs before a [`Request`] is
//! built, so rejected calls never touch the wire. Nothing is emitted downstream
//! until the previous stage succeeds; any failure is terminal and never retried.
//!
//! Dropping the future returned by [`Request::send`] aborts the underlying HTTP
//! exchange—after that, no further values or errors are observed.

pub mod paged;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	api::{Api, WeakApi},
	date,
	error::{RequestSnapshot, ResponseSnapshot, Suggestion},
	http::header,
};

/// Deferred, fully owned endpoint call.
///
/// A value of this type captures everything needed to run later: a weak handle to
/// its [`Api`], the relative path, query items, extra headers, and body bytes. It is
/// `'static`, so producers built from it may outlive the facade that created them
/// (but not usefully outlive the `Api` itself—the bind stage fails with
/// [`Error::SessionExpired`] once the instance is gone).
#[derive(Clone)]
pub struct Request {
	api: WeakApi,
	method: Method,
	path: Cow<'static, str>,
	version: u8,
	credentials: bool,
	queries: Vec<(Cow<'static, str>, String)>,
	headers: Vec<(Cow<'static, str>, String)>,
	body: Option<Body>,
}
#[derive(Clone)]
struct Body {
	content_type: &'static str,
	data: Vec<u8>,
}
impl Request {
	pub(crate) fn new(api: &Api, method: Method, path: impl Into<Cow<'static, str>>) -> Self {
		Self {
			api: api.downgrade(),
			method,
			path: path.into(),
			version: 1,
			credentials: false,
			queries: Vec::new(),
			headers: Vec::new(),
			body: None,
		}
	}

	/// Sets the endpoint-specific `Version` header value (defaults to 1).
	pub fn version(mut self, version: u8) -> Self {
		self.version = version;

		self
	}

	/// Requests credential headers; the send stage fails when none are stored.
	pub fn with_credentials(mut self) -> Self {
		self.credentials = true;

		self
	}

	/// Appends a query item; the value is percent-encoded per URL component rules.
	pub fn query(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
		self.queries.push((key.into(), value.into()));

		self
	}

	/// Replaces the value of an existing query item, appending when absent.
	pub fn replace_query(mut self, key: &'static str, value: impl Into<String>) -> Self {
		if let Some(slot) = self.queries.iter_mut().find(|(existing, _)| existing == key) {
			slot.1 = value.into();
		} else {
			self.queries.push((Cow::Borrowed(key), value.into()));
		}

		self
	}

	/// Appends an extra header pair.
	pub fn header(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
		self.headers.push((key.into(), value.into()));

		self
	}

	/// Serializes `payload` as the JSON body, stamping `Content-Type` at send time.
	pub fn json_body<T>(mut self, payload: &T) -> Result<Self>
	where
		T: Serialize,
	{
		let data = serde_json::to_vec(payload).map_err(|e| Error::InvalidRequest {
			message: "request body could not be serialized".into(),
			request: None,
			source: Some(Box::new(e)),
			suggestion: Suggestion::FileBug,
			context: Vec::new(),
		})?;

		self.body = Some(Body { content_type: crate::http::content_type::JSON, data });

		Ok(self)
	}

	/// Re-targets this request at a server-provided relative `path?query` string,
	/// discarding the current path and query items.
	pub fn relative(mut self, raw: &str) -> Self {
		let (path, query) = match raw.split_once('?') {
			Some((path, query)) => (path, Some(query)),
			None => (raw, None),
		};

		self.path = Cow::Owned(path.to_owned());
		self.queries = query
			.map(|query| {
				url::form_urlencoded::parse(query.as_bytes())
					.into_owned()
					.map(|(key, value)| (Cow::Owned(key), value))
					.collect()
			})
			.unwrap_or_default();

		self
	}

	/// One-line rendering used in log events and pagination context pairs.
	pub fn describe(&self) -> String {
		let mut rendered = format!("{} /{}", self.method, self.path.trim_start_matches('/'));

		for (index, (key, value)) in self.queries.iter().enumerate() {
			let separator = if index == 0 { '?' } else { '&' };

			rendered.push(separator);
			rendered.push_str(key);
			rendered.push('=');
			rendered.push_str(value);
		}

		rendered
	}

	/// Runs bind, build, send, and the status check, yielding a decodable response.
	pub async fn send(self, accepted: &[StatusCode]) -> Result<Response> {
		// Bind.
		let api = self.api.upgrade()?;
		// Build.
		let mut url = compose_url(&api.root_url, &self.path)?;

		if !self.queries.is_empty() {
			let mut pairs = url.query_pairs_mut();

			for (key, value) in &self.queries {
				pairs.append_pair(key, value);
			}

			drop(pairs);
		}

		let mut headers = vec![(header::VERSION.to_owned(), self.version.to_string())];

		if self.credentials {
			let credentials = api.session.credentials().map_err(|_| Error::InvalidRequest {
				message: "no credentials are set in the session".into(),
				request: None,
				source: None,
				suggestion: Suggestion::LogIn,
				context: Vec::new(),
			})?;

			headers.extend(
				credentials.request_headers().into_iter().map(|(key, value)| (key.to_owned(), value)),
			);
		}

		headers.extend(self.headers.iter().map(|(key, value)| (key.to_string(), value.clone())));

		if let Some(body) = &self.body {
			headers.push((header::CONTENT_TYPE.to_owned(), body.content_type.to_owned()));
		}

		let snapshot = RequestSnapshot::new(self.method.clone(), url.clone(), headers.clone());

		tracing::debug!(request = %snapshot.describe(), version = self.version, "sending gateway request");

		let mut builder = api.transport.request(self.method.clone(), url);

		for (key, value) in &headers {
			builder = builder.header(key.as_str(), value.as_str());
		}
		if let Some(body) = self.body {
			builder = builder.body(body.data);
		}

		// Send.
		let exchanged = builder.send().await.map_err(|e| Error::CallFailed {
			message: "the HTTP exchange could not be completed".into(),
			request: snapshot.clone(),
			response: None,
			data: None,
			source: Some(Box::new(e)),
			suggestion: Suggestion::ReviewError,
			context: Vec::new(),
		})?;
		let status = exchanged.status();
		let response = ResponseSnapshot {
			status,
			headers: exchanged
				.headers()
				.iter()
				.map(|(key, value)| {
					(key.as_str().to_owned(), String::from_utf8_lossy(value.as_bytes()).into_owned())
				})
				.collect(),
		};
		let data = exchanged
			.bytes()
			.await
			.map_err(|e| Error::CallFailed {
				message: "the response body could not be read".into(),
				request: snapshot.clone(),
				response: Some(response.clone()),
				data: None,
				source: Some(Box::new(e)),
				suggestion: Suggestion::ReviewError,
				context: Vec::new(),
			})?
			.to_vec();

		// Status check.
		if !accepted.contains(&status) {
			let expected = accepted
				.iter()
				.map(|status| status.as_u16().to_string())
				.collect::<Vec<_>>()
				.join(", ");

			tracing::warn!(
				request = %snapshot.describe(),
				received = status.as_u16(),
				expected = %expected,
				"gateway answered outside the accepted status set"
			);

			return Err(Error::InvalidResponse {
				message: format!(
					"status code {} is not in the accepted set [{expected}]",
					status.as_u16()
				),
				request: snapshot,
				response,
				data: Some(data),
				source: None,
				suggestion: Suggestion::ReviewError,
				context: Vec::new(),
			});
		}

		let server_date = response.header(header::DATE).and_then(date::parse_http_date);
		let timezone = api.session.timezone();

		Ok(Response { request: snapshot, response, data, server_date, timezone })
	}
}
impl Debug for Request {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Request")
			.field("call", &self.describe())
			.field("version", &self.version)
			.field("credentials", &self.credentials)
			.finish()
	}
}

/// Extrinsic context a decoder may consult alongside the body bytes.
pub struct DecodeContext<'a> {
	/// Snapshot of the executed request.
	pub request: &'a RequestSnapshot,
	/// Status line and headers of the response.
	pub response: &'a ResponseSnapshot,
	/// Server instant parsed from the response `Date` header, when present.
	pub server_date: Option<OffsetDateTime>,
	/// Account timezone at send time; UTC while logged out.
	pub timezone: UtcOffset,
}

/// Response that passed the status check, ready for the laden-data check and decode.
pub struct Response {
	request: RequestSnapshot,
	response: ResponseSnapshot,
	data: Vec<u8>,
	server_date: Option<OffsetDateTime>,
	timezone: UtcOffset,
}
impl Response {
	/// Status code of the response.
	pub fn status(&self) -> StatusCode {
		self.response.status
	}

	/// First response header matching `name`, case-insensitive.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.response.header(name)
	}

	/// Decodes the body into `T` with the default JSON decoder.
	pub fn decode<T>(self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.decode_with(|_, data| {
			let mut deserializer = serde_json::Deserializer::from_slice(data);

			serde_path_to_error::deserialize(&mut deserializer)
		})
	}

	/// Decodes the body with a caller-supplied decoder that may consult the
	/// [`DecodeContext`] (timezone, server date, headers).
	///
	/// Decode failures come back as [`Error::InvalidResponse`] carrying the request,
	/// the response, the received bytes, and the underlying error.
	pub fn decode_with<T, E, F>(self, decode: F) -> Result<T>
	where
		E: 'static + Send + Sync + StdError,
		F: FnOnce(&DecodeContext, &[u8]) -> Result<T, E>,
	{
		let Self { request, response, data, server_date, timezone } = self;

		// Laden-data check.
		if data.is_empty() {
			return Err(Error::InvalidResponse {
				message: "the response arrived without a body to decode".into(),
				request,
				response,
				data: None,
				source: None,
				suggestion: Suggestion::ReviewError,
				context: Vec::new(),
			});
		}

		let context = DecodeContext { request: &request, response: &response, server_date, timezone };

		match decode(&context, &data) {
			Ok(value) => Ok(value),
			Err(e) => Err(Error::InvalidResponse {
				message: "the response body could not be decoded".into(),
				request,
				response,
				data: Some(data),
				source: Some(Box::new(e)),
				suggestion: Suggestion::FileBug,
				context: Vec::new(),
			}),
		}
	}
}

fn compose_url(root: &Url, path: &str) -> Result<Url> {
	let raw = format!("{}/{}", root.as_str().trim_end_matches('/'), path.trim_start_matches('/'));

	Url::parse(&raw).map_err(|e| Error::InvalidRequest {
		message: format!("could not compose the endpoint URL for `{path}`"),
		request: None,
		source: Some(Box::new(e)),
		suggestion: Suggestion::FileBug,
		context: Vec::new(),
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::api::Api;

	fn api() -> Api {
		Api::new().expect("Default construction should succeed.")
	}

	#[test]
	fn describe_renders_method_path_and_queries() {
		let request = api()
			.request(Method::GET, "history/transactions")
			.query("pageSize", "10")
			.query("pageNumber", "2");

		assert_eq!(request.describe(), "GET /history/transactions?pageSize=10&pageNumber=2");
	}

	#[test]
	fn replace_query_overwrites_in_place() {
		let request = api()
			.request(Method::GET, "history/transactions")
			.query("pageNumber", "1")
			.replace_query("pageNumber", "3");

		assert_eq!(request.describe(), "GET /history/transactions?pageNumber=3");
	}

	#[test]
	fn relative_retargets_path_and_queries() {
		let request = api()
			.request(Method::GET, "history/activity")
			.query("pageNumber", "1")
			.relative("/history/activity?detailed=true&pageNumber=2");

		assert_eq!(request.describe(), "GET /history/activity?detailed=true&pageNumber=2");
	}

	#[tokio::test]
	async fn send_fails_with_session_expired_once_the_api_is_gone() {
		let api = api();
		let request = api.request(Method::GET, "session");

		drop(api);

		assert!(matches!(
			request.send(&[StatusCode::OK]).await,
			Err(Error::SessionExpired)
		));
	}

	#[tokio::test]
	async fn credentialed_requests_require_a_login() {
		let api = api();
		let outcome =
			api.request(Method::GET, "accounts").with_credentials().send(&[StatusCode::OK]).await;

		assert!(matches!(outcome, Err(Error::InvalidRequest { .. })));
	}
}
