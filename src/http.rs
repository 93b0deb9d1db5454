//! Transport construction and the stable HTTP vocabulary shared by all endpoints.
//!
//! The module owns the crate's single transport policy: TLS 1.2 at minimum, no cookie
//! jar, no response cache, no redirect following, HTTP/2 enabled. Sessions are
//! ephemeral—nothing touches disk.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::Suggestion};

/// Reserved request/response header keys used across the gateway.
pub mod header {
	/// API key issued per application; sent on every request.
	pub const API_KEY: &str = "X-IG-API-KEY";
	/// Client session token (certificate session variant).
	pub const CST: &str = "CST";
	/// Security token paired with [`CST`].
	pub const SECURITY_TOKEN: &str = "X-SECURITY-TOKEN";
	/// Active account identifier (OAuth session variant).
	pub const ACCOUNT_ID: &str = "IG-ACCOUNT-ID";
	/// Bearer authorization (OAuth session variant).
	pub const AUTHORIZATION: &str = "Authorization";
	/// Endpoint-specific API version integer.
	pub const VERSION: &str = "Version";
	/// Request body media type.
	pub const CONTENT_TYPE: &str = "Content-Type";
	/// Acceptable response media types.
	pub const ACCEPT: &str = "Accept";
	/// Caller-supplied correlation identifier; never stamped by the pipeline itself.
	pub const REQUEST_ID: &str = "X-REQUEST-ID";
	/// Server response date, `E, d MMM yyyy HH:mm:ss zzz`.
	pub const DATE: &str = "Date";
	/// Method tunnel for endpoints that accept `DELETE` semantics over `POST`.
	pub const METHOD_OVERRIDE: &str = "_method";
}

/// Media types exchanged with the gateway.
pub mod content_type {
	/// JSON with an explicit UTF-8 charset, as the gateway emits it.
	pub const JSON: &str = "application/json; charset=UTF-8";
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP policy lives in one place.
///
/// Exactly one transport exists per [`Api`](crate::api::Api); every endpoint call
/// originating from that instance shares it. Dropping the owning `Api` releases the
/// client, which aborts outstanding exchanges.
#[derive(Clone)]
pub struct Transport(ReqwestClient);
impl Transport {
	/// Builds the default gateway transport.
	pub fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.min_tls_version(reqwest::tls::Version::TLS_1_2)
			.https_only(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(|e| Error::InvalidRequest {
				message: "HTTP client could not be constructed".into(),
				request: None,
				source: Some(Box::new(e)),
				suggestion: Suggestion::FileBug,
				context: Vec::new(),
			})?;

		Ok(Self(client))
	}

	/// Wraps an existing [`ReqwestClient`].
	///
	/// The caller keeps responsibility for the transport policy; tests use this to
	/// accept self-signed certificates and plain-HTTP mock servers.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl AsRef<ReqwestClient> for Transport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for Transport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
